//! Payment capture boundary.
//!
//! There is no real gateway behind this service. [`SimulatedGateway`] is the
//! only implementation and it never reports money as collected: captures end
//! in [`PaymentStatus::Submitted`] and the response says `simulated: true`.

pub mod details;

use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

pub use details::{CardDetails, NetBankingDetails, PaymentDetails, UpiDetails};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, EnumIter, DeriveActiveEnum,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "submitted")]
    Submitted,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "failed")]
    Failed,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, EnumIter, DeriveActiveEnum,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "card")]
    Card,
    #[sea_orm(string_value = "upi")]
    Upi,
    #[sea_orm(string_value = "netbanking")]
    Netbanking,
}

/// What the gateway gets to see. Raw card and account numbers never leave
/// [`PaymentDetails`]; only the masked form travels further.
#[derive(Debug, Clone)]
pub struct PaymentIntent {
    pub quote_id: Uuid,
    pub tracking_code: String,
    pub amount: i64,
    pub method: PaymentMethod,
    pub masked_account: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub reference: String,
    pub status: PaymentStatus,
    pub simulated: bool,
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Payment declined: {0}")]
    Declined(String),

    #[error("Payment gateway unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> &'static str;

    async fn capture(&self, intent: &PaymentIntent) -> Result<PaymentReceipt, PaymentError>;
}

/// Test-mode gateway: records the intent and hands back a `SIM-` reference.
#[derive(Debug, Default, Clone)]
pub struct SimulatedGateway;

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn capture(&self, intent: &PaymentIntent) -> Result<PaymentReceipt, PaymentError> {
        let suffix = Uuid::new_v4().simple().to_string().to_ascii_uppercase();
        let reference = format!("SIM-{}", &suffix[..10]);
        tracing::warn!(
            quote_id = %intent.quote_id,
            tracking_code = %intent.tracking_code,
            method = ?intent.method,
            amount = intent.amount,
            reference = %reference,
            "simulated payment capture, no funds collected"
        );
        Ok(PaymentReceipt {
            reference,
            status: PaymentStatus::Submitted,
            simulated: true,
        })
    }
}
