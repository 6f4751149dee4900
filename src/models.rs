use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::{contacts::ContactStatus, enquiries::EnquiryStatus, users::Role},
    lifecycle::QuoteStatus,
    payment::{PaymentMethod, PaymentStatus},
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Household item counters collected by the quote form. Stored as JSONB.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, FromJsonQueryResult,
)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemCounts {
    pub beds: u32,
    pub sofas: u32,
    pub wardrobes: u32,
    pub tables: u32,
    pub refrigerators: u32,
    pub washing_machines: u32,
    pub televisions: u32,
    pub boxes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: Uuid,
    pub tracking_code: String,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub from_city: String,
    pub from_address: String,
    pub from_floor: i32,
    pub from_has_lift: bool,
    pub to_city: String,
    pub to_address: String,
    pub to_floor: i32,
    pub to_has_lift: bool,
    pub move_date: NaiveDate,
    pub flexible_dates: bool,
    pub property_type: String,
    pub items: ItemCounts,
    pub packing: bool,
    pub unpacking: bool,
    pub storage: bool,
    pub insurance: bool,
    pub special_instructions: Option<String>,
    pub status: QuoteStatus,
    pub estimated_cost: Option<i64>,
    pub final_cost: Option<i64>,
    pub admin_notes: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What anyone holding a tracking code may see. Contact details, addresses
/// and payment references stay on the owner and admin views.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuote {
    pub tracking_code: String,
    pub from_city: String,
    pub to_city: String,
    pub move_date: NaiveDate,
    pub flexible_dates: bool,
    pub property_type: String,
    pub items: ItemCounts,
    pub packing: bool,
    pub unpacking: bool,
    pub storage: bool,
    pub insurance: bool,
    pub status: QuoteStatus,
    pub estimated_cost: Option<i64>,
    pub final_cost: Option<i64>,
    pub payment_status: Option<PaymentStatus>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Quote> for PublicQuote {
    fn from(quote: Quote) -> Self {
        Self {
            tracking_code: quote.tracking_code,
            from_city: quote.from_city,
            to_city: quote.to_city,
            move_date: quote.move_date,
            flexible_dates: quote.flexible_dates,
            property_type: quote.property_type,
            items: quote.items,
            packing: quote.packing,
            unpacking: quote.unpacking,
            storage: quote.storage,
            insurance: quote.insurance,
            status: quote.status,
            estimated_cost: quote.estimated_cost,
            final_cost: quote.final_cost,
            payment_status: quote.payment_status,
            created_at: quote.created_at,
            updated_at: quote.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: Uuid,
    pub quote_id: Uuid,
    pub user_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Enquiry {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service_type: Option<String>,
    pub message: String,
    pub status: EnquiryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
