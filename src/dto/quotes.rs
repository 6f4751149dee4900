use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    lifecycle::{QuoteStatus, TrackingView},
    models::{Feedback, ItemCounts, PublicQuote, Quote},
    payment::PaymentReceipt,
};

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuoteRequest {
    #[validate(length(min = 2, max = 100, message = "must be 2 to 100 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 7, max = 20, message = "must be 7 to 20 characters"))]
    pub phone: String,
    #[validate(length(min = 2, max = 100, message = "must be 2 to 100 characters"))]
    pub from_city: String,
    #[validate(length(min = 2, max = 300, message = "must be 2 to 300 characters"))]
    pub from_address: String,
    #[serde(default)]
    #[validate(range(min = 0, max = 200, message = "must be between 0 and 200"))]
    pub from_floor: i32,
    #[serde(default)]
    pub from_has_lift: bool,
    #[validate(length(min = 2, max = 100, message = "must be 2 to 100 characters"))]
    pub to_city: String,
    #[validate(length(min = 2, max = 300, message = "must be 2 to 300 characters"))]
    pub to_address: String,
    #[serde(default)]
    #[validate(range(min = 0, max = 200, message = "must be between 0 and 200"))]
    pub to_floor: i32,
    #[serde(default)]
    pub to_has_lift: bool,
    pub move_date: NaiveDate,
    #[serde(default)]
    pub flexible_dates: bool,
    #[validate(length(min = 2, max = 50, message = "must be 2 to 50 characters"))]
    pub property_type: String,
    #[serde(default)]
    pub items: ItemCounts,
    #[serde(default)]
    pub packing: bool,
    #[serde(default)]
    pub unpacking: bool,
    #[serde(default)]
    pub storage: bool,
    #[serde(default)]
    pub insurance: bool,
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub special_instructions: Option<String>,
}

/// Admin edit of a quote. Absent fields are left untouched; cost fields are
/// applied before the status change.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminQuoteUpdate {
    pub status: Option<QuoteStatus>,
    pub estimated_cost: Option<i64>,
    pub final_cost: Option<i64>,
    pub admin_notes: Option<String>,
}

impl AdminQuoteUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.estimated_cost.is_none()
            && self.final_cost.is_none()
            && self.admin_notes.is_none()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QuoteList {
    pub items: Vec<Quote>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TrackedQuote {
    pub quote: PublicQuote,
    pub tracking: TrackingView,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuoteDetail {
    pub quote: Quote,
    pub tracking: TrackingView,
    pub feedback: Option<Feedback>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentResult {
    pub quote: Quote,
    pub receipt: PaymentReceipt,
}
