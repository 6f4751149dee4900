use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Enquiries only move forward: new -> contacted -> resolved, with
/// new -> resolved allowed for ones closed without a call.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, EnumIter, DeriveActiveEnum,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum EnquiryStatus {
    #[sea_orm(string_value = "new")]
    New,
    #[sea_orm(string_value = "contacted")]
    Contacted,
    #[sea_orm(string_value = "resolved")]
    Resolved,
}

impl EnquiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnquiryStatus::New => "new",
            EnquiryStatus::Contacted => "contacted",
            EnquiryStatus::Resolved => "resolved",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            EnquiryStatus::New => 0,
            EnquiryStatus::Contacted => 1,
            EnquiryStatus::Resolved => 2,
        }
    }

    pub fn can_advance_to(&self, next: EnquiryStatus) -> bool {
        next.rank() > self.rank()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "enquiries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service_type: Option<String>,
    pub message: String,
    pub status: EnquiryStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
