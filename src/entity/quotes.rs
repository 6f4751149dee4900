use sea_orm::entity::prelude::*;

use crate::{
    lifecycle::QuoteStatus,
    models::ItemCounts,
    payment::{PaymentMethod, PaymentStatus},
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "quotes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
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
    pub move_date: Date,
    pub flexible_dates: bool,
    pub property_type: String,
    #[sea_orm(column_type = "JsonBinary")]
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
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(has_one = "super::feedbacks::Entity")]
    Feedbacks,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::feedbacks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Feedbacks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
