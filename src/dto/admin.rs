use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    entity::users::Role,
    models::{Enquiry, Quote, User},
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_users: i64,
    pub total_quotes: i64,
    pub pending_quotes: i64,
    pub confirmed_quotes: i64,
    pub total_enquiries: i64,
    pub total_contacts: i64,
    pub recent_quotes: Vec<Quote>,
    pub recent_enquiries: Vec<Enquiry>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserList {
    pub items: Vec<User>,
}
