use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    entity::{contacts::ContactStatus, enquiries::EnquiryStatus},
    models::{Contact, Enquiry},
};

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnquiryRequest {
    #[validate(length(min = 2, max = 100, message = "must be 2 to 100 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 7, max = 20, message = "must be 7 to 20 characters"))]
    pub phone: String,
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub service_type: Option<String>,
    #[validate(length(min = 5, max = 2000, message = "must be 5 to 2000 characters"))]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactRequest {
    #[validate(length(min = 2, max = 100, message = "must be 2 to 100 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 2, max = 200, message = "must be 2 to 200 characters"))]
    pub subject: String,
    #[validate(length(min = 5, max = 2000, message = "must be 5 to 2000 characters"))]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UpdateEnquiryStatusRequest {
    pub status: EnquiryStatus,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UpdateContactStatusRequest {
    pub status: ContactStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EnquiryList {
    pub items: Vec<Enquiry>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContactList {
    pub items: Vec<Contact>,
}
