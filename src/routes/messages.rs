use axum::{Json, Router, extract::State, http::StatusCode, routing::post};

use crate::{
    dto::messages::{CreateContactRequest, CreateEnquiryRequest},
    error::AppResult,
    models::{Contact, Enquiry},
    response::ApiResponse,
    services::message_service,
    state::AppState,
};

pub fn enquiries_router() -> Router<AppState> {
    Router::new().route("/", post(create_enquiry))
}

pub fn contacts_router() -> Router<AppState> {
    Router::new().route("/", post(create_contact))
}

#[utoipa::path(
    post,
    path = "/api/enquiries",
    request_body = CreateEnquiryRequest,
    responses(
        (status = 201, description = "Enquiry received", body = ApiResponse<Enquiry>),
        (status = 400, description = "Validation failed")
    ),
    tag = "Support"
)]
pub async fn create_enquiry(
    State(state): State<AppState>,
    Json(payload): Json<CreateEnquiryRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Enquiry>>)> {
    let resp = message_service::create_enquiry(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/contacts",
    request_body = CreateContactRequest,
    responses(
        (status = 201, description = "Message received", body = ApiResponse<Contact>),
        (status = 400, description = "Validation failed")
    ),
    tag = "Support"
)]
pub async fn create_contact(
    State(state): State<AppState>,
    Json(payload): Json<CreateContactRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Contact>>)> {
    let resp = message_service::create_contact(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
