use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        admin::{DashboardSummary, UpdateRoleRequest, UserList},
        messages::{ContactList, EnquiryList, UpdateContactStatusRequest, UpdateEnquiryStatusRequest},
        quotes::{QuoteDetail, QuoteList},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Contact, Enquiry, User},
    response::ApiResponse,
    routes::params::{ContactListQuery, EnquiryListQuery, Pagination, QuoteListQuery},
    services::{admin_service, message_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/quotes", get(list_all_quotes))
        .route("/quotes/{id}", get(get_quote_admin))
        .route("/users", get(list_users))
        .route("/users/{id}", delete(delete_user))
        .route("/users/{id}/role", put(update_user_role))
        .route("/enquiries", get(list_enquiries))
        .route("/enquiries/{id}", delete(delete_enquiry))
        .route("/enquiries/{id}/status", put(update_enquiry_status))
        .route("/contacts", get(list_contacts))
        .route("/contacts/{id}", delete(delete_contact))
        .route("/contacts/{id}/status", put(update_contact_status))
}

#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    responses(
        (status = 200, description = "Counts and recent activity", body = ApiResponse<DashboardSummary>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<DashboardSummary>>> {
    let resp = admin_service::dashboard(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/quotes",
    params(QuoteListQuery),
    responses(
        (status = 200, description = "All quotes (admin only)", body = ApiResponse<QuoteList>),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal Server Error"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_quotes(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<QuoteListQuery>,
) -> AppResult<Json<ApiResponse<QuoteList>>> {
    let resp = admin_service::list_all_quotes(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/quotes/{id}",
    params(("id" = Uuid, Path, description = "Quote ID")),
    responses(
        (status = 200, description = "Quote detail", body = ApiResponse<QuoteDetail>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_quote_admin(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<QuoteDetail>>> {
    let resp = admin_service::get_quote_admin(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(Pagination),
    responses(
        (status = 200, description = "Registered users", body = ApiResponse<UserList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = admin_service::list_users(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/role",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role changed", body = ApiResponse<User>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_user_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = admin_service::update_user_role(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = admin_service::delete_user(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/enquiries",
    params(EnquiryListQuery),
    responses(
        (status = 200, description = "Enquiries, newest first", body = ApiResponse<EnquiryList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_enquiries(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<EnquiryListQuery>,
) -> AppResult<Json<ApiResponse<EnquiryList>>> {
    let resp = message_service::list_enquiries(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/enquiries/{id}/status",
    params(("id" = Uuid, Path, description = "Enquiry ID")),
    request_body = UpdateEnquiryStatusRequest,
    responses(
        (status = 200, description = "Enquiry updated", body = ApiResponse<Enquiry>),
        (status = 400, description = "Status can only move forward"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_enquiry_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEnquiryStatusRequest>,
) -> AppResult<Json<ApiResponse<Enquiry>>> {
    let resp = message_service::update_enquiry_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/enquiries/{id}",
    params(("id" = Uuid, Path, description = "Enquiry ID")),
    responses(
        (status = 200, description = "Enquiry deleted"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_enquiry(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = message_service::delete_enquiry(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/contacts",
    params(ContactListQuery),
    responses(
        (status = 200, description = "Contact messages, newest first", body = ApiResponse<ContactList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_contacts(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ContactListQuery>,
) -> AppResult<Json<ApiResponse<ContactList>>> {
    let resp = message_service::list_contacts(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/contacts/{id}/status",
    params(("id" = Uuid, Path, description = "Contact ID")),
    request_body = UpdateContactStatusRequest,
    responses(
        (status = 200, description = "Contact updated", body = ApiResponse<Contact>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_contact_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateContactStatusRequest>,
) -> AppResult<Json<ApiResponse<Contact>>> {
    let resp = message_service::update_contact_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/contacts/{id}",
    params(("id" = Uuid, Path, description = "Contact ID")),
    responses(
        (status = 200, description = "Contact deleted"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_contact(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = message_service::delete_contact(&state, &user, id).await?;
    Ok(Json(resp))
}
