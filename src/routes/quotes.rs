use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    routing::{get, post, put},
};
use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

use crate::{
    dto::quotes::{AdminQuoteUpdate, CreateQuoteRequest, PaymentResult, TrackedQuote},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Quote,
    payment::PaymentDetails,
    response::ApiResponse,
    services::quote_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_quote))
        .route("/track/{code}", get(track_quote))
        .route("/{id}", put(update_quote).delete(delete_quote))
        .route("/{id}/payment", post(capture_payment))
}

#[utoipa::path(
    post,
    path = "/api/quotes",
    request_body = CreateQuoteRequest,
    responses(
        (status = 201, description = "Quote submitted with status pending", body = ApiResponse<Quote>),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing or expired token")
    ),
    security(("bearer_auth" = [])),
    tag = "Quotes"
)]
pub async fn create_quote(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateQuoteRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Quote>>)> {
    let resp = quote_service::create_quote(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/quotes/track/{code}",
    params(("code" = String, Path, description = "Tracking code, e.g. UP-1A2B3C4D")),
    responses(
        (status = 200, description = "Quote with its tracking projection", body = ApiResponse<TrackedQuote>),
        (status = 404, description = "Unknown tracking code")
    ),
    tag = "Quotes"
)]
pub async fn track_quote(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<ApiResponse<TrackedQuote>>> {
    let resp = quote_service::track_quote(&state, &code).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/quotes/{id}",
    params(
        ("id" = Uuid, Path, description = "Quote ID"),
        ("If-Match" = Option<String>, Header, description = "updatedAt (RFC 3339) last seen by the caller")
    ),
    request_body = AdminQuoteUpdate,
    responses(
        (status = 200, description = "Quote updated", body = ApiResponse<Quote>),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Invalid transition or stale If-Match")
    ),
    security(("bearer_auth" = [])),
    tag = "Quotes"
)]
pub async fn update_quote(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<AdminQuoteUpdate>,
) -> AppResult<Json<ApiResponse<Quote>>> {
    let if_match = parse_if_match(&headers)?;
    let resp = quote_service::admin_update_quote(&state, &user, id, payload, if_match).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/quotes/{id}",
    params(("id" = Uuid, Path, description = "Quote ID")),
    responses(
        (status = 200, description = "Quote deleted", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Quote is past review"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Quotes"
)]
pub async fn delete_quote(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = quote_service::delete_quote(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/quotes/{id}/payment",
    params(("id" = Uuid, Path, description = "Quote ID")),
    request_body = PaymentDetails,
    responses(
        (status = 200, description = "Payment details recorded", body = ApiResponse<PaymentResult>),
        (status = 400, description = "Invalid payment details"),
        (status = 403, description = "Quote is not accepted"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Payment already submitted")
    ),
    security(("bearer_auth" = [])),
    tag = "Quotes"
)]
pub async fn capture_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PaymentDetails>,
) -> AppResult<Json<ApiResponse<PaymentResult>>> {
    let resp = quote_service::capture_payment(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

/// Reads an `If-Match` header carrying the `updatedAt` timestamp, quoted or not.
pub fn parse_if_match(headers: &HeaderMap) -> AppResult<Option<DateTime<FixedOffset>>> {
    let Some(value) = headers.get(header::IF_MATCH) else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| AppError::validation("If-Match header is not valid text"))?
        .trim()
        .trim_start_matches("W/")
        .trim_matches('"');
    if raw == "*" {
        return Ok(None);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(Some)
        .map_err(|_| AppError::validation("If-Match must be the quote's updatedAt timestamp"))
}
