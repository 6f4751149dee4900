use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::quotes::{QuoteDetail, QuoteList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Quote,
    response::ApiResponse,
    routes::params::QuoteListQuery,
    services::quote_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/quotes", get(list_my_quotes))
        .route("/quotes/{id}", get(get_my_quote))
        .route("/quotes/{id}/accept", put(accept_quote))
        .route("/quotes/{id}/cancel", put(cancel_quote))
}

#[utoipa::path(
    get,
    path = "/api/users/quotes",
    params(QuoteListQuery),
    responses(
        (status = 200, description = "Quotes owned by the caller", body = ApiResponse<QuoteList>),
        (status = 401, description = "Missing or expired token")
    ),
    security(("bearer_auth" = [])),
    tag = "My Quotes"
)]
pub async fn list_my_quotes(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<QuoteListQuery>,
) -> AppResult<Json<ApiResponse<QuoteList>>> {
    let resp = quote_service::list_my_quotes(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/users/quotes/{id}",
    params(("id" = Uuid, Path, description = "Quote ID")),
    responses(
        (status = 200, description = "Quote, tracking view and feedback", body = ApiResponse<QuoteDetail>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "My Quotes"
)]
pub async fn get_my_quote(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<QuoteDetail>>> {
    let resp = quote_service::get_my_quote(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/users/quotes/{id}/accept",
    params(("id" = Uuid, Path, description = "Quote ID")),
    responses(
        (status = 200, description = "Quote accepted", body = ApiResponse<Quote>),
        (status = 400, description = "Quote has no estimated cost"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Invalid transition")
    ),
    security(("bearer_auth" = [])),
    tag = "My Quotes"
)]
pub async fn accept_quote(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Quote>>> {
    let resp = quote_service::accept_quote(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/users/quotes/{id}/cancel",
    params(("id" = Uuid, Path, description = "Quote ID")),
    responses(
        (status = 200, description = "Quote cancelled", body = ApiResponse<Quote>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Invalid transition")
    ),
    security(("bearer_auth" = [])),
    tag = "My Quotes"
)]
pub async fn cancel_quote(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Quote>>> {
    let resp = quote_service::cancel_quote(&state, &user, id).await?;
    Ok(Json(resp))
}
