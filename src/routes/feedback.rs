use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::feedback::SubmitFeedbackRequest,
    error::AppResult,
    middleware::auth::AuthUser,
    models::Feedback,
    response::ApiResponse,
    services::feedback_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_feedback))
        .route("/{quote_id}", get(get_feedback))
}

#[utoipa::path(
    post,
    path = "/api/feedback",
    request_body = SubmitFeedbackRequest,
    responses(
        (status = 201, description = "Feedback stored", body = ApiResponse<Feedback>),
        (status = 400, description = "Rating or comment invalid"),
        (status = 403, description = "Quote is not completed"),
        (status = 409, description = "Feedback already submitted")
    ),
    security(("bearer_auth" = [])),
    tag = "Feedback"
)]
pub async fn submit_feedback(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SubmitFeedbackRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Feedback>>)> {
    let resp = feedback_service::submit_feedback(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/feedback/{quote_id}",
    params(("quote_id" = Uuid, Path, description = "Quote ID")),
    responses(
        (status = 200, description = "Feedback for the quote", body = ApiResponse<Feedback>),
        (status = 404, description = "No feedback or quote not visible")
    ),
    security(("bearer_auth" = [])),
    tag = "Feedback"
)]
pub async fn get_feedback(
    State(state): State<AppState>,
    user: AuthUser,
    Path(quote_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Feedback>>> {
    let resp = feedback_service::get_feedback(&state, &user, quote_id).await?;
    Ok(Json(resp))
}
