use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    db::is_unique_violation,
    dto::feedback::SubmitFeedbackRequest,
    entity::{
        feedbacks::{ActiveModel as FeedbackActive, Column as FeedbackCol, Entity as Feedbacks, Model as FeedbackModel},
        quotes::Entity as Quotes,
    },
    error::{AppError, AppResult},
    lifecycle::rules,
    middleware::auth::AuthUser,
    models::Feedback,
    response::ApiResponse,
    services::quote_service::lock_owned_quote,
    state::AppState,
};

pub async fn submit_feedback(
    state: &AppState,
    user: &AuthUser,
    payload: SubmitFeedbackRequest,
) -> AppResult<ApiResponse<Feedback>> {
    let comment = payload
        .comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    rules::validate_feedback(payload.rating, comment.as_deref())?;

    let txn = state.orm.begin().await?;
    let quote = lock_owned_quote(&txn, payload.quote_id, user.user_id).await?;
    let existing = Feedbacks::find()
        .filter(FeedbackCol::QuoteId.eq(quote.id))
        .count(&txn)
        .await?;
    rules::ensure_feedback_open(quote.status, existing > 0)?;

    let inserted = FeedbackActive {
        id: Set(Uuid::new_v4()),
        quote_id: Set(quote.id),
        user_id: Set(user.user_id),
        rating: Set(payload.rating),
        comment: Set(comment),
        created_at: NotSet,
    }
    .insert(&txn)
    .await;
    let feedback = match inserted {
        Ok(model) => model,
        Err(err) if is_unique_violation(&err) => {
            return Err(AppError::Conflict(
                "Feedback has already been submitted for this quote".into(),
            ));
        }
        Err(err) => return Err(err.into()),
    };
    txn.commit().await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "feedback_submit",
        "feedbacks",
        serde_json::json!({ "quote_id": quote.id, "rating": feedback.rating }),
    )
    .await;
    tracing::info!(quote_id = %quote.id, rating = feedback.rating, "feedback submitted");

    Ok(ApiResponse::ok("Thank you for your feedback", feedback_from_entity(feedback)))
}

/// Feedback for a quote, visible to the quote owner and to admins.
pub async fn get_feedback(
    state: &AppState,
    user: &AuthUser,
    quote_id: Uuid,
) -> AppResult<ApiResponse<Feedback>> {
    let quote = Quotes::find_by_id(quote_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if !user.is_admin() && quote.user_id != user.user_id {
        return Err(AppError::NotFound);
    }

    let feedback = Feedbacks::find()
        .filter(FeedbackCol::QuoteId.eq(quote.id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::ok("OK", feedback_from_entity(feedback)))
}

pub(crate) fn feedback_from_entity(model: FeedbackModel) -> Feedback {
    Feedback {
        id: model.id,
        quote_id: model.quote_id,
        user_id: model.user_id,
        rating: model.rating,
        comment: model.comment,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
