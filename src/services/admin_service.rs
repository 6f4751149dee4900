use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        admin::{DashboardSummary, UpdateRoleRequest, UserList},
        quotes::{QuoteDetail, QuoteList},
    },
    entity::{
        contacts::Entity as Contacts,
        enquiries::{Column as EnquiryCol, Entity as Enquiries},
        feedbacks::{Column as FeedbackCol, Entity as Feedbacks},
        quotes::{Column as QuoteCol, Entity as Quotes},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    lifecycle::{QuoteStatus, TrackingView},
    middleware::auth::{AuthUser, ensure_admin},
    models::User,
    response::{ApiResponse, Meta},
    routes::params::{Pagination, QuoteListQuery},
    services::{
        auth_service::user_from_entity, feedback_service::feedback_from_entity,
        message_service::enquiry_from_entity, quote_service,
    },
    state::AppState,
};

const RECENT_LIMIT: u64 = 5;

pub async fn dashboard(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<DashboardSummary>> {
    ensure_admin(user)?;

    let total_users = Users::find().count(&state.orm).await? as i64;
    let total_quotes = Quotes::find().count(&state.orm).await? as i64;
    let pending_quotes = Quotes::find()
        .filter(QuoteCol::Status.eq(QuoteStatus::Pending))
        .count(&state.orm)
        .await? as i64;
    let confirmed_quotes = Quotes::find()
        .filter(QuoteCol::Status.is_in([QuoteStatus::Accepted, QuoteStatus::Completed]))
        .count(&state.orm)
        .await? as i64;
    let total_enquiries = Enquiries::find().count(&state.orm).await? as i64;
    let total_contacts = Contacts::find().count(&state.orm).await? as i64;

    let recent_quotes = Quotes::find()
        .order_by_desc(QuoteCol::CreatedAt)
        .limit(RECENT_LIMIT)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(quote_service::quote_from_entity)
        .collect();
    let recent_enquiries = Enquiries::find()
        .order_by_desc(EnquiryCol::CreatedAt)
        .limit(RECENT_LIMIT)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(enquiry_from_entity)
        .collect();

    Ok(ApiResponse::ok(
        "Dashboard",
        DashboardSummary {
            total_users,
            total_quotes,
            pending_quotes,
            confirmed_quotes,
            total_enquiries,
            total_contacts,
            recent_quotes,
            recent_enquiries,
        },
    ))
}

pub async fn list_all_quotes(
    state: &AppState,
    user: &AuthUser,
    query: QuoteListQuery,
) -> AppResult<ApiResponse<QuoteList>> {
    ensure_admin(user)?;
    quote_service::list_quotes(&state.orm, Condition::all(), query).await
}

pub async fn get_quote_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<QuoteDetail>> {
    ensure_admin(user)?;
    let quote = Quotes::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(quote_service::quote_from_entity)
        .ok_or(AppError::NotFound)?;

    let feedback = Feedbacks::find()
        .filter(FeedbackCol::QuoteId.eq(quote.id))
        .one(&state.orm)
        .await?
        .map(feedback_from_entity);
    let tracking = TrackingView::project(&quote, feedback.is_some());

    Ok(ApiResponse::ok(
        "Quote found",
        QuoteDetail {
            quote,
            tracking,
            feedback,
        },
    ))
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Users::find().order_by_desc(UserCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Users",
        UserList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn update_user_role(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateRoleRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    if id == user.user_id {
        return Err(AppError::forbidden("You cannot change your own role"));
    }

    let existing = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let previous = existing.role;

    let mut active: UserActive = existing.into();
    active.role = Set(payload.role);
    let updated = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "user_role_update",
        "users",
        serde_json::json!({ "user_id": updated.id, "from": previous, "to": updated.role }),
    )
    .await;
    tracing::info!(user_id = %updated.id, role = updated.role.as_str(), "user role changed");

    Ok(ApiResponse::ok("User updated", user_from_entity(updated)))
}

pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    if id == user.user_id {
        return Err(AppError::forbidden("You cannot delete your own account"));
    }

    let result = Users::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        Some(user.user_id),
        "user_delete",
        "users",
        serde_json::json!({ "user_id": id }),
    )
    .await;

    Ok(ApiResponse::ok("Deleted", serde_json::json!({})))
}
