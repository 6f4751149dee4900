use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::sea_query::{Expr, LockType, extension::postgres::PgExpr};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
    TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    db::{OrmConn, is_unique_violation},
    dto::quotes::{
        AdminQuoteUpdate, CreateQuoteRequest, PaymentResult, QuoteDetail, QuoteList, TrackedQuote,
    },
    entity::{
        feedbacks::{Column as FeedbackCol, Entity as Feedbacks},
        quotes::{ActiveModel as QuoteActive, Column as QuoteCol, Entity as Quotes, Model as QuoteModel},
    },
    error::{AppError, AppResult},
    lifecycle::{Actor, QuoteStatus, TrackingView, rules},
    middleware::auth::{AuthUser, ensure_admin},
    models::Quote,
    payment::{PaymentDetails, PaymentIntent},
    response::{ApiResponse, Meta},
    routes::params::{QuoteListQuery, SortOrder},
    services::feedback_service::feedback_from_entity,
    state::AppState,
};

const TRACKING_CODE_ATTEMPTS: usize = 3;

pub async fn create_quote(
    state: &AppState,
    user: &AuthUser,
    payload: CreateQuoteRequest,
) -> AppResult<ApiResponse<Quote>> {
    payload.validate()?;

    let mut attempt = 0;
    let quote = loop {
        attempt += 1;
        let active = new_quote(user.user_id, &payload);
        match active.insert(&state.orm).await {
            Ok(model) => break model,
            Err(err) if is_unique_violation(&err) && attempt < TRACKING_CODE_ATTEMPTS => {
                tracing::warn!(attempt, "tracking code collision, retrying");
            }
            Err(err) => return Err(err.into()),
        }
    };

    audit::record(
        &state.orm,
        Some(user.user_id),
        "quote_create",
        "quotes",
        serde_json::json!({ "quote_id": quote.id, "tracking_code": quote.tracking_code }),
    )
    .await;
    tracing::info!(quote_id = %quote.id, tracking_code = %quote.tracking_code, "quote created");

    Ok(ApiResponse::ok("Quote submitted", quote_from_entity(quote)))
}

pub async fn track_quote(state: &AppState, code: &str) -> AppResult<ApiResponse<TrackedQuote>> {
    let code = code.trim().to_ascii_uppercase();
    let quote = Quotes::find()
        .filter(QuoteCol::TrackingCode.eq(code))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let has_feedback = has_feedback(&state.orm, quote.id).await?;
    let quote = quote_from_entity(quote);
    let tracking = TrackingView::project(&quote, has_feedback);
    Ok(ApiResponse::ok(
        "OK",
        TrackedQuote {
            quote: quote.into(),
            tracking,
        },
    ))
}

pub async fn list_my_quotes(
    state: &AppState,
    user: &AuthUser,
    query: QuoteListQuery,
) -> AppResult<ApiResponse<QuoteList>> {
    let condition = Condition::all().add(QuoteCol::UserId.eq(user.user_id));
    list_quotes(&state.orm, condition, query).await
}

pub async fn get_my_quote(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<QuoteDetail>> {
    let quote = Quotes::find()
        .filter(
            Condition::all()
                .add(QuoteCol::Id.eq(id))
                .add(QuoteCol::UserId.eq(user.user_id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let feedback = Feedbacks::find()
        .filter(FeedbackCol::QuoteId.eq(quote.id))
        .one(&state.orm)
        .await?
        .map(feedback_from_entity);

    let quote = quote_from_entity(quote);
    let tracking = TrackingView::project(&quote, feedback.is_some());
    Ok(ApiResponse::ok(
        "OK",
        QuoteDetail {
            quote,
            tracking,
            feedback,
        },
    ))
}

pub async fn delete_quote(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;
    let quote = lock_owned_quote(&txn, id, user.user_id).await?;
    rules::ensure_deletable(Actor::Owner, quote.status)?;

    Quotes::delete_by_id(quote.id).exec(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "quote_delete",
        "quotes",
        serde_json::json!({ "quote_id": quote.id, "status": quote.status }),
    )
    .await;
    tracing::info!(quote_id = %quote.id, "quote deleted by owner");

    Ok(ApiResponse::ok("Deleted", serde_json::json!({})))
}

pub async fn accept_quote(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Quote>> {
    owner_transition(state, user, id, QuoteStatus::Accepted).await
}

pub async fn cancel_quote(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Quote>> {
    owner_transition(state, user, id, QuoteStatus::Cancelled).await
}

async fn owner_transition(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    target: QuoteStatus,
) -> AppResult<ApiResponse<Quote>> {
    let txn = state.orm.begin().await?;
    let existing = lock_owned_quote(&txn, id, user.user_id).await?;
    let from = existing.status;
    let next = rules::authorize_transition(Actor::Owner, from, target, existing.estimated_cost)?;

    let mut active: QuoteActive = existing.into();
    active.status = Set(next);
    active.updated_at = Set(Utc::now().into());
    let quote = active.update(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "quote_status_update",
        "quotes",
        serde_json::json!({ "quote_id": quote.id, "from": from, "to": next, "actor": "owner" }),
    )
    .await;
    tracing::info!(quote_id = %quote.id, %from, to = %next, "quote status changed by owner");

    Ok(ApiResponse::ok("Quote updated", quote_from_entity(quote)))
}

/// Admin edit: cost fields, notes, and optionally a status change, in one
/// transaction. `if_match` is the `updatedAt` the admin last saw.
pub async fn admin_update_quote(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: AdminQuoteUpdate,
    if_match: Option<DateTime<FixedOffset>>,
) -> AppResult<ApiResponse<Quote>> {
    ensure_admin(user)?;
    if payload.is_empty() {
        return Err(AppError::validation("Nothing to update"));
    }
    rules::validate_cost("estimatedCost", payload.estimated_cost)?;
    rules::validate_cost("finalCost", payload.final_cost)?;
    rules::validate_admin_notes(payload.admin_notes.as_deref())?;

    let txn = state.orm.begin().await?;
    let existing = Quotes::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(expected) = if_match {
        if existing.updated_at.timestamp_micros() != expected.timestamp_micros() {
            return Err(AppError::Conflict(
                "Quote was modified by someone else; reload and try again".into(),
            ));
        }
    }

    let from = existing.status;
    if payload.estimated_cost.is_some() && from.is_terminal() {
        return Err(AppError::forbidden(format!(
            "The estimate of a {from} quote can no longer change"
        )));
    }

    let estimated_cost = payload.estimated_cost.or(existing.estimated_cost);
    let next = payload
        .status
        .map(|to| rules::authorize_transition(Actor::Admin, from, to, estimated_cost))
        .transpose()?;

    let mut active: QuoteActive = existing.into();
    if let Some(cost) = payload.estimated_cost {
        active.estimated_cost = Set(Some(cost));
    }
    if let Some(cost) = payload.final_cost {
        active.final_cost = Set(Some(cost));
    }
    if let Some(notes) = payload.admin_notes {
        let notes = notes.trim().to_string();
        active.admin_notes = Set((!notes.is_empty()).then_some(notes));
    }
    if let Some(next) = next {
        active.status = Set(next);
    }
    active.updated_at = Set(Utc::now().into());
    let quote = active.update(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "quote_admin_update",
        "quotes",
        serde_json::json!({
            "quote_id": quote.id,
            "from": from,
            "to": quote.status,
            "estimated_cost": quote.estimated_cost,
            "final_cost": quote.final_cost,
        }),
    )
    .await;
    tracing::info!(quote_id = %quote.id, %from, to = %quote.status, "quote updated by admin");

    Ok(ApiResponse::ok("Quote updated", quote_from_entity(quote)))
}

pub async fn capture_payment(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    details: PaymentDetails,
) -> AppResult<ApiResponse<PaymentResult>> {
    details.validate()?;

    let txn = state.orm.begin().await?;
    let existing = lock_owned_quote(&txn, id, user.user_id).await?;
    rules::ensure_payable(existing.status, existing.estimated_cost, existing.payment_status)?;
    let amount = existing
        .estimated_cost
        .ok_or_else(|| AppError::forbidden("The quote has no estimated cost yet"))?;

    let intent = PaymentIntent {
        quote_id: existing.id,
        tracking_code: existing.tracking_code.clone(),
        amount,
        method: details.method(),
        masked_account: details.masked(),
    };
    let receipt = state.payments.capture(&intent).await?;

    let mut active: QuoteActive = existing.into();
    active.payment_status = Set(Some(receipt.status));
    active.payment_method = Set(Some(intent.method));
    active.payment_reference = Set(Some(format!(
        "{} {}",
        receipt.reference, intent.masked_account
    )));
    active.updated_at = Set(Utc::now().into());
    let quote = active.update(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "quote_payment_capture",
        "quotes",
        serde_json::json!({
            "quote_id": quote.id,
            "gateway": state.payments.name(),
            "method": intent.method,
            "reference": receipt.reference,
            "simulated": receipt.simulated,
        }),
    )
    .await;

    let message = if receipt.simulated {
        "Payment details recorded (test mode, nothing was charged)"
    } else {
        "Payment details submitted"
    };
    Ok(ApiResponse::ok(
        message,
        PaymentResult {
            quote: quote_from_entity(quote),
            receipt,
        },
    ))
}

pub(crate) async fn list_quotes(
    conn: &OrmConn,
    mut condition: Condition,
    query: QuoteListQuery,
) -> AppResult<ApiResponse<QuoteList>> {
    let (page, limit, offset) = query.pagination().normalize();
    if let Some(status) = query.status {
        condition = condition.add(QuoteCol::Status.eq(status));
    }
    if let Some(search) = query.q.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(QuoteCol::TrackingCode).ilike(pattern.clone()))
                .add(Expr::col(QuoteCol::Name).ilike(pattern.clone()))
                .add(Expr::col(QuoteCol::FromCity).ilike(pattern.clone()))
                .add(Expr::col(QuoteCol::ToCity).ilike(pattern)),
        );
    }

    let finder = sorted(
        Quotes::find().filter(condition),
        query.sort_order.unwrap_or_default(),
    );
    let total = finder.clone().count(conn).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(conn)
        .await?
        .into_iter()
        .map(quote_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Quotes",
        QuoteList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

fn sorted(finder: Select<Quotes>, order: SortOrder) -> Select<Quotes> {
    match order {
        SortOrder::Asc => finder.order_by_asc(QuoteCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(QuoteCol::CreatedAt),
    }
}

pub(crate) async fn lock_owned_quote(
    txn: &DatabaseTransaction,
    id: Uuid,
    owner: Uuid,
) -> AppResult<QuoteModel> {
    Quotes::find()
        .filter(
            Condition::all()
                .add(QuoteCol::Id.eq(id))
                .add(QuoteCol::UserId.eq(owner)),
        )
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or(AppError::NotFound)
}

async fn has_feedback(conn: &OrmConn, quote_id: Uuid) -> AppResult<bool> {
    let count = Feedbacks::find()
        .filter(FeedbackCol::QuoteId.eq(quote_id))
        .count(conn)
        .await?;
    Ok(count > 0)
}

pub fn generate_tracking_code() -> String {
    let suffix = Uuid::new_v4().simple().to_string().to_ascii_uppercase();
    format!("UP-{}", &suffix[..8])
}

fn new_quote(user_id: Uuid, payload: &CreateQuoteRequest) -> QuoteActive {
    QuoteActive {
        id: Set(Uuid::new_v4()),
        tracking_code: Set(generate_tracking_code()),
        user_id: Set(user_id),
        name: Set(payload.name.trim().to_string()),
        email: Set(payload.email.trim().to_ascii_lowercase()),
        phone: Set(payload.phone.trim().to_string()),
        from_city: Set(payload.from_city.trim().to_string()),
        from_address: Set(payload.from_address.trim().to_string()),
        from_floor: Set(payload.from_floor),
        from_has_lift: Set(payload.from_has_lift),
        to_city: Set(payload.to_city.trim().to_string()),
        to_address: Set(payload.to_address.trim().to_string()),
        to_floor: Set(payload.to_floor),
        to_has_lift: Set(payload.to_has_lift),
        move_date: Set(payload.move_date),
        flexible_dates: Set(payload.flexible_dates),
        property_type: Set(payload.property_type.trim().to_string()),
        items: Set(payload.items.clone()),
        packing: Set(payload.packing),
        unpacking: Set(payload.unpacking),
        storage: Set(payload.storage),
        insurance: Set(payload.insurance),
        special_instructions: Set(payload
            .special_instructions
            .as_ref()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())),
        status: Set(QuoteStatus::Pending),
        estimated_cost: Set(None),
        final_cost: Set(None),
        admin_notes: Set(None),
        payment_status: Set(None),
        payment_method: Set(None),
        payment_reference: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
}

pub(crate) fn quote_from_entity(model: QuoteModel) -> Quote {
    Quote {
        id: model.id,
        tracking_code: model.tracking_code,
        user_id: model.user_id,
        name: model.name,
        email: model.email,
        phone: model.phone,
        from_city: model.from_city,
        from_address: model.from_address,
        from_floor: model.from_floor,
        from_has_lift: model.from_has_lift,
        to_city: model.to_city,
        to_address: model.to_address,
        to_floor: model.to_floor,
        to_has_lift: model.to_has_lift,
        move_date: model.move_date,
        flexible_dates: model.flexible_dates,
        property_type: model.property_type,
        items: model.items,
        packing: model.packing,
        unpacking: model.unpacking,
        storage: model.storage,
        insurance: model.insurance,
        special_instructions: model.special_instructions,
        status: model.status,
        estimated_cost: model.estimated_cost,
        final_cost: model.final_cost,
        admin_notes: model.admin_notes,
        payment_status: model.payment_status,
        payment_method: model.payment_method,
        payment_reference: model.payment_reference,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
