use std::sync::Arc;

use assert_matches::assert_matches;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{DateTime, NaiveDate};
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, Set};
use tower::ServiceExt;
use unitedpackers_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::{
        admin::UpdateRoleRequest,
        feedback::SubmitFeedbackRequest,
        messages::{CreateEnquiryRequest, UpdateEnquiryStatusRequest},
        quotes::{AdminQuoteUpdate, CreateQuoteRequest},
    },
    entity::{
        enquiries::EnquiryStatus,
        users::{ActiveModel as UserActive, Role},
    },
    error::AppError,
    lifecycle::QuoteStatus,
    middleware::auth::{AuthUser, authenticate},
    models::{ItemCounts, Quote},
    payment::{PaymentDetails, PaymentStatus, SimulatedGateway, UpiDetails},
    routes::create_api_router,
    services::{
        admin_service, auth_service::issue_token, feedback_service, message_service,
        quote_service,
    },
    state::AppState,
};
use uuid::Uuid;

// These flows need Postgres. Every test creates its own users, so they can
// share one database and run in parallel.
async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run quote flow tests.");
            return Ok(None);
        }
    };

    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    Ok(Some(AppState {
        orm,
        config: Arc::new(AppConfig {
            database_url,
            host: "127.0.0.1".into(),
            port: 0,
            jwt_secret: "flow-test-secret".into(),
            jwt_ttl_hours: 1,
            cors_origin: None,
        }),
        payments: Arc::new(SimulatedGateway),
    }))
}

async fn create_user(state: &AppState, role: Role) -> anyhow::Result<AuthUser> {
    let id = Uuid::new_v4();
    UserActive {
        id: Set(id),
        name: Set(format!("{} {}", role.as_str(), &id.to_string()[..8])),
        email: Set(format!("{id}@flow.test")),
        phone: Set(None),
        password_hash: Set("dummy".into()),
        role: Set(role),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser { user_id: id, role })
}

fn delhi_to_mumbai() -> CreateQuoteRequest {
    CreateQuoteRequest {
        name: "Asha Verma".into(),
        email: "asha@example.com".into(),
        phone: "9876543210".into(),
        from_city: "Delhi".into(),
        from_address: "12 Lodhi Road".into(),
        from_floor: 2,
        from_has_lift: false,
        to_city: "Mumbai".into(),
        to_address: "4 Marine Drive".into(),
        to_floor: 7,
        to_has_lift: true,
        move_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        flexible_dates: true,
        property_type: "2BHK".into(),
        items: ItemCounts {
            beds: 2,
            sofas: 1,
            wardrobes: 2,
            refrigerators: 1,
            boxes: 25,
            ..Default::default()
        },
        packing: true,
        unpacking: true,
        storage: false,
        insurance: true,
        special_instructions: Some("Fragile glassware in two boxes".into()),
    }
}

async fn create(state: &AppState, owner: &AuthUser) -> anyhow::Result<Quote> {
    let resp = quote_service::create_quote(state, owner, delhi_to_mumbai()).await?;
    Ok(resp.data.expect("quote"))
}

async fn admin_set(
    state: &AppState,
    admin: &AuthUser,
    id: Uuid,
    update: AdminQuoteUpdate,
) -> Result<Quote, AppError> {
    let resp = quote_service::admin_update_quote(state, admin, id, update, None).await?;
    Ok(resp.data.expect("quote"))
}

fn status(status: QuoteStatus) -> AdminQuoteUpdate {
    AdminQuoteUpdate {
        status: Some(status),
        ..Default::default()
    }
}

#[tokio::test]
async fn delhi_to_mumbai_move_end_to_end() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let owner = create_user(&state, Role::User).await?;
    let admin = create_user(&state, Role::Admin).await?;

    let quote = create(&state, &owner).await?;
    assert_eq!(quote.status, QuoteStatus::Pending);
    assert!(quote.tracking_code.starts_with("UP-"));
    assert_eq!(quote.tracking_code.len(), 11);

    // Public tracking returns the same move details.
    let tracked = quote_service::track_quote(&state, &quote.tracking_code.to_lowercase())
        .await?
        .data
        .expect("tracked");
    assert_eq!(tracked.quote.tracking_code, quote.tracking_code);
    assert_eq!(tracked.quote.from_city, "Delhi");
    assert_eq!(tracked.quote.to_city, "Mumbai");
    assert_eq!(tracked.quote.items.boxes, 25);
    assert_eq!(tracked.quote.move_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    assert_eq!(tracked.quote.status, QuoteStatus::Pending);
    assert!(tracked.tracking.actions.can_delete);

    admin_set(&state, &admin, quote.id, status(QuoteStatus::Reviewing)).await?;
    let accepted = admin_set(
        &state,
        &admin,
        quote.id,
        AdminQuoteUpdate {
            status: Some(QuoteStatus::Accepted),
            estimated_cost: Some(25_000),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(accepted.status, QuoteStatus::Accepted);
    assert_eq!(accepted.estimated_cost, Some(25_000));

    let paid = quote_service::capture_payment(
        &state,
        &owner,
        quote.id,
        PaymentDetails::Upi(UpiDetails {
            upi_id: "user@okaxis".into(),
        }),
    )
    .await?
    .data
    .expect("payment");
    assert!(paid.receipt.simulated);
    assert_eq!(paid.quote.payment_status, Some(PaymentStatus::Submitted));
    let reference = paid.quote.payment_reference.clone().unwrap_or_default();
    assert!(reference.starts_with("SIM-"));
    assert!(reference.contains("user@okaxis"));

    // A second submission is refused.
    let again = quote_service::capture_payment(
        &state,
        &owner,
        quote.id,
        PaymentDetails::Upi(UpiDetails {
            upi_id: "user@okaxis".into(),
        }),
    )
    .await;
    assert_matches!(again, Err(AppError::Conflict(_)));

    let completed = admin_set(
        &state,
        &admin,
        quote.id,
        AdminQuoteUpdate {
            status: Some(QuoteStatus::Completed),
            final_cost: Some(26_500),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(completed.status, QuoteStatus::Completed);
    assert_eq!(completed.final_cost, Some(26_500));

    let feedback = feedback_service::submit_feedback(
        &state,
        &owner,
        SubmitFeedbackRequest {
            quote_id: quote.id,
            rating: 5,
            comment: Some("Careful crew, nothing broken".into()),
        },
    )
    .await?
    .data
    .expect("feedback");
    assert_eq!(feedback.rating, 5);

    let second = feedback_service::submit_feedback(
        &state,
        &owner,
        SubmitFeedbackRequest {
            quote_id: quote.id,
            rating: 4,
            comment: None,
        },
    )
    .await;
    assert_matches!(second, Err(AppError::Conflict(_)));

    let stored = feedback_service::get_feedback(&state, &admin, quote.id)
        .await?
        .data
        .expect("feedback");
    assert_eq!(stored.rating, 5);

    let detail = quote_service::get_my_quote(&state, &owner, quote.id)
        .await?
        .data
        .expect("detail");
    assert!(detail.feedback.is_some());
    assert!(!detail.tracking.actions.can_leave_feedback);

    Ok(())
}

#[tokio::test]
async fn deletion_is_gated_by_status() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let owner = create_user(&state, Role::User).await?;
    let admin = create_user(&state, Role::Admin).await?;

    let pending = create(&state, &owner).await?;
    quote_service::delete_quote(&state, &owner, pending.id).await?;
    assert_matches!(
        quote_service::get_my_quote(&state, &owner, pending.id).await,
        Err(AppError::NotFound)
    );

    let accepted = create(&state, &owner).await?;
    admin_set(&state, &admin, accepted.id, status(QuoteStatus::Reviewing)).await?;
    admin_set(
        &state,
        &admin,
        accepted.id,
        AdminQuoteUpdate {
            status: Some(QuoteStatus::Accepted),
            estimated_cost: Some(18_000),
            ..Default::default()
        },
    )
    .await?;
    assert_matches!(
        quote_service::delete_quote(&state, &owner, accepted.id).await,
        Err(AppError::Forbidden(_))
    );

    // Someone else's quote looks like it does not exist.
    let stranger = create_user(&state, Role::User).await?;
    let theirs = create(&state, &owner).await?;
    assert_matches!(
        quote_service::delete_quote(&state, &stranger, theirs.id).await,
        Err(AppError::NotFound)
    );

    Ok(())
}

#[tokio::test]
async fn illegal_transitions_leave_status_unchanged() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let owner = create_user(&state, Role::User).await?;
    let admin = create_user(&state, Role::Admin).await?;
    let quote = create(&state, &owner).await?;

    assert_matches!(
        admin_set(&state, &admin, quote.id, status(QuoteStatus::Completed)).await,
        Err(AppError::InvalidTransition {
            from: QuoteStatus::Pending,
            to: QuoteStatus::Completed
        })
    );
    assert_matches!(
        admin_set(&state, &admin, quote.id, status(QuoteStatus::Pending)).await,
        Err(AppError::InvalidTransition { .. })
    );
    assert_matches!(
        quote_service::accept_quote(&state, &owner, quote.id).await,
        Err(AppError::InvalidTransition { .. })
    );

    let tracked = quote_service::track_quote(&state, &quote.tracking_code)
        .await?
        .data
        .expect("tracked");
    assert_eq!(tracked.quote.status, QuoteStatus::Pending);

    // Accepting without a price is refused even on a legal edge.
    admin_set(&state, &admin, quote.id, status(QuoteStatus::Reviewing)).await?;
    assert_matches!(
        admin_set(&state, &admin, quote.id, status(QuoteStatus::Accepted)).await,
        Err(AppError::Validation(_))
    );

    Ok(())
}

#[tokio::test]
async fn owner_accepts_quoted_price_and_cancels() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let owner = create_user(&state, Role::User).await?;
    let admin = create_user(&state, Role::Admin).await?;

    let quote = create(&state, &owner).await?;
    admin_set(&state, &admin, quote.id, status(QuoteStatus::Reviewing)).await?;
    admin_set(
        &state,
        &admin,
        quote.id,
        AdminQuoteUpdate {
            status: Some(QuoteStatus::Quoted),
            estimated_cost: Some(31_000),
            admin_notes: Some("Includes two packers".into()),
            ..Default::default()
        },
    )
    .await?;

    let accepted = quote_service::accept_quote(&state, &owner, quote.id)
        .await?
        .data
        .expect("quote");
    assert_eq!(accepted.status, QuoteStatus::Accepted);

    let cancelled = quote_service::cancel_quote(&state, &owner, quote.id)
        .await?
        .data
        .expect("quote");
    assert_eq!(cancelled.status, QuoteStatus::Cancelled);

    // Terminal quotes keep their estimate.
    assert_matches!(
        admin_set(
            &state,
            &admin,
            quote.id,
            AdminQuoteUpdate {
                estimated_cost: Some(1),
                ..Default::default()
            }
        )
        .await,
        Err(AppError::Forbidden(_))
    );

    let mine = quote_service::list_my_quotes(&state, &owner, Default::default())
        .await?
        .data
        .expect("list");
    assert_eq!(mine.items.len(), 1);

    Ok(())
}

#[tokio::test]
async fn stale_if_match_is_a_conflict() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let owner = create_user(&state, Role::User).await?;
    let admin = create_user(&state, Role::Admin).await?;
    let quote = create(&state, &owner).await?;

    let seen = DateTime::parse_from_rfc3339(&quote.updated_at.to_rfc3339())?;
    let reviewed = quote_service::admin_update_quote(
        &state,
        &admin,
        quote.id,
        status(QuoteStatus::Reviewing),
        Some(seen),
    )
    .await?
    .data
    .expect("quote");

    // The first edit moved updatedAt, so the old value is stale now.
    let stale = quote_service::admin_update_quote(
        &state,
        &admin,
        quote.id,
        status(QuoteStatus::Rejected),
        Some(seen),
    )
    .await;
    assert_matches!(stale, Err(AppError::Conflict(_)));

    let fresh = DateTime::parse_from_rfc3339(&reviewed.updated_at.to_rfc3339())?;
    quote_service::admin_update_quote(
        &state,
        &admin,
        quote.id,
        status(QuoteStatus::Rejected),
        Some(fresh),
    )
    .await?;

    Ok(())
}

#[tokio::test]
async fn feedback_requires_completed_quote() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let owner = create_user(&state, Role::User).await?;
    let quote = create(&state, &owner).await?;

    let early = feedback_service::submit_feedback(
        &state,
        &owner,
        SubmitFeedbackRequest {
            quote_id: quote.id,
            rating: 5,
            comment: None,
        },
    )
    .await;
    assert_matches!(early, Err(AppError::Forbidden(_)));

    let payment = quote_service::capture_payment(
        &state,
        &owner,
        quote.id,
        PaymentDetails::Upi(UpiDetails {
            upi_id: "user@okaxis".into(),
        }),
    )
    .await;
    assert_matches!(payment, Err(AppError::Forbidden(_)));

    Ok(())
}

#[tokio::test]
async fn enquiry_status_only_moves_forward() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, Role::Admin).await?;

    let enquiry = message_service::create_enquiry(
        &state,
        CreateEnquiryRequest {
            name: "Ravi Kumar".into(),
            email: "ravi@example.com".into(),
            phone: "9123456780".into(),
            service_type: Some("office".into()),
            message: "Need to move a 20 desk office".into(),
        },
    )
    .await?
    .data
    .expect("enquiry");
    assert_eq!(enquiry.status, EnquiryStatus::New);

    let resolved = message_service::update_enquiry_status(
        &state,
        &admin,
        enquiry.id,
        UpdateEnquiryStatusRequest {
            status: EnquiryStatus::Resolved,
        },
    )
    .await?
    .data
    .expect("enquiry");
    assert_eq!(resolved.status, EnquiryStatus::Resolved);

    let back = message_service::update_enquiry_status(
        &state,
        &admin,
        enquiry.id,
        UpdateEnquiryStatusRequest {
            status: EnquiryStatus::Contacted,
        },
    )
    .await;
    assert_matches!(back, Err(AppError::Validation(_)));

    message_service::delete_enquiry(&state, &admin, enquiry.id).await?;
    assert_matches!(
        message_service::delete_enquiry(&state, &admin, enquiry.id).await,
        Err(AppError::NotFound)
    );

    Ok(())
}

#[tokio::test]
async fn admins_cannot_demote_or_delete_themselves() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, Role::Admin).await?;
    let user = create_user(&state, Role::User).await?;

    assert_matches!(
        admin_service::update_user_role(
            &state,
            &admin,
            admin.user_id,
            UpdateRoleRequest { role: Role::User }
        )
        .await,
        Err(AppError::Forbidden(_))
    );
    assert_matches!(
        admin_service::delete_user(&state, &admin, admin.user_id).await,
        Err(AppError::Forbidden(_))
    );

    let promoted = admin_service::update_user_role(
        &state,
        &admin,
        user.user_id,
        UpdateRoleRequest { role: Role::Admin },
    )
    .await?
    .data
    .expect("user");
    assert_eq!(promoted.role, Role::Admin);

    admin_service::delete_user(&state, &admin, user.user_id).await?;
    Ok(())
}

#[tokio::test]
async fn demoted_admin_loses_admin_rights_on_existing_token() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let secret = state.config.jwt_secret.clone();
    let first = create_user(&state, Role::Admin).await?;
    let second = create_user(&state, Role::Admin).await?;
    let second_token = issue_token(second.user_id, Role::Admin, &secret, 1)?;

    admin_service::update_user_role(
        &state,
        &first,
        second.user_id,
        UpdateRoleRequest { role: Role::User },
    )
    .await?;

    let demoted = authenticate(&state.orm, &second_token, &secret).await?;
    assert_eq!(demoted.role, Role::User);
    assert_matches!(
        admin_service::update_user_role(
            &state,
            &demoted,
            first.user_id,
            UpdateRoleRequest { role: Role::User }
        )
        .await,
        Err(AppError::Forbidden(_))
    );
    assert_matches!(
        admin_service::delete_user(&state, &demoted, first.user_id).await,
        Err(AppError::Forbidden(_))
    );

    // Same token over HTTP.
    let app = Router::new()
        .nest("/api", create_api_router())
        .with_state(state.clone());
    let request = Request::put(format!("/api/admin/users/{}/role", first.user_id))
        .header(header::AUTHORIZATION, format!("Bearer {second_token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"role":"user"}"#))?;
    let response = app.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn deleted_user_token_cannot_create_quotes() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let secret = state.config.jwt_secret.clone();
    let admin = create_user(&state, Role::Admin).await?;
    let gone = create_user(&state, Role::User).await?;
    let token = issue_token(gone.user_id, Role::User, &secret, 1)?;

    admin_service::delete_user(&state, &admin, gone.user_id).await?;

    assert_matches!(
        authenticate(&state.orm, &token, &secret).await,
        Err(AppError::Unauthorized(_))
    );

    let app = Router::new()
        .nest("/api", create_api_router())
        .with_state(state.clone());
    let request = Request::post("/api/quotes")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&delhi_to_mumbai())?))?;
    let response = app.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
