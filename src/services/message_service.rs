use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    dto::messages::{
        ContactList, CreateContactRequest, CreateEnquiryRequest, EnquiryList,
        UpdateContactStatusRequest, UpdateEnquiryStatusRequest,
    },
    entity::{
        contacts::{
            ActiveModel as ContactActive, Column as ContactCol, ContactStatus, Entity as Contacts,
            Model as ContactModel,
        },
        enquiries::{
            ActiveModel as EnquiryActive, Column as EnquiryCol, Entity as Enquiries, EnquiryStatus,
            Model as EnquiryModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Contact, Enquiry},
    response::{ApiResponse, Meta},
    routes::params::{ContactListQuery, EnquiryListQuery},
    state::AppState,
};

pub async fn create_enquiry(
    state: &AppState,
    payload: CreateEnquiryRequest,
) -> AppResult<ApiResponse<Enquiry>> {
    payload.validate()?;
    let enquiry = EnquiryActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        email: Set(payload.email.trim().to_ascii_lowercase()),
        phone: Set(payload.phone.trim().to_string()),
        service_type: Set(payload.service_type.filter(|s| !s.trim().is_empty())),
        message: Set(payload.message.trim().to_string()),
        status: Set(EnquiryStatus::New),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(enquiry_id = %enquiry.id, "enquiry received");
    Ok(ApiResponse::ok(
        "Enquiry received",
        enquiry_from_entity(enquiry),
    ))
}

pub async fn create_contact(
    state: &AppState,
    payload: CreateContactRequest,
) -> AppResult<ApiResponse<Contact>> {
    payload.validate()?;
    let contact = ContactActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        email: Set(payload.email.trim().to_ascii_lowercase()),
        subject: Set(payload.subject.trim().to_string()),
        message: Set(payload.message.trim().to_string()),
        status: Set(ContactStatus::Open),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(contact_id = %contact.id, "contact message received");
    Ok(ApiResponse::ok("Message received", contact_from_entity(contact)))
}

pub async fn list_enquiries(
    state: &AppState,
    user: &AuthUser,
    query: EnquiryListQuery,
) -> AppResult<ApiResponse<EnquiryList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status {
        condition = condition.add(EnquiryCol::Status.eq(status));
    }
    let finder = Enquiries::find()
        .filter(condition)
        .order_by_desc(EnquiryCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(enquiry_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Enquiries",
        EnquiryList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn update_enquiry_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateEnquiryStatusRequest,
) -> AppResult<ApiResponse<Enquiry>> {
    ensure_admin(user)?;
    let existing = Enquiries::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if !existing.status.can_advance_to(payload.status) {
        return Err(AppError::validation(format!(
            "Enquiry cannot move from {} to {}",
            existing.status.as_str(),
            payload.status.as_str()
        )));
    }

    let mut active: EnquiryActive = existing.into();
    active.status = Set(payload.status);
    active.updated_at = Set(Utc::now().into());
    let enquiry = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "enquiry_status_update",
        "enquiries",
        serde_json::json!({ "enquiry_id": enquiry.id, "status": enquiry.status }),
    )
    .await;

    Ok(ApiResponse::ok("Enquiry updated", enquiry_from_entity(enquiry)))
}

pub async fn delete_enquiry(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Enquiries::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        Some(user.user_id),
        "enquiry_delete",
        "enquiries",
        serde_json::json!({ "enquiry_id": id }),
    )
    .await;

    Ok(ApiResponse::ok("Deleted", serde_json::json!({})))
}

pub async fn list_contacts(
    state: &AppState,
    user: &AuthUser,
    query: ContactListQuery,
) -> AppResult<ApiResponse<ContactList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status {
        condition = condition.add(ContactCol::Status.eq(status));
    }
    let finder = Contacts::find()
        .filter(condition)
        .order_by_desc(ContactCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(contact_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Contacts",
        ContactList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn update_contact_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateContactStatusRequest,
) -> AppResult<ApiResponse<Contact>> {
    ensure_admin(user)?;
    let existing = Contacts::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ContactActive = existing.into();
    active.status = Set(payload.status);
    active.updated_at = Set(Utc::now().into());
    let contact = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "contact_status_update",
        "contacts",
        serde_json::json!({ "contact_id": contact.id, "status": contact.status }),
    )
    .await;

    Ok(ApiResponse::ok("Contact updated", contact_from_entity(contact)))
}

pub async fn delete_contact(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Contacts::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        Some(user.user_id),
        "contact_delete",
        "contacts",
        serde_json::json!({ "contact_id": id }),
    )
    .await;

    Ok(ApiResponse::ok("Deleted", serde_json::json!({})))
}

pub(crate) fn enquiry_from_entity(model: EnquiryModel) -> Enquiry {
    Enquiry {
        id: model.id,
        name: model.name,
        email: model.email,
        phone: model.phone,
        service_type: model.service_type,
        message: model.message,
        status: model.status,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn contact_from_entity(model: ContactModel) -> Contact {
    Contact {
        id: model.id,
        name: model.name,
        email: model.email,
        subject: model.subject,
        message: model.message,
        status: model.status,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
