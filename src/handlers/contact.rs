use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::api::dto::{CreateContactDto, UpdateContactStatusDto};
use crate::api::validation::ValidatedJson;
use crate::app::AppState;
use crate::database::models::{ContactRequest, NewContactRequest};
use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;

use super::{ensure_owner, parse_id, resolve_recipient};

/// POST /api/contact - public contact form
pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateContactDto>,
) -> ApiResult<(StatusCode, Json<ContactRequest>)> {
    let owner = resolve_recipient(state.store.as_ref(), dto.user_id, dto.username.as_deref()).await?;
    let contact = state
        .store
        .create_contact(
            owner,
            NewContactRequest {
                name: dto.name.trim().to_string(),
                email: dto.email.trim().to_string(),
                message: dto.message,
            },
        )
        .await?;
    tracing::info!("Contact request {} received for user {}", contact.id, owner);
    Ok((StatusCode::CREATED, Json(contact)))
}

/// GET /api/contact - the current user's inbox
pub async fn list(State(state): State<AppState>, current: CurrentUser) -> ApiResult<Json<Vec<ContactRequest>>> {
    Ok(Json(state.store.list_contacts(current.id()).await?))
}

/// PATCH /api/contact/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    current: CurrentUser,
    ValidatedJson(dto): ValidatedJson<UpdateContactStatusDto>,
) -> ApiResult<Json<ContactRequest>> {
    let contact = owned_contact(&state, &id, &current).await?;
    Ok(Json(state.store.update_contact_status(contact.id, &dto.status).await?))
}

/// DELETE /api/contact/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    current: CurrentUser,
) -> ApiResult<Json<ContactRequest>> {
    let contact = owned_contact(&state, &id, &current).await?;
    Ok(Json(state.store.delete_contact(contact.id).await?))
}

async fn owned_contact(state: &AppState, raw_id: &str, current: &CurrentUser) -> ApiResult<ContactRequest> {
    let id = parse_id(raw_id, "Contact request")?;
    let contact = state
        .store
        .contact(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Contact request not found"))?;
    ensure_owner(current, contact.user_id, "contact request")?;
    Ok(contact)
}
