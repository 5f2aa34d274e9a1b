// handlers/mod.rs - one module per resource under /api
//
// The identity middleware never blocks, so every handler that acts on behalf
// of an owner re-checks identity itself (CurrentUser extractor or ensure_owner).

pub mod auth;
pub mod contact;
pub mod health;
pub mod projects;
pub mod reviews;
pub mod sections;
pub mod users;

use serde::Deserialize;
use uuid::Uuid;

use crate::database::Store;
use crate::error::ApiError;
use crate::middleware::CurrentUser;

/// Parse a path id; a malformed id cannot name an existing record
pub fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::not_found(format!("{} not found", what)))
}

/// `?userId=` / `?username=` filter shared by the public listings
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerQuery {
    pub user_id: Option<String>,
    pub username: Option<String>,
}

/// Resolve a listing owner. Explicit query wins, then the current user,
/// then `None` (no filter).
pub async fn resolve_owner(
    store: &dyn Store,
    query: &OwnerQuery,
    current: Option<&CurrentUser>,
) -> Result<Option<Uuid>, ApiError> {
    if let Some(raw) = query.user_id.as_deref().filter(|s| !s.trim().is_empty()) {
        return parse_id(raw, "User").map(Some);
    }
    if let Some(username) = query.username.as_deref().filter(|s| !s.trim().is_empty()) {
        let user = store
            .user_by_username(username.trim())
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;
        return Ok(Some(user.id));
    }
    Ok(current.map(CurrentUser::id))
}

/// Resolve the user a public submission (contact form, review) is addressed to
pub async fn resolve_recipient(
    store: &dyn Store,
    user_id: Option<Uuid>,
    username: Option<&str>,
) -> Result<Uuid, ApiError> {
    let user = match (user_id, username.map(str::trim).filter(|s| !s.is_empty())) {
        (Some(id), _) => store.user_by_id(id).await?,
        (None, Some(username)) => store.user_by_username(username).await?,
        (None, None) => None,
    };
    user.map(|u| u.id)
        .ok_or_else(|| ApiError::not_found("User not found"))
}

pub fn ensure_owner(current: &CurrentUser, owner: Uuid, what: &str) -> Result<(), ApiError> {
    if current.id() == owner {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!("You do not own this {}", what)))
    }
}
