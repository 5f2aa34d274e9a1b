use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::api::dto::LoginDto;
use crate::api::validation::ValidatedJson;
use crate::app::AppState;
use crate::auth::{issue_token, verify_password, Claims};
use crate::database::models::User;
use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;

/// POST /api/auth/login - exchange username/password for a session token
///
/// ```json
/// { "token": "eyJhbGciOiJIUzI1NiI...", "user": { "id": "...", "username": "jane", ... } }
/// ```
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginDto>,
) -> ApiResult<Json<Value>> {
    let invalid = || ApiError::unauthorized("Invalid username or password");

    let user = state
        .store
        .user_by_username(dto.username.trim())
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&dto.password, &user.password_hash) {
        tracing::debug!("Rejected login for {}", user.username);
        return Err(invalid());
    }

    let security = &state.config.security;
    let claims = Claims::for_user(&user, security.jwt_expiry_hours);
    let token = issue_token(&claims, &security.jwt_secret)?;

    Ok(Json(json!({
        "token": token,
        "expiresAt": claims.exp,
        "user": user,
    })))
}

/// GET /api/auth/me - the user the identity headers resolved to
pub async fn me(current: CurrentUser) -> Json<User> {
    Json(current.0)
}
