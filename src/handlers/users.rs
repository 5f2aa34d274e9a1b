use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::api::dto::{CreateUserDto, UpdateUserDto};
use crate::api::validation::ValidatedJson;
use crate::app::AppState;
use crate::auth::hash_password;
use crate::database::models::{NewUser, User, UserChanges};
use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;

use super::parse_id;

/// POST /api/users - register an account
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateUserDto>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let username = dto.username.trim().to_string();
    if state.store.user_by_username(&username).await?.is_some() {
        return Err(ApiError::conflict("Username already exists"));
    }

    let user = state
        .store
        .create_user(NewUser {
            email: dto.email.trim().to_string(),
            name: dto.name.trim().to_string(),
            username,
            password_hash: hash_password(&dto.password)?,
        })
        .await?;

    tracing::info!("Registered user {} ({})", user.username, user.id);
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users/:id
pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<User>> {
    let id = parse_id(&id, "User")?;
    state
        .store
        .user_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// GET /api/users/username/:username
pub async fn get_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<User>> {
    state
        .store
        .user_by_username(username.trim())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// PATCH /api/users/:id - profile edit, self only
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    current: CurrentUser,
    ValidatedJson(dto): ValidatedJson<UpdateUserDto>,
) -> ApiResult<Json<User>> {
    let id = parse_id(&id, "User")?;
    if current.id() != id {
        return Err(ApiError::forbidden("You can only edit your own profile"));
    }

    let password_hash = match dto.password.as_deref() {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };
    let changes = UserChanges {
        email: dto.email.map(|s| s.trim().to_string()),
        name: dto.name.map(|s| s.trim().to_string()),
        username: dto.username.map(|s| s.trim().to_string()),
        password_hash,
    };

    let user = state.store.update_user(id, changes).await?;
    Ok(Json(user))
}
