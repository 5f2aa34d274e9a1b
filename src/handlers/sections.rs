use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::dto::{is_username, UpsertSectionDto};
use crate::api::validation::{ValidatedJson, Violation};
use crate::app::AppState;
use crate::auth::UNUSABLE_PASSWORD;
use crate::database::models::{NewUser, Section, SectionChanges, SectionKind};
use crate::error::{ApiError, ApiResult};

/// GET /api/hero-section/:username
pub async fn get_hero(state: State<AppState>, username: Path<String>) -> ApiResult<Json<Section>> {
    get_section(SectionKind::Hero, state, username).await
}

/// PATCH /api/hero-section/:username
pub async fn upsert_hero(
    state: State<AppState>,
    username: Path<String>,
    body: ValidatedJson<UpsertSectionDto>,
) -> ApiResult<Json<Section>> {
    upsert_section(SectionKind::Hero, state, username, body).await
}

/// GET /api/about-section/:username
pub async fn get_about(state: State<AppState>, username: Path<String>) -> ApiResult<Json<Section>> {
    get_section(SectionKind::About, state, username).await
}

/// PATCH /api/about-section/:username
pub async fn upsert_about(
    state: State<AppState>,
    username: Path<String>,
    body: ValidatedJson<UpsertSectionDto>,
) -> ApiResult<Json<Section>> {
    upsert_section(SectionKind::About, state, username, body).await
}

async fn get_section(
    kind: SectionKind,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<Section>> {
    state
        .store
        .section(kind, username.trim())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("{} not found", kind.label())))
}

/// Creates or updates the section. A username with no account gets one
/// provisioned on the spot, with a login-disabled password.
async fn upsert_section(
    kind: SectionKind,
    State(state): State<AppState>,
    Path(username): Path<String>,
    ValidatedJson(dto): ValidatedJson<UpsertSectionDto>,
) -> ApiResult<Json<Section>> {
    let username = username.trim().to_string();
    if !is_username(&username) {
        return Err(ApiError::validation(vec![Violation::field(
            "username",
            "matches",
            crate::api::dto::messages::USERNAME_CHARSET,
        )]));
    }

    let provision = NewUser {
        email: dto
            .email
            .clone()
            .unwrap_or_else(|| format!("{}@localhost", username)),
        name: dto.name.clone().unwrap_or_else(|| username.clone()),
        username: username.clone(),
        password_hash: UNUSABLE_PASSWORD.to_string(),
    };
    let changes = SectionChanges {
        title: dto.title,
        description: dto.description,
        image_url: dto.image_url,
    };

    let section = state.store.upsert_section(kind, &username, changes, provision).await?;
    tracing::info!("Upserted {} for {}", kind.label(), username);
    Ok(Json(section))
}
