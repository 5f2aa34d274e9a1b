use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::api::dto::{CreateProjectDto, UpdateProjectDto};
use crate::api::validation::ValidatedJson;
use crate::app::AppState;
use crate::database::models::{NewProject, Project, ProjectChanges};
use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;

use super::{ensure_owner, parse_id, resolve_owner, OwnerQuery};

/// GET /api/projects - `?userId=`/`?username=`, else the current user's, else all
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
    current: Option<CurrentUser>,
) -> ApiResult<Json<Vec<Project>>> {
    let owner = resolve_owner(state.store.as_ref(), &query, current.as_ref()).await?;
    Ok(Json(state.store.list_projects(owner).await?))
}

/// GET /api/projects/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Project>> {
    let id = parse_id(&id, "Project")?;
    state
        .store
        .project(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Project not found"))
}

/// POST /api/projects - owned by the current user
pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedJson(dto): ValidatedJson<CreateProjectDto>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = state
        .store
        .create_project(
            current.id(),
            NewProject {
                title: dto.title.trim().to_string(),
                description: dto.description,
                image_url: dto.image_url,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// PATCH /api/projects/:id - owner only
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    current: CurrentUser,
    ValidatedJson(dto): ValidatedJson<UpdateProjectDto>,
) -> ApiResult<Json<Project>> {
    let project = owned_project(&state, &id, &current).await?;
    let changes = ProjectChanges {
        title: dto.title.map(|t| t.trim().to_string()),
        description: dto.description,
        image_url: dto.image_url,
    };
    Ok(Json(state.store.update_project(project.id, changes).await?))
}

/// DELETE /api/projects/:id - owner only; returns the removed project
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    current: CurrentUser,
) -> ApiResult<Json<Project>> {
    let project = owned_project(&state, &id, &current).await?;
    Ok(Json(state.store.delete_project(project.id).await?))
}

async fn owned_project(state: &AppState, raw_id: &str, current: &CurrentUser) -> ApiResult<Project> {
    let id = parse_id(raw_id, "Project")?;
    let project = state
        .store
        .project(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found"))?;
    ensure_owner(current, project.user_id, "project")?;
    Ok(project)
}
