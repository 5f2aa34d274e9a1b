use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use crate::api::dto::CreateReviewDto;
use crate::api::validation::ValidatedJson;
use crate::app::AppState;
use crate::auth::{bearer_token, verify_token};
use crate::database::models::{NewReview, Review};
use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;

use super::{parse_id, resolve_owner, resolve_recipient, OwnerQuery};

/// GET /api/reviews - `?userId=`/`?username=`, else the current user's, else all
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
    current: Option<CurrentUser>,
) -> ApiResult<Json<Vec<Review>>> {
    let owner = resolve_owner(state.store.as_ref(), &query, current.as_ref()).await?;
    Ok(Json(state.store.list_reviews(owner).await?))
}

/// POST /api/reviews - public; addressed by `userId` or `username`
pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateReviewDto>,
) -> ApiResult<(StatusCode, Json<Review>)> {
    let owner = resolve_recipient(state.store.as_ref(), dto.user_id, dto.username.as_deref()).await?;
    let review = state
        .store
        .create_review(
            owner,
            NewReview {
                name: dto.name.trim().to_string(),
                rating: dto.rating,
                comment: dto.comment,
                avatar_url: dto.avatar_url,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// DELETE /api/reviews/:id
///
/// Requires `Authorization: Bearer <token>` from `/api/auth/login`, and the
/// token's subject must own the review. Identity headers are not accepted here.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<Review>> {
    let token = bearer_token(&headers)?;
    let claims = verify_token(token, &state.config.security.jwt_secret)?;

    let id = parse_id(&id, "Review")?;
    let review = state
        .store
        .review(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Review not found"))?;
    if review.user_id != claims.sub {
        return Err(ApiError::forbidden("You do not own this review"));
    }

    Ok(Json(state.store.delete_review(review.id).await?))
}
