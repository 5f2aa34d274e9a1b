use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::User;
use crate::database::{Store, StoreError};
use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USERNAME_HEADER: &str = "x-username";

/// The user named by the identity headers, when one resolved.
///
/// Headers are an unverified hint: anything that needs real ownership
/// guarantees (review deletion) checks a bearer token on its own.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> Uuid {
        self.0.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum IdentityHint {
    Id(String),
    Username(String),
}

/// `x-user-id` wins when both headers are sent
fn identity_hint(headers: &HeaderMap) -> Option<IdentityHint> {
    let read = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    read(USER_ID_HEADER)
        .map(IdentityHint::Id)
        .or_else(|| read(USERNAME_HEADER).map(IdentityHint::Username))
}

async fn lookup(store: &dyn Store, hint: &IdentityHint) -> Result<Option<User>, StoreError> {
    match hint {
        IdentityHint::Id(raw) => match Uuid::parse_str(raw) {
            Ok(id) => store.user_by_id(id).await,
            // An id that cannot exist is just another miss
            Err(_) => Ok(None),
        },
        IdentityHint::Username(username) => store.user_by_username(username).await,
    }
}

/// Annotates the request with `CurrentUser` when the identity headers resolve.
/// Never rejects: misses and lookup errors are logged and the request continues.
pub async fn resolve_identity(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let Some(hint) = identity_hint(request.headers()) else {
        return next.run(request).await;
    };

    match lookup(state.store.as_ref(), &hint).await {
        Ok(Some(user)) => {
            debug!("Resolved identity {:?} to user {}", hint, user.id);
            request.extensions_mut().insert(CurrentUser(user));
        }
        Ok(None) | Err(StoreError::NotFound(_)) => {
            debug!("Identity {:?} did not resolve; continuing unauthenticated", hint);
        }
        Err(e) => {
            warn!("Identity lookup for {:?} failed: {}; continuing unauthenticated", hint, e);
        }
    }

    next.run(request).await
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
