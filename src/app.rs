use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::{AppConfig, SecurityConfig};
use crate::database::Store;
use crate::handlers;
use crate::middleware::{resolve_identity, USERNAME_HEADER, USER_ID_HEADER};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let max_body = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state.config.security);

    Router::new()
        .route("/", get(handlers::health::root))
        .nest("/api", api_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(max_body)),
        )
        .with_state(state)
}

fn api_routes(state: AppState) -> Router<AppState> {
    use handlers::{auth, contact, projects, reviews, sections, users};

    Router::new()
        .route("/health", get(handlers::health::health))
        // Sessions
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Users
        .route("/users", post(users::register))
        .route("/users/username/:username", get(users::get_by_username))
        .route("/users/:id", get(users::get_by_id).patch(users::update))
        // Projects
        .route("/projects", get(projects::list).post(projects::create))
        .route(
            "/projects/:id",
            get(projects::get).patch(projects::update).delete(projects::delete),
        )
        // Reviews
        .route("/reviews", get(reviews::list).post(reviews::create))
        .route("/reviews/:id", delete(reviews::delete))
        // Contact form
        .route("/contact", get(contact::list).post(contact::create))
        .route("/contact/:id", delete(contact::delete))
        .route("/contact/:id/status", patch(contact::update_status))
        // Sections
        .route(
            "/hero-section/:username",
            get(sections::get_hero).patch(sections::upsert_hero),
        )
        .route(
            "/about-section/:username",
            get(sections::get_about).patch(sections::upsert_about),
        )
        .layer(middleware::from_fn_with_state(state, resolve_identity))
}

/// Origins come from CORS_ORIGIN; `*` mirrors the caller's origin because
/// browsers refuse a literal wildcard on credentialed requests.
fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(USERNAME_HEADER),
        ]);

    if security.allows_any_origin() {
        return base.allow_origin(AllowOrigin::mirror_request());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    base.allow_origin(origins)
}
