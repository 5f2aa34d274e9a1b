use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::AppState;

/// GET / - service banner
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Portfolio API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "health": "/api/health",
                "auth": "/api/auth/login, /api/auth/me",
                "users": "/api/users[/:id | /username/:username]",
                "projects": "/api/projects[/:id]",
                "reviews": "/api/reviews[/:id]",
                "contact": "/api/contact[/:id[/status]]",
                "sections": "/api/hero-section/:username, /api/about-section/:username",
            }
        }
    }))
}

/// GET /api/health - liveness plus database reachability
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check database ping failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database_error": e.to_string()
                    }
                })),
            )
        }
    }
}
