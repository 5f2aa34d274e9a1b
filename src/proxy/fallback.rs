//! What a proxy route answers with when the API cannot be reached.
//!
//! Read routes degrade to content the public site can still render; writes
//! report the outage so admin actions fail visibly.

use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// `200 []` for collections
    EmptyList,
    /// `200` with the default hero content
    DefaultHero,
    /// `200` with the default about content
    DefaultAbout,
    /// `404 {success:false}` for single-record lookups
    NotFound(&'static str),
    /// `503 {success:false}` for writes and anything without a safe default
    Unavailable,
}

pub fn default_hero() -> Value {
    json!({
        "title": "Hi, I'm a Developer",
        "description": "Welcome to my portfolio",
        "imageUrl": "/images/hero.jpg",
    })
}

pub fn default_about() -> Value {
    json!({
        "title": "About Me",
        "description": "I'm a passionate developer who loves building things.",
        "imageUrl": "/images/about.jpg",
    })
}

impl Fallback {
    /// Route table for the browser-facing paths
    pub fn for_request(method: &Method, path: &str) -> Self {
        if *method != Method::GET && *method != Method::HEAD {
            return Fallback::Unavailable;
        }

        let segments: Vec<&str> = path
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            ["api", "projects"] | ["api", "reviews"] | ["api", "contact"] => Fallback::EmptyList,
            ["api", "hero-section", _] => Fallback::DefaultHero,
            ["api", "about-section", _] => Fallback::DefaultAbout,
            ["api", "users", ..] | ["api", "auth", "me"] => Fallback::NotFound("User not found"),
            ["api", "projects", _] => Fallback::NotFound("Project not found"),
            _ => Fallback::Unavailable,
        }
    }
}

impl IntoResponse for Fallback {
    fn into_response(self) -> Response {
        match self {
            Fallback::EmptyList => (StatusCode::OK, Json(json!([]))).into_response(),
            Fallback::DefaultHero => (StatusCode::OK, Json(default_hero())).into_response(),
            Fallback::DefaultAbout => (StatusCode::OK, Json(default_about())).into_response(),
            Fallback::NotFound(message) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "success": false, "error": message })),
            )
                .into_response(),
            Fallback::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "success": false, "error": "Backend service is unavailable" })),
            )
                .into_response(),
        }
    }
}
