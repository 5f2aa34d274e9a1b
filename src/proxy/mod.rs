//! Browser-facing proxy in front of the API.
//!
//! Every `/api/*` request is re-issued against the configured API base URL
//! with a bounded timeout. Identity headers travel verbatim. Backend answers
//! (any status) pass through untouched; only availability failures (connect
//! errors, timeouts) are replaced by the route's `Fallback`. Bodies over the
//! forwarding limit get 413, any other failure 500.

pub mod fallback;

use axum::{
    body::{Body, Bytes},
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};
use url::Url;

use crate::middleware::{USERNAME_HEADER, USER_ID_HEADER};

pub use fallback::Fallback;

/// Headers copied from the browser request to the API request
const FORWARDED_HEADERS: [&str; 5] = [USER_ID_HEADER, USERNAME_HEADER, "authorization", "content-type", "accept"];

const MAX_FORWARDED_BODY: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Failed to build response: {0}")]
    Relay(String),

    #[error(transparent)]
    Upstream(#[from] reqwest::Error),
}

impl ProxyError {
    /// Connect failures and timeouts mean "API unreachable"; everything else is a real error
    pub fn is_unavailable(&self) -> bool {
        match self {
            ProxyError::Upstream(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

#[derive(Clone)]
pub struct ProxyState {
    client: reqwest::Client,
    api_url: Url,
}

impl ProxyState {
    pub fn new(api_url: Url, timeout: Duration) -> Result<Self, ProxyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, api_url })
    }

    /// The API URL for a browser path, keeping any path prefix of the base URL
    fn target(&self, path: &str, query: Option<&str>) -> Url {
        let mut url = self.api_url.clone();
        let base = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}/{}", base, path.trim_start_matches('/')));
        url.set_query(query);
        url
    }
}

pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/*path", any(forward))
        .layer(DefaultBodyLimit::max(MAX_FORWARDED_BODY))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "success": true, "data": { "status": "ok" } }))
}

/// Forward one request; swap availability failures for the route fallback
pub async fn forward(
    State(state): State<ProxyState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let path = uri.path().to_string();

    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!("Rejected body for {} {}: {}", method, path, rejection.body_text());
            return (
                rejection.status(),
                Json(json!({ "success": false, "error": rejection.body_text() })),
            )
                .into_response();
        }
    };

    let fallback = Fallback::for_request(&method, &path);
    let url = state.target(&path, uri.query());

    match send_upstream(&state, method.clone(), url, &headers, body).await {
        Ok(response) => response,
        Err(e) if e.is_unavailable() => {
            warn!("API unavailable for {} {}: {}; serving fallback", method, path, e);
            fallback.into_response()
        }
        Err(e) => {
            error!("Proxy error for {} {}: {}", method, path, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

async fn send_upstream(
    state: &ProxyState,
    method: Method,
    url: Url,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let mut upstream = state.client.request(method, url);
    for name in FORWARDED_HEADERS {
        if let Some(value) = headers.get(name) {
            upstream = upstream.header(name, value.clone());
        }
    }
    if !body.is_empty() {
        upstream = upstream.body(body);
    }

    let response = upstream.send().await?;
    let status = response.status();
    let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
    let bytes = response.bytes().await?;

    let mut relayed = Response::builder().status(status);
    if let Some(content_type) = content_type {
        relayed = relayed.header(header::CONTENT_TYPE, content_type);
    }
    relayed
        .body(Body::from(bytes))
        .map_err(|e| ProxyError::Relay(e.to_string()))
}
