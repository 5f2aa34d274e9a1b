mod common;

use std::time::Duration;

use anyhow::Result;
use axum::{
    http::{HeaderMap, StatusCode as AxumStatus},
    routing::get,
    Json, Router,
};
use reqwest::StatusCode;
use serde_json::{json, Value};

const TIMEOUT: Duration = Duration::from_secs(2);

async fn proxy_to_nowhere() -> Result<common::TestServer> {
    let dead = common::dead_backend()?;
    common::spawn_proxy(&dead, TIMEOUT).await
}

#[tokio::test]
async fn collections_degrade_to_empty_list() -> Result<()> {
    let proxy = proxy_to_nowhere().await?;
    let client = reqwest::Client::new();

    for path in ["/api/projects", "/api/reviews", "/api/contact"] {
        let res = client.get(format!("{}{}", proxy.base_url, path)).send().await?;
        assert_eq!(res.status(), StatusCode::OK, "{}", path);
        assert_eq!(res.json::<Value>().await?, json!([]), "{}", path);
    }
    Ok(())
}

#[tokio::test]
async fn sections_degrade_to_default_content() -> Result<()> {
    let proxy = proxy_to_nowhere().await?;
    let client = reqwest::Client::new();

    let hero: Value = client
        .get(format!("{}/api/hero-section/jane", proxy.base_url))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(hero["title"], "Hi, I'm a Developer");
    assert_eq!(hero["imageUrl"], "/images/hero.jpg");

    let about: Value = client
        .get(format!("{}/api/about-section/jane", proxy.base_url))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(about["title"], "About Me");
    Ok(())
}

#[tokio::test]
async fn single_lookups_degrade_to_not_found() -> Result<()> {
    let proxy = proxy_to_nowhere().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/users/username/jane", proxy.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn writes_report_unavailable() -> Result<()> {
    let proxy = proxy_to_nowhere().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/contact", proxy.base_url))
        .json(&json!({ "name": "Visitor", "email": "v@example.com", "message": "Hi", "username": "jane" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = res.json().await?;
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn slow_backend_times_out_into_fallback() -> Result<()> {
    let backend = common::spawn_router(Router::new().route(
        "/api/projects",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!([{ "title": "too late" }]))
        }),
    ))
    .await?;
    let proxy = common::spawn_proxy(&backend.base_url, Duration::from_millis(200)).await?;

    let res = reqwest::get(format!("{}/api/projects", proxy.base_url)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!([]));
    Ok(())
}

#[tokio::test]
async fn backend_answers_pass_through() -> Result<()> {
    let backend = common::spawn_router(
        Router::new()
            .route(
                "/api/auth/me",
                get(|headers: HeaderMap| async move {
                    let id = headers
                        .get("x-user-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    Json(json!({ "id": id }))
                }),
            )
            .route(
                "/api/projects/:id",
                get(|| async {
                    (
                        AxumStatus::NOT_FOUND,
                        Json(json!({ "statusCode": 404, "message": ["Project not found"], "error": "Not Found" })),
                    )
                }),
            ),
    )
    .await?;
    let proxy = common::spawn_proxy(&backend.base_url, TIMEOUT).await?;
    let client = reqwest::Client::new();

    let me: Value = client
        .get(format!("{}/api/auth/me", proxy.base_url))
        .header("x-user-id", "3f0c1b7e-0000-4000-8000-000000000001")
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(me["id"], "3f0c1b7e-0000-4000-8000-000000000001");

    // A backend 404 is an answer, not an outage
    let res = client
        .get(format!("{}/api/projects/abc", proxy.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["statusCode"], 404);
    assert!(body.get("success").is_none());
    Ok(())
}

#[tokio::test]
async fn broken_backend_response_is_a_proxy_error() -> Result<()> {
    let backend = common::spawn_truncating_backend().await?;
    let proxy = common::spawn_proxy(&backend.base_url, TIMEOUT).await?;

    let res = reqwest::get(format!("{}/api/projects/abc", proxy.base_url)).await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await?;
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn base_url_path_prefix_is_kept() -> Result<()> {
    let backend = common::spawn_router(Router::new().route(
        "/portfolio/api/projects",
        get(|| async { Json(json!([{ "title": "Mounted" }])) }),
    ))
    .await?;
    let proxy = common::spawn_proxy(&format!("{}/portfolio", backend.base_url), TIMEOUT).await?;

    let res = reqwest::get(format!("{}/api/projects?username=jane", proxy.base_url)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body[0]["title"], "Mounted");
    Ok(())
}

#[tokio::test]
async fn proxy_health() -> Result<()> {
    let proxy = proxy_to_nowhere().await?;
    let res = reqwest::get(format!("{}/health", proxy.base_url)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}
