use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use portfolio_api::proxy::{self, ProxyState};
use url::Url;

pub struct TestServer {
    pub base_url: String,
}

/// Serve `router` on a free local port for the rest of the test
pub async fn spawn_router(router: Router) -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
    })
}

/// A proxy pointed at `api_url`
pub async fn spawn_proxy(api_url: &str, timeout: Duration) -> Result<TestServer> {
    let api_url = Url::parse(api_url).context("bad api url")?;
    let state = ProxyState::new(api_url, timeout)?;
    spawn_router(proxy::router(state)).await
}

/// Base URL of a port nothing is listening on
pub fn dead_backend() -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    Ok(format!("http://127.0.0.1:{}", port))
}

/// A backend that promises a JSON body, sends part of it, then hangs up
pub async fn spawn_truncating_backend() -> Result<TestServer> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            // Read the whole request head before answering
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => head.extend_from_slice(&buf[..n]),
                }
            }
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 100\r\n\r\n[{\"title\":")
                .await;
            let _ = socket.shutdown().await;
        }
    });

    Ok(TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
    })
}
