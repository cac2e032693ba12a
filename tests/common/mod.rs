//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use simple_crud_api::config::AppConfig;
use simple_crud_api::lifecycle::startup::serve_standalone;
use simple_crud_api::lifecycle::Shutdown;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A running standalone server on an ephemeral port.
pub struct TestServer {
    pub base_url: String,
    pub shutdown: Arc<Shutdown>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a standalone server with `config`, bound to 127.0.0.1:0.
pub async fn start_standalone(config: AppConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Arc::new(Shutdown::new());

    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        serve_standalone(listener, &config, server_shutdown).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{addr}"),
        shutdown,
    }
}

/// Start a mock worker that answers every request with `status` and `body`
/// plus an `x-worker` header naming itself.
pub async fn start_mock_worker(name: &'static str, status: u16, body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        // Read the request head; the mock ignores its content.
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;

                        let response = format!(
                            "HTTP/1.1 {status} Mock\r\nContent-Type: application/json\r\nx-worker: {name}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                            body.len()
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// An unused local address (bound, then released).
pub fn dead_address() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Client without connection pooling so every request opens a fresh socket.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

pub async fn json_body(response: reqwest::Response) -> Value {
    response.json().await.unwrap()
}
