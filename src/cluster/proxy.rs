//! Primary-side HTTP forwarding.
//!
//! # Responsibilities
//! - Pick the next worker round-robin
//! - Rewrite the request URI to the worker's address and forward it
//! - Relay status, headers and body back unchanged
//!
//! # Design Decisions
//! - No retries and no health filtering
//! - Forward failures and deadline expiry surface as the generic 500 envelope

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{
        header,
        uri::{PathAndQuery, Scheme},
        Request, Uri,
    },
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::cluster::balancer::{RoundRobin, WorkerRegistration};
use crate::http::error::ApiError;
use crate::http::request::X_REQUEST_ID;
use crate::observability::metrics;

#[derive(Clone)]
pub struct ProxyState {
    pub balancer: Arc<RoundRobin>,
    pub client: Client<HttpConnector, Body>,
    pub timeout: Duration,
}

impl ProxyState {
    pub fn new(balancer: Arc<RoundRobin>, timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            balancer,
            client,
            timeout,
        }
    }
}

/// Catch-all router forwarding every request to a worker.
pub fn proxy_router(state: ProxyState) -> Router {
    Router::new()
        .route("/{*path}", any(forward_handler))
        .route("/", any(forward_handler))
        .with_state(state)
}

/// Target URI on `worker` for the original request URI.
pub fn worker_uri(original: &Uri, worker: &WorkerRegistration) -> Result<Uri, axum::http::Error> {
    let path_and_query = original
        .path_and_query()
        .map(PathAndQuery::as_str)
        .unwrap_or("/");
    Uri::builder()
        .scheme(Scheme::HTTP)
        .authority(worker.addr.to_string())
        .path_and_query(path_and_query)
        .build()
}

async fn forward_handler(State(state): State<ProxyState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let Some(worker) = state.balancer.next_worker() else {
        tracing::error!(request_id = %request_id, "No workers registered");
        return ApiError::internal("no workers registered").into_response();
    };
    let worker_label = worker.addr.to_string();

    let (parts, body) = request.into_parts();
    let uri = match worker_uri(&parts.uri, &worker) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Failed to build worker URI");
            metrics::record_forward(&worker_label, 500);
            return ApiError::internal(e.to_string()).into_response();
        }
    };

    let mut builder = Request::builder().method(parts.method).uri(uri);
    if let Some(headers) = builder.headers_mut() {
        for (name, value) in parts.headers.iter() {
            if name != header::HOST {
                headers.append(name.clone(), value.clone());
            }
        }
    }
    let outbound = match builder.body(body) {
        Ok(req) => req,
        Err(e) => {
            metrics::record_forward(&worker_label, 500);
            return ApiError::internal(e.to_string()).into_response();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        worker = %worker_label,
        "Forwarding request"
    );

    let response = match tokio::time::timeout(state.timeout, state.client.request(outbound)).await {
        Ok(Ok(response)) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Ok(Err(e)) => {
            tracing::error!(request_id = %request_id, worker = %worker_label, error = %e, "Worker request failed");
            ApiError::internal(e.to_string()).into_response()
        }
        Err(_) => {
            tracing::error!(request_id = %request_id, worker = %worker_label, "Worker request timed out");
            ApiError::internal("worker request timed out").into_response()
        }
    };

    let status = response.status().as_u16();
    metrics::record_forward(&worker_label, status);
    metrics::record_request(method.as_str(), status, "proxy", start);
    response
}
