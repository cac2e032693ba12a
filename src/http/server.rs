//! HTTP server setup.
//!
//! # Responsibilities
//! - Build the Axum router: one catch-all route feeding the dispatcher
//! - Wire up layers (request ID, tracing)
//! - Buffer request bodies up to the configured limit
//! - Serve on a listener until the shutdown broadcast fires
//!
//! # Design Decisions
//! - Axum only provides transport; matching happens in the dispatcher
//! - The same server type fronts both the dispatcher and the primary's proxy

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::http::dispatcher::Application;
use crate::http::error::ApiError;
use crate::http::request::{
    propagate_request_id_layer, set_request_id_layer, InboundRequest, X_REQUEST_ID,
};

#[derive(Clone)]
struct DispatchState {
    app: Arc<Application>,
    max_body_size: usize,
}

/// HTTP front end for one process.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Wrap an already routed Axum router with the common layers.
    pub fn new(router: Router) -> Self {
        let router = router
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer());
        Self { router }
    }

    /// Server feeding every request into `app`.
    pub fn application(app: Arc<Application>, config: &AppConfig) -> Self {
        let state = DispatchState {
            app,
            max_body_size: config.http.max_body_size,
        };
        let router = Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state);
        Self::new(router)
    }

    /// The layered router, for in-process tests.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Serve until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!(address = %addr, "HTTP server stopped");
        Ok(())
    }
}

async fn dispatch_handler(State(state): State<DispatchState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let request_id = parts
        .headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(error = %e, "Failed to read request body");
            return ApiError::BadRequest(format!("Failed to read request body: {e}"))
                .into_response();
        }
    };

    let mut inbound = InboundRequest::new(parts.method, parts.uri.path()).with_body(body);
    inbound.request_id = request_id;

    match state.app.dispatch(inbound).await {
        Ok(reply) => reply.into_response(),
        Err(err) => err.into_response(),
    }
}
