//! Request dispatcher.
//!
//! # Responsibilities
//! - Own the route table and the middleware chain
//! - Run transport check → match → middleware → validate → handle
//! - Convert every outcome into exactly one reply or error
//!
//! # Request States
//! ```text
//! Received → Matched | NotFound
//!          → Validated | Rejected
//!          → Handled | Failed
//!          → Responded (exactly once)
//! ```
//!
//! # Design Decisions
//! - Route table frozen once the Application is shared (Arc, no locks)
//! - (method, template) resolved directly to its entry, no event indirection
//! - The whole pipeline runs under one deadline
//! - Nothing is retried; one request failing never affects the listener

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::Method;

use crate::http::error::ApiError;
use crate::http::request::{InboundRequest, RequestContext};
use crate::http::route::{HandlerResult, Middleware, RouteEntry};
use crate::observability::metrics;
use crate::routing::{Registration, RouteTable, RouteTemplate, TemplateError};

/// Methods accepted at the transport check.
pub const ALLOWED_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::DELETE];

/// The per-process request dispatcher.
pub struct Application {
    routes: RouteTable<RouteEntry>,
    middlewares: Vec<Arc<dyn Middleware>>,
    request_timeout: Duration,
}

impl Application {
    pub fn new(request_timeout: Duration) -> Self {
        Self {
            routes: RouteTable::new(),
            middlewares: Vec::new(),
            request_timeout,
        }
    }

    /// Populate the route table. The first entry for a (template, method)
    /// pair wins; later duplicates are ignored.
    pub fn register_routes<I>(&mut self, entries: I) -> Result<(), TemplateError>
    where
        I: IntoIterator<Item = RouteEntry>,
    {
        for entry in entries {
            let template = RouteTemplate::parse(entry.template.clone())?;
            let method = entry.method.clone();
            if self.routes.insert(template, method, entry) == Registration::Duplicate {
                tracing::debug!("Duplicate route registration ignored");
            }
        }
        Ok(())
    }

    /// Append a middleware stage. Stages run in registration order.
    pub fn use_middleware<M: Middleware + 'static>(&mut self, middleware: M) {
        self.middlewares.push(Arc::new(middleware));
    }

    pub fn routes(&self) -> &RouteTable<RouteEntry> {
        &self.routes
    }

    /// Run one request through the pipeline.
    pub async fn dispatch(&self, request: InboundRequest) -> HandlerResult {
        let start = Instant::now();
        let method = request.method.clone();
        let path = request.path.clone();
        let request_id = request.request_id.clone().unwrap_or_default();

        let (route, outcome) =
            match tokio::time::timeout(self.request_timeout, self.run_pipeline(request)).await {
                Ok(result) => result,
                Err(_) => (
                    None,
                    Err(ApiError::internal(format!(
                        "request exceeded {}s deadline",
                        self.request_timeout.as_secs()
                    ))),
                ),
            };

        let route = route.unwrap_or("none");
        match &outcome {
            Ok(reply) => tracing::debug!(
                request_id = %request_id,
                method = %method,
                path = %path,
                route = route,
                status = reply.status().as_u16(),
                "Request handled"
            ),
            Err(err @ ApiError::Internal(_)) => tracing::error!(
                request_id = %request_id,
                method = %method,
                path = %path,
                route = route,
                error = %err,
                "Request failed"
            ),
            Err(err) => tracing::debug!(
                request_id = %request_id,
                method = %method,
                path = %path,
                route = route,
                error = %err,
                "Request rejected"
            ),
        }

        let status = match &outcome {
            Ok(reply) => reply.status(),
            Err(err) => err.status(),
        };
        metrics::record_request(method.as_str(), status.as_u16(), route, start);

        outcome
    }

    async fn run_pipeline(&self, request: InboundRequest) -> (Option<&str>, HandlerResult) {
        if let Err(err) = check_transport(&request) {
            return (None, Err(err));
        }

        let Some(resolved) = self.routes.lookup(&request.method, &request.path) else {
            return (None, Err(ApiError::entity_not_found("Endpoint")));
        };
        let route = Some(resolved.template.as_str());

        let mut ctx = RequestContext::new(request, resolved.template.as_str(), resolved.params);

        for middleware in &self.middlewares {
            if let Err(err) = middleware.handle(&mut ctx).await {
                return (route, Err(err));
            }
        }

        if let Some(validator) = &resolved.entry.validator {
            if let Err(err) = validator.validate(&ctx) {
                return (route, Err(err));
            }
        }

        (route, resolved.entry.handler.call(ctx).await)
    }
}

fn check_transport(request: &InboundRequest) -> Result<(), ApiError> {
    if request.path.is_empty() {
        return Err(ApiError::incorrect_field_type("url", "string"));
    }
    if !ALLOWED_METHODS.contains(&request.method) {
        let allowed: Vec<&str> = ALLOWED_METHODS.iter().map(Method::as_str).collect();
        return Err(ApiError::forbidden_option(request.method.as_str(), &allowed));
    }
    Ok(())
}
