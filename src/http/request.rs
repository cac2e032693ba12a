//! Request representation inside the pipeline.
//!
//! # Responsibilities
//! - Carry the buffered request (method, path, raw body) into the dispatcher
//! - Expose matched route parameters and the parsed body to validators and handlers
//! - Generate and propagate the `x-request-id` header
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Body is buffered before dispatch; parsing is a middleware concern

use axum::body::Bytes;
use axum::http::{HeaderName, Method};
use serde_json::{Map, Value};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::routing::Params;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// A fully buffered request as handed to the dispatcher.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub path: String,
    pub body: Bytes,
    pub request_id: Option<String>,
}

impl InboundRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: Bytes::new(),
            request_id: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

/// Per-request state shared by middleware, validator and handler.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: Option<String>,
    pub method: Method,
    pub path: String,
    /// Template that matched the path, e.g. `/api/users/:id`.
    pub template: String,
    pub params: Params,
    pub raw_body: Bytes,
    /// Parsed JSON body; `{}` until the body parser runs or when empty.
    pub body: Value,
}

impl RequestContext {
    pub fn new(request: InboundRequest, template: impl Into<String>, params: Params) -> Self {
        Self {
            request_id: request.request_id,
            method: request.method,
            path: request.path,
            template: template.into(),
            params,
            raw_body: request.body,
            body: Value::Object(Map::new()),
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Layer assigning a UUID `x-request-id` to requests that lack one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID), MakeRequestUuid)
}

/// Layer copying `x-request-id` from the request onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID))
}
