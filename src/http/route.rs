//! Route entries and the handler, validator and middleware seams.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::http::Method;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::http::error::ApiError;
use crate::http::request::RequestContext;
use crate::http::response::Reply;

/// Result of a handler invocation.
pub type HandlerResult = Result<Reply, ApiError>;

/// Business logic for one (template, method) pair.
pub trait Handler: Send + Sync {
    fn call(&self, ctx: RequestContext) -> BoxFuture<'static, HandlerResult>;
}

impl<F, Fut> Handler for F
where
    F: Fn(RequestContext) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, ctx: RequestContext) -> BoxFuture<'static, HandlerResult> {
        (self)(ctx).boxed()
    }
}

/// Synchronous input check run before the handler. Must not mutate state.
pub trait Validator: Send + Sync {
    fn validate(&self, ctx: &RequestContext) -> Result<(), ApiError>;
}

impl<F> Validator for F
where
    F: Fn(&RequestContext) -> Result<(), ApiError> + Send + Sync,
{
    fn validate(&self, ctx: &RequestContext) -> Result<(), ApiError> {
        (self)(ctx)
    }
}

/// Unconditional pipeline stage run for every matched request.
pub trait Middleware: Send + Sync {
    fn handle<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, Result<(), ApiError>>;
}

/// Static route configuration: {method, template, handler, validator?}.
#[derive(Clone)]
pub struct RouteEntry {
    pub method: Method,
    pub template: String,
    pub handler: Arc<dyn Handler>,
    pub validator: Option<Arc<dyn Validator>>,
}

impl RouteEntry {
    pub fn new(method: Method, template: impl Into<String>, handler: impl Handler + 'static) -> Self {
        Self {
            method,
            template: template.into(),
            handler: Arc::new(handler),
            validator: None,
        }
    }

    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("method", &self.method)
            .field("template", &self.template)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}
