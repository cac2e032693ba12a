//! JSON body parsing middleware.
//!
//! # Responsibilities
//! - Decode the buffered request body as JSON
//! - Reject non-empty, non-JSON bodies with 400
//!
//! # Design Decisions
//! - GET bodies are ignored
//! - Empty (or whitespace-only) bodies parse as `{}`

use axum::http::Method;
use futures_util::future::BoxFuture;
use serde_json::{Map, Value};

use crate::http::error::ApiError;
use crate::http::request::RequestContext;
use crate::http::route::Middleware;

/// Fills `RequestContext::body` from `RequestContext::raw_body`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BodyParser;

impl Middleware for BodyParser {
    fn handle<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, Result<(), ApiError>> {
        Box::pin(async move {
            ctx.body = parse_body(&ctx.method, &ctx.raw_body)?;
            Ok(())
        })
    }
}

/// Decode `raw` according to the request method.
pub fn parse_body(method: &Method, raw: &[u8]) -> Result<Value, ApiError> {
    if *method == Method::GET || raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(raw).map_err(|_| ApiError::malformed_json())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_body_is_empty_object() {
        assert_eq!(parse_body(&Method::POST, b"").unwrap(), json!({}));
        assert_eq!(parse_body(&Method::PUT, b"  \n").unwrap(), json!({}));
    }

    #[test]
    fn test_get_body_is_ignored() {
        assert_eq!(parse_body(&Method::GET, b"not json").unwrap(), json!({}));
    }

    #[test]
    fn test_json_body_is_decoded() {
        let value = parse_body(&Method::POST, br#"{"username":"John Doe"}"#).unwrap();
        assert_eq!(value, json!({"username": "John Doe"}));
    }

    #[test]
    fn test_malformed_body_is_rejected() {
        let err = parse_body(&Method::POST, b"{username:").unwrap_err();
        assert_eq!(err, ApiError::malformed_json());
    }
}
