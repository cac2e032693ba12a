//! Response envelope and serialization.
//!
//! # Responsibilities
//! - Wrap handler results in the uniform JSON envelope
//! - Emit an empty body for 204 No Content
//!
//! # Design Decisions
//! - Success carries `data`, failure carries `errorMessage`, never both
//! - Payloads are converted to `serde_json::Value` at construction so
//!   serialization failures surface as errors before anything is written

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::error::ApiError;

/// Wire envelope shared by success and failure responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Envelope {
    pub fn success(status: StatusCode, data: Value) -> Self {
        Self {
            status_code: status.as_u16(),
            data: Some(data),
            error_message: None,
        }
    }

    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            data: None,
            error_message: Some(message.into()),
        }
    }
}

/// A successful handler result.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    status: StatusCode,
    data: Option<Value>,
}

impl Reply {
    /// 200 with `data`.
    pub fn ok<T: Serialize + ?Sized>(data: &T) -> Result<Self, ApiError> {
        Self::with_status(StatusCode::OK, data)
    }

    /// 201 with `data`.
    pub fn created<T: Serialize + ?Sized>(data: &T) -> Result<Self, ApiError> {
        Self::with_status(StatusCode::CREATED, data)
    }

    /// 204, empty body.
    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            data: None,
        }
    }

    pub fn with_status<T: Serialize + ?Sized>(status: StatusCode, data: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(data)
            .map_err(|e| ApiError::internal(format!("response serialization failed: {e}")))?;
        Ok(Self {
            status,
            data: Some(value),
        })
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self.data {
            Some(data) if self.status != StatusCode::NO_CONTENT => {
                (self.status, Json(Envelope::success(self.status, data))).into_response()
            }
            _ => self.status.into_response(),
        }
    }
}
