//! Error taxonomy and the single error-to-response mapping.
//!
//! Every failure raised by the pipeline (matcher, middleware, validator,
//! handler, store) ends up as an `ApiError`. `IntoResponse` for `ApiError`
//! is the only place an error envelope is produced.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::http::response::Envelope;
use crate::store::StoreError;

/// Fixed message sent for every 500.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// HTTP-facing error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// 400: malformed request, body or parameter; failed validation.
    #[error("{0}")]
    BadRequest(String),

    /// 404: unmatched route or unknown entity.
    #[error("{0}")]
    NotFound(String),

    /// 500: anything unanticipated. The detail is logged, never sent.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the `errorMessage` field.
    pub fn client_message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => msg,
            ApiError::Internal(_) => INTERNAL_ERROR_MESSAGE,
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        ApiError::Internal(detail.into())
    }

    pub fn entity_not_found(entity: &str) -> Self {
        ApiError::NotFound(format!("{entity} not found"))
    }

    pub fn incorrect_field_type(field: &str, ty: &str) -> Self {
        ApiError::BadRequest(format!("Field \"{field}\" must have \"{ty}\" type"))
    }

    pub fn incorrect_array_field_type(field: &str, ty: &str) -> Self {
        ApiError::BadRequest(format!("Field \"{field}\" must have \"{ty}\" type in array"))
    }

    pub fn incorrect_field_range(field: &str, min: i64, max: i64) -> Self {
        ApiError::BadRequest(format!(
            "Field \"{field}\" must be more or equal \"{min}\" but less or equal than {max}"
        ))
    }

    pub fn incorrect_param_pattern(param: &str, pattern: &str) -> Self {
        ApiError::BadRequest(format!("Param \"{param}\" does not match \"{pattern}\" pattern"))
    }

    pub fn required_param(param: &str) -> Self {
        ApiError::BadRequest(format!("Param \"{param}\" must be specified"))
    }

    pub fn required_fields<S: AsRef<str>>(fields: &[S]) -> Self {
        ApiError::BadRequest(format!(
            "Must be specified all required fields: [{}]",
            join(fields)
        ))
    }

    pub fn extra_fields<S: AsRef<str>>(fields: &[S]) -> Self {
        ApiError::BadRequest(format!("It has extra fields: [{}]", join(fields)))
    }

    pub fn forbidden_option<S: AsRef<str>>(value: &str, allowed: &[S]) -> Self {
        ApiError::BadRequest(format!(
            "\"{value}\" forbidden. Available values: [{}]",
            join(allowed)
        ))
    }

    pub fn malformed_json() -> Self {
        ApiError::BadRequest("Incorrect data type. It must be like JSON structure".to_string())
    }
}

fn join<S: AsRef<str>>(items: &[S]) -> String {
    items.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", ")
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let envelope = Envelope::failure(status, self.client_message());
        (status, Json(envelope)).into_response()
    }
}
