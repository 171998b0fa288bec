//! Gateway-owned error vocabulary.
//!
//! Every error body returned by the gateway has the shape
//! `{code, message, details}`. The codes are stable: clients key on them,
//! so backend wording never leaks through except for business-status
//! errors, which the billing service itself owns.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Machine-readable error body shared with the billing service protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: String,
}

impl ResponseErrorMessage {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            details: String::new(),
        }
    }

    pub fn with_details(mut self, details: String) -> Self {
        self.details = details;
        self
    }

    pub fn unknown() -> Self {
        Self::new("ma000001", "unknown error. try request later")
    }

    pub fn validation_failed() -> Self {
        Self::new("ma000002", "validation failed")
    }

    pub fn internal() -> Self {
        Self::new("ma000003", "internal error")
    }

    pub fn incorrect_order_id() -> Self {
        Self::new("ma000008", "incorrect order identifier")
    }

    pub fn signature_header_empty() -> Self {
        Self::new("ma000022", "header with request signature can't be empty")
    }

    pub fn request_params_incorrect() -> Self {
        Self::new("ma000023", "incorrect request parameters")
    }

    pub fn request_data_invalid() -> Self {
        Self::new("ma000026", "request data invalid")
    }

    pub fn incorrect_zip() -> Self {
        Self::new("ma000073", "incorrect zip code")
    }
}

/// An HTTP error response: a status code plus the public error body.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: ResponseErrorMessage,
}

impl ApiError {
    pub fn new(status: StatusCode, message: ResponseErrorMessage) -> Self {
        Self { status, message }
    }

    pub fn bad_request(message: ResponseErrorMessage) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Generic 500 used when a facade call fails at the transport level.
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ResponseErrorMessage::internal())
    }

    /// 500 with the "unknown error" body, used on signature-check transport
    /// failures and redirect URL build failures.
    pub fn unknown() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ResponseErrorMessage::unknown())
    }

    /// Pass a billing business-status error through verbatim. The backend
    /// owns the end-user text for these.
    pub fn from_business(status: i32, message: Option<ResponseErrorMessage>) -> Self {
        let status = u16::try_from(status)
            .ok()
            .and_then(|s| StatusCode::from_u16(s).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, message.unwrap_or_else(ResponseErrorMessage::unknown))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.message)).into_response()
    }
}
