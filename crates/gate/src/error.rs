//! Rejections produced by the gate.
//!
//! Each variant is terminal for its request and maps to a fixed status code
//! and a JSON body of the form `{"error": "<message>"}`.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    /// Credential missing, unrecognised, or the body was malformed.
    #[error("Unauthorized access")]
    Unauthorized,

    /// Credential valid but the prompt failed the allow-list.
    #[error("Invalid input detected")]
    InvalidInput,
}

impl GateError {
    pub fn status(&self) -> StatusCode {
        match self {
            GateError::Unauthorized => StatusCode::UNAUTHORIZED,
            GateError::InvalidInput => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
