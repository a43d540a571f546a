//! Portal error taxonomy
//!
//! Every handler failure ends up as one of these variants, which maps to a
//! status code and a JSON `error` message.

use hyper::StatusCode;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error("Invalid credentials")]
    Unauthorized,
    #[error("No students")]
    NoStudents,
    #[error("Request body exceeds {0} bytes")]
    PayloadTooLarge(u64),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl PortalError {
    pub fn student_not_found() -> Self {
        Self::NotFound("Student not found".to_string())
    }

    pub fn file_not_found() -> Self {
        Self::NotFound("File not found".to_string())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            // Duplicate admission numbers are reported as a bad request
            Self::Conflict(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NoStudents => StatusCode::OK,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Store(StoreError::InvalidKey(_)) => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand back to the client
    pub fn public_message(&self) -> String {
        match self {
            Self::Store(StoreError::InvalidKey(key)) => format!("Invalid identifier: {key:?}"),
            Self::Store(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}
