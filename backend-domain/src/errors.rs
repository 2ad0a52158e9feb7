use serde::Serialize;
use thiserror::Error;

/// Failure talking to the vendor API.
#[derive(Debug, Clone, Error, Serialize, PartialEq)]
#[error("vendor request failed: {message}")]
pub struct VendorError {
    pub status: Option<u16>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl VendorError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            body: None,
        }
    }

    pub fn status(status: u16, body: String) -> Self {
        Self {
            status: Some(status),
            message: format!("vendor responded with status {status}"),
            body: (!body.trim().is_empty()).then_some(body),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlatformError {
    #[error("platform session is missing or expired")]
    Unauthorized,
    #[error("platform responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("platform transport error: {0}")]
    Transport(String),
    #[error("platform response could not be decoded: {0}")]
    Decode(String),
    #[error("preference storage error: {0}")]
    Storage(String),
}
