use backend_domain::{PlatformError, VendorError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Vendor(#[from] VendorError),
    #[error(transparent)]
    Platform(PlatformError),
    #[error("user information unavailable after {attempts} attempts")]
    UserInfoUnavailable { attempts: u32 },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<PlatformError> for AppError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::Unauthorized => AppError::Unauthorized,
            other => AppError::Platform(other),
        }
    }
}
