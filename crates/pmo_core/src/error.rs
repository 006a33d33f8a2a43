use thiserror::Error;

use crate::normalize::NormalizeError;

#[derive(Debug, Error)]
pub enum PmoError {
    #[error("{0}")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("malformed stored document: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("internal: {0}")]
    Internal(#[from] anyhow::Error),
}

impl PmoError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Validation(_) => 422,
            Self::Normalize(_) => 500,
            Self::Internal(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, PmoError>;
