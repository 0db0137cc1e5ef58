use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// Everything an orchestrator operation can fail with. Extraction failure is
/// deliberately not here: a null parse is a normal outcome carried by
/// [`crate::extract::Extracted`], never an error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing or malformed input: {0}")]
    Validation(String),
    #[error("Authentication required")]
    Unauthorized,
    #[error("Access denied")]
    Forbidden,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid session state: {0}")]
    InvalidState(String),
    #[error("Completion service failed: {0}")]
    Upstream(String),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// HTTP-style status class for the response envelope.
    pub fn status(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::Unauthorized => 401,
            Error::Forbidden => 403,
            Error::NotFound(_) => 404,
            Error::InvalidState(_) => 409,
            Error::Upstream(_) => 502,
            Error::Store(StoreError::NotFound(_)) => 404,
            Error::Store(_) => 500,
        }
    }

    pub fn from_validation(errors: validator::ValidationErrors) -> Self {
        Error::Validation(errors.to_string())
    }
}

/// Standard error envelope returned to external callers.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&Error> for ErrorBody {
    fn from(err: &Error) -> Self {
        match err {
            Error::Validation(_) => ErrorBody {
                error: "Missing required fields".to_string(),
                details: Some(err.to_string()),
            },
            Error::Unauthorized => ErrorBody {
                error: "Unauthorized".to_string(),
                details: None,
            },
            Error::Forbidden => ErrorBody {
                error: "Forbidden".to_string(),
                details: None,
            },
            Error::NotFound(what) => ErrorBody {
                error: format!("{} not found", what),
                details: None,
            },
            Error::InvalidState(_) | Error::Upstream(_) | Error::Store(_) => ErrorBody {
                error: err.to_string(),
                details: None,
            },
        }
    }
}
