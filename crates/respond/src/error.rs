use http::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HandlerError>;

/// Errors returned by fallible request handlers
///
/// Only `Status` carries an explicit HTTP status for the client; the
/// remaining variants map to 500 at the adapting wrapper.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Failure with a declared HTTP status and client-visible message
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    /// Response sink write failure
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Any other failure
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl HandlerError {
    /// Build a status-carrying error
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Explicit HTTP status carried by this error, if any
    pub const fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Io(_) | Self::Internal(_) => None,
        }
    }
}
