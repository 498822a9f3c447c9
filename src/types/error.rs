//! Error types for Bogga
//!
//! Every handler returns `Result<_, BoggaError>`. The router turns the error
//! into a `{ "error": <message> }` body with the status from `status_code()`.

use hyper::StatusCode;

/// Main error type for Bogga operations
#[derive(Debug, thiserror::Error)]
pub enum BoggaError {
    /// Bad or missing input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing, invalid or expired credential
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Valid credential, insufficient role
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource absent or not owned by the caller
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BoggaError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized() -> Self {
        Self::Unauthorized("Unauthorized".into())
    }

    pub fn forbidden() -> Self {
        Self::Forbidden("Forbidden".into())
    }

    pub fn not_found() -> Self {
        Self::NotFound("Not found".into())
    }

    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) | Self::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to the caller.
    ///
    /// Infrastructure failures never leak their details.
    pub fn public_message(&self) -> &str {
        match self {
            Self::BadRequest(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg) => msg,
            Self::Database(_) | Self::Internal(_) | Self::Config(_) => "Internal server error",
        }
    }

    /// True for failures that are not the caller's fault
    pub fn is_infrastructure(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl From<std::io::Error> for BoggaError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<rusqlite::Error> for BoggaError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<hyper::Error> for BoggaError {
    fn from(err: hyper::Error) -> Self {
        Self::Internal(format!("HTTP error: {}", err))
    }
}
