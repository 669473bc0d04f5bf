use reqwest::StatusCode;
use thiserror::Error;

/// Failures raised by [`crate::client::ApiClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {}: {}", .status.as_u16(), .reason)]
    Status { status: StatusCode, reason: String },

    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn from_status(status: StatusCode) -> Self {
        ApiError::Status {
            status,
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// The only failure shape the controller ever sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoError {
    #[error("{0}")]
    Transport(String),

    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },

    #[error("{0}")]
    Application(String),
}

impl From<ApiError> for RepoError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { status, reason } => RepoError::Http {
                status: status.as_u16(),
                reason,
            },
            ApiError::Transport(_) | ApiError::Decode(_) | ApiError::InvalidUrl(_) => {
                RepoError::Transport(error_chain(&err))
            }
        }
    }
}

/// Joins an error with its `source()` chain, skipping causes whose text the
/// outer message already carries.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !text.is_empty() && !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
