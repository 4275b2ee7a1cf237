//! Error types for the maintenance console

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Coarse error classes surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or expired credential (401)
    Session,
    /// Role not allowed to perform the action (403)
    Authorization,
    /// Rejected locally before any request was made
    Validation,
    NotFound,
    /// Non-2xx response or structured error body
    Server,
    /// The request never reached the server
    Network,
    /// Anything produced by this process itself
    Internal,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server error ({status}): {}", detail.as_deref().unwrap_or("no detail"))]
    Server { status: u16, detail: Option<String> },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Build an error from a non-success HTTP status and the raw response body.
    ///
    /// The backend reports failures as `{"detail": ...}`; some routes use
    /// `{"message": ...}` instead. Validation failures carry a list in `detail`,
    /// which is kept as its JSON text.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let detail = extract_detail(body);
        let text = || detail.clone().unwrap_or_else(|| status.to_string());

        match status {
            StatusCode::UNAUTHORIZED => AppError::Authentication(text()),
            StatusCode::FORBIDDEN => AppError::Authorization(text()),
            StatusCode::NOT_FOUND => AppError::NotFound(text()),
            _ => AppError::Server {
                status: status.as_u16(),
                detail,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Authentication(_) => ErrorKind::Session,
            AppError::Authorization(_) => ErrorKind::Authorization,
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Server { .. } | AppError::Decode(_) => ErrorKind::Server,
            AppError::Network(_) => ErrorKind::Network,
            AppError::Config(_) | AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// 401 and 403 both end the session outside the scheduling flow
    pub fn is_session_failure(&self) -> bool {
        matches!(self, AppError::Authentication(_) | AppError::Authorization(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Authentication(_) => Some(401),
            AppError::Authorization(_) => Some(403),
            AppError::NotFound(_) => Some(404),
            AppError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server-provided detail, when the backend sent one
    pub fn detail(&self) -> Option<&str> {
        match self {
            AppError::Server { detail, .. } => detail.as_deref(),
            AppError::Authentication(msg)
            | AppError::Authorization(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg) => Some(msg.as_str()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            AppError::Server {
                status: status.as_u16(),
                detail: None,
            }
        } else {
            // connect, timeout, request and redirect failures: no response was received
            AppError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();
        messages.sort();
        messages.dedup();
        AppError::Validation(messages.join(" "))
    }
}

fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let field = value.get("detail").or_else(|| value.get("message"))?;
    match field {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Null => None,
        Value::String(_) => None,
        other => Some(other.to_string()),
    }
}

/// Result type alias for console operations
pub type AppResult<T> = Result<T, AppError>;
