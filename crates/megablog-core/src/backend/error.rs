use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Categories of backend errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendErrorKind {
    /// Non-success HTTP status other than 401/404
    HttpStatus,
    /// No valid session (401)
    Unauthorized,
    /// Document or file does not exist (404)
    NotFound,
    /// Connection or request timeout
    Timeout,
    /// Connection refused, DNS failure, TLS error
    Network,
    /// Response body could not be decoded
    Parse,
    /// Local file could not be read
    Io,
}

impl fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendErrorKind::HttpStatus => write!(f, "http_status"),
            BackendErrorKind::Unauthorized => write!(f, "unauthorized"),
            BackendErrorKind::NotFound => write!(f, "not_found"),
            BackendErrorKind::Timeout => write!(f, "timeout"),
            BackendErrorKind::Network => write!(f, "network"),
            BackendErrorKind::Parse => write!(f, "parse"),
            BackendErrorKind::Io => write!(f, "io"),
        }
    }
}

/// Structured error returned by every fallible facade operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendError {
    /// Error category
    pub kind: BackendErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

pub type BackendResult<T> = Result<T, BackendError>;

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Builds an error from a non-success response.
    ///
    /// Appwrite bodies look like `{"message": "...", "code": 401, "type": "..."}`;
    /// the `message` becomes the display text.
    pub fn http_status(status: u16, body: &str) -> Self {
        let kind = match status {
            401 => BackendErrorKind::Unauthorized,
            404 => BackendErrorKind::NotFound,
            _ => BackendErrorKind::HttpStatus,
        };

        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|json| {
                json.get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .filter(|msg| !msg.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP {status}"));

        Self {
            kind,
            message,
            details: (!body.is_empty()).then(|| body.to_string()),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Timeout, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Parse, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Io, message)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == BackendErrorKind::Unauthorized
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == BackendErrorKind::NotFound
    }

    /// Classifies a transport error.
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::timeout(format!("Request timed out: {e}"))
        } else if e.is_decode() {
            Self::parse(format!("Failed to decode response: {e}"))
        } else if e.is_connect() {
            Self::new(BackendErrorKind::Network, format!("Connection failed: {e}"))
        } else {
            Self::new(BackendErrorKind::Network, format!("Request error: {e}"))
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for BackendError {}
