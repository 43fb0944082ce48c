//! Error types for Drive operations.
//!
//! Errors are categorized so the CLI can tell a network problem from a
//! rejected request. The reconciliation engine itself treats every error as
//! opaque; the categories only feed user-facing advice.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result type alias for Drive operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of Drive errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network-related errors.
    Network,
    /// Credential file or token exchange problem.
    Auth,
    /// The service account may not touch the file or permission.
    Permission,
    /// File or permission does not exist.
    NotFound,
    /// Unexpected response shape.
    Format,
    /// Other/unknown errors.
    Other,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::Auth => "Authentication failed",
            Self::Permission => "Permission denied",
            Self::NotFound => "File or permission not found",
            Self::Format => "Invalid API response",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check your internet connection and run again",
            Self::Auth => "Check the service account credential file",
            Self::Permission => "Share the file with the service account as an editor or owner",
            Self::NotFound => "Verify the file id in the permission file",
            Self::Format => "The Drive API returned something unexpected, run with -vv for details",
            Self::Other => "Check the error details for more information",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur during Drive operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Credential file could not be read or parsed.
    #[error("invalid credentials in {path}: {message}")]
    Credentials {
        /// Path of the credential file.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Token signing or exchange failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {message}")]
    HttpError {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// Invalid response from API.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// IO error while reading local files.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path involved in the error.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Create an IO error with path context.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an HTTP error.
    pub fn http(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::HttpError {
            message: message.into(),
            status,
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Credentials { .. } | Error::Auth(_) => ErrorCategory::Auth,
            Error::HttpError { status, .. } => match status {
                Some(401) => ErrorCategory::Auth,
                Some(403) => ErrorCategory::Permission,
                Some(404) => ErrorCategory::NotFound,
                Some(429) | Some(500..=599) | None => ErrorCategory::Network,
                Some(_) => ErrorCategory::Other,
            },
            Error::InvalidResponse(_) => ErrorCategory::Format,
            Error::Io { source, .. } => {
                if source.kind() == io::ErrorKind::PermissionDenied {
                    ErrorCategory::Permission
                } else {
                    ErrorCategory::Other
                }
            }
        }
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::HttpError {
                message: format!("HTTP {}", code),
                status: Some(code),
            },
            ureq::Error::Json(e) => Self::InvalidResponse(e.to_string()),
            other => Self::HttpError {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Auth(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_categories() {
        assert_eq!(Error::http("x", Some(401)).category(), ErrorCategory::Auth);
        assert_eq!(
            Error::http("x", Some(403)).category(),
            ErrorCategory::Permission
        );
        assert_eq!(Error::http("x", Some(404)).category(), ErrorCategory::NotFound);
        assert_eq!(Error::http("x", Some(503)).category(), ErrorCategory::Network);
        assert_eq!(Error::http("x", None).category(), ErrorCategory::Network);
        assert_eq!(Error::http("x", Some(400)).category(), ErrorCategory::Other);
    }

    #[test]
    fn test_io_permission_category() {
        let err = Error::io(
            "/tmp/credentials.json",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.category(), ErrorCategory::Permission);
        assert!(err.to_string().contains("/tmp/credentials.json"));
    }

    #[test]
    fn test_display_messages() {
        let err = Error::http("The user does not have sufficient permissions", Some(403));
        assert_eq!(
            err.to_string(),
            "HTTP request failed: The user does not have sufficient permissions"
        );
        assert!(!ErrorCategory::Permission.advice().is_empty());
    }
}
