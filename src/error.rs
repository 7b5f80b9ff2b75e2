// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for kuriiri
//!
//! Session errors are split by when they surface: identifier and corruption
//! errors abort an invocation before any network activity, malformed cookies
//! are recovered per cookie, and write failures are reported after the
//! response has been shown.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for kuriiri operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for kuriiri
#[derive(Error, Debug)]
pub enum Error {
    /// Session selector cannot be turned into a storage location
    #[error("Invalid session '{token}': {reason}")]
    InvalidIdentifier { token: String, reason: String },

    /// Session file exists but does not hold session data
    #[error("Corrupt session file {}: {reason}", path.display())]
    CorruptSession { path: PathBuf, reason: String },

    /// A single Set-Cookie value could not be parsed
    #[error("Malformed cookie '{header}': {reason}")]
    MalformedCookie { header: String, reason: String },

    /// Updated session could not be written back
    #[error("Session not saved to {}: {source}", path.display())]
    PersistenceWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Request item on the command line could not be parsed
    #[error("Invalid request item '{item}': {reason}")]
    InvalidRequestItem { item: String, reason: String },

    /// Redirect limit exceeded
    #[error("Too many redirects (--max-redirects={max})")]
    TooManyRedirects { max: usize },

    /// Timeout error
    #[error("Request timed out after {duration_ms}ms: {url}")]
    Timeout { url: String, duration_ms: u64 },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an invalid session identifier error
    pub fn invalid_identifier(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidIdentifier {
            token: token.into(),
            reason: reason.into(),
        }
    }

    /// Create a corrupt session error
    pub fn corrupt_session(path: &Path, reason: impl ToString) -> Self {
        Error::CorruptSession {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Create a malformed cookie error
    pub fn malformed_cookie(header: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedCookie {
            header: header.into(),
            reason: reason.into(),
        }
    }

    /// Create a persistence write failure
    pub fn write_failure(path: &Path, source: std::io::Error) -> Self {
        Error::PersistenceWriteFailure {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Create an invalid request item error
    pub fn request_item(item: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidRequestItem {
            item: item.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Check if this error belongs to the session subsystem
    pub fn is_session_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidIdentifier { .. }
                | Error::CorruptSession { .. }
                | Error::MalformedCookie { .. }
                | Error::PersistenceWriteFailure { .. }
        )
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Timeout { .. } => true,
            Error::Http(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Check if this error must abort the invocation before the request is sent
    pub fn is_fatal_before_request(&self) -> bool {
        matches!(
            self,
            Error::InvalidIdentifier { .. } | Error::CorruptSession { .. }
        )
    }

    /// Process exit status for this error
    pub fn exit_status(&self) -> u8 {
        match self {
            Error::PersistenceWriteFailure { .. } => 7,
            Error::TooManyRedirects { .. } => 6,
            e if e.is_timeout() => 2,
            _ => 1,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_errors() {
        let err = Error::invalid_identifier("a/b c", "bad name");
        assert!(err.is_session_error());
        assert!(err.is_fatal_before_request());
        assert_eq!(err.exit_status(), 1);

        let err = Error::corrupt_session(Path::new("/tmp/s.json"), "expected value");
        assert!(err.is_fatal_before_request());
        assert!(err.to_string().contains("/tmp/s.json"));
    }

    #[test]
    fn test_write_failure_status() {
        let err = Error::write_failure(
            Path::new("/ro/s.json"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );

        assert!(err.is_session_error());
        assert!(!err.is_fatal_before_request());
        assert_eq!(err.exit_status(), 7);
    }

    #[test]
    fn test_redirect_and_timeout_status() {
        assert_eq!(Error::TooManyRedirects { max: 3 }.exit_status(), 6);

        let err = Error::Timeout {
            url: "http://example.com".to_string(),
            duration_ms: 100,
        };
        assert!(err.is_timeout());
        assert_eq!(err.exit_status(), 2);
    }
}
