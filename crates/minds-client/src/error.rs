//! Client error types.

use std::fmt;

use thiserror::Error;

/// Which naming grammar a rejected name was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    /// Mind names: letter first, then letters/digits/underscore, at most 32 characters.
    Mind,
    /// Datasource names: same grammar, at most 62 characters.
    Datasource,
}

impl NameKind {
    /// Maximum accepted length for this kind of name.
    pub fn max_len(self) -> usize {
        match self {
            NameKind::Mind => 32,
            NameKind::Datasource => 62,
        }
    }
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameKind::Mind => f.write_str("Mind"),
            NameKind::Datasource => f.write_str("Datasource"),
        }
    }
}

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Resource not found (404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Access to the resource is forbidden (403).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Credentials missing or rejected (401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any other failing status code.
    #[error("{reason}: {body}")]
    Unknown {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        reason: String,
        /// Raw response body.
        body: String,
    },

    /// A user-supplied name does not match the naming grammar.
    #[error(
        "{kind} name '{name}' is invalid: it should start with a letter and contain only letters, numbers or underscore, with a maximum of {max} characters. Spaces are not allowed.",
        max = .kind.max_len()
    )]
    NameInvalid {
        /// Grammar that was violated.
        kind: NameKind,
        /// The rejected name.
        name: String,
    },

    /// The resource exists but is not of the expected kind.
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// A reference cannot be used where it was passed.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Stream error.
    #[error("Stream error: {0}")]
    Stream(String),

    /// The server answered successfully but with an unusable payload.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl Error {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Check if this is an authentication or authorization error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Unauthorized(_) | Error::Forbidden(_))
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Unknown { status, .. } if *status >= 500)
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Swallow `NotFound`, propagate everything else.
///
/// Used by replace-mode creation and by the reference resolver, where a
/// missing resource is the expected case rather than a failure.
pub(crate) fn ignore_not_found<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(Error::NotFound(message)) => {
            tracing::debug!(%message, "resource not found, continuing");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
