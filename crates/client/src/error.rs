use serde::Deserialize;
use thiserror::Error;

use gambit_store::KvError;

/// Errors that can occur when talking to the content API.
#[derive(Debug, Error)]
pub enum Error {
    /// Connection error (network failure, DNS resolution, etc.).
    #[error("connection error: {0}")]
    Connection(String),

    /// Non-2xx HTTP response without a parseable CMS error body.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// Structured error returned by the CMS.
    #[error("API error [{name}]: {message}")]
    Api {
        /// HTTP status code reported in the error body.
        status: u16,
        /// Error name (e.g. `ValidationError`).
        name: String,
        /// Error message.
        message: String,
    },

    /// Response deserialization error.
    #[error("failed to deserialize response: {0}")]
    Deserialization(String),

    /// Client configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Session store failure.
    #[error("session store error: {0}")]
    Store(#[from] KvError),
}

impl Error {
    /// Returns `true` if this error is worth retrying: connection
    /// failures and 5xx responses.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) => true,
            Self::Http { status, .. } | Self::Api { status, .. } => *status >= 500,
            Self::Deserialization(_) | Self::Configuration(_) | Self::Store(_) => false,
        }
    }

    /// Returns `true` if the server rejected the request's credentials.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::Http { status: 401, .. } | Self::Api { status: 401, .. }
        )
    }
}

/// Error envelope the CMS returns for failed requests.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_error_is_retryable() {
        assert!(Error::Connection("timeout".to_owned()).is_retryable());
    }

    #[test]
    fn http_5xx_is_retryable_4xx_is_not() {
        let err = Error::Http {
            status: 503,
            message: "Service Unavailable".to_owned(),
        };
        assert!(err.is_retryable());

        let err = Error::Http {
            status: 404,
            message: "Not Found".to_owned(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn unauthorized_predicate() {
        let err = Error::Api {
            status: 401,
            name: "UnauthorizedError".to_owned(),
            message: "Missing or invalid credentials".to_owned(),
        };
        assert!(err.is_unauthorized());
        assert!(!err.is_retryable());

        let err = Error::Http {
            status: 401,
            message: "Unauthorized".to_owned(),
        };
        assert!(err.is_unauthorized());
    }

    #[test]
    fn error_body_parses_partial_payloads() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"error":{"message":"boom"}}"#).unwrap();
        assert_eq!(body.error.message.as_deref(), Some("boom"));
        assert_eq!(body.error.status, None);
    }
}
