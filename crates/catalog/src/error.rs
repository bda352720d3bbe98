//! Fetch and configuration errors.

use thiserror::Error;

/// Failure of a single catalog fetch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// No response reached the client (connect, timeout, TLS, ...).
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with an unsuccessful status code.
    #[error("backend error ({status}): {error}")]
    Backend { status: u16, error: String },

    /// The backend answered 2xx but the body was not the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl FetchError {
    /// Build a [`FetchError::Backend`] from a raw response body.
    ///
    /// A JSON body with an `error` field contributes that field; any other body
    /// is used verbatim, and an empty body falls back to `reason`.
    pub fn backend(status: u16, body: &str, reason: &str) -> Self {
        let from_json = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| match value.get("error")? {
                serde_json::Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            });

        let error = match from_json {
            Some(error) => error,
            None if body.trim().is_empty() => reason.to_string(),
            None => body.trim().to_string(),
        };

        FetchError::Backend { status, error }
    }

    /// The message shown to the user for this failure.
    ///
    /// Shared by every catalog resource (products, categories, suppliers).
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Network(msg) | FetchError::Decode(msg) => {
                format!("An error occurred: {msg}")
            }
            FetchError::Backend { status, error } => {
                format!("Backend returned code {status}: {error}")
            }
        }
    }
}

/// Invalid catalog configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}={value:?} is invalid: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}
