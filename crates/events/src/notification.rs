//! Stream notifications and the stream error type.

use thiserror::Error;

/// Error carried by a stream's terminal `Error` notification.
///
/// Streams only ever carry a human-readable message; producers map their own
/// error types to a message before publishing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct StreamError(String);

impl StreamError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// A single event delivered to an observer.
///
/// A well-formed sequence is zero or more `Next` values followed by at most one
/// terminal notification (`Error` or `Complete`). Nothing is delivered after a
/// terminal notification.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification<T> {
    Next(T),
    Error(StreamError),
    Complete,
}

impl<T> Notification<T> {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Notification::Next(_))
    }

    /// Re-type a terminal notification. Returns `None` for `Next`.
    pub fn into_terminal<U>(self) -> Option<Notification<U>> {
        match self {
            Notification::Next(_) => None,
            Notification::Error(e) => Some(Notification::Error(e)),
            Notification::Complete => Some(Notification::Complete),
        }
    }
}
