//! Error types for the page controller.

use thiserror::Error;

/// Errors surfaced by controller operations.
///
/// None of these are fatal to a page session. Callers log them and fall back
/// to an alert or a full reload.
#[derive(Debug, Error)]
pub enum UiError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),
    /// The server answered with a non-success status.
    #[error("server returned HTTP {status}")]
    Status { status: u16 },
    /// A CSS selector failed to parse.
    #[error("invalid selector {selector:?}: {message}")]
    Selector { selector: String, message: String },
    /// A URL could not be built or resolved.
    #[error("url error: {0}")]
    Url(#[from] url::ParseError),
    /// The page has no URL to navigate relative to.
    #[error("page has no location")]
    NoLocation,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The local store could not be read or written.
    #[error("local store error: {0}")]
    Store(String),
    #[error("clipboard error: {0}")]
    Clipboard(String),
}

impl From<reqwest::Error> for UiError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => UiError::Status {
                status: status.as_u16(),
            },
            None => UiError::Transport(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, UiError>;
