//! Errors surfaced by the retrier and by request construction.

use std::fmt;

use super::request::Method;

/// A call that could not produce a body.
///
/// Both variants carry the last observed HTTP status and a single-line
/// rendering of the last response body (or transport error), produced by
/// [`format_error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Status outside {200, 420, 429, 5xx}. Never retried.
    UnexpectedStatus { status: u16, body: String },
    /// Every attempt ended in a retryable failure.
    RetryExhausted {
        attempts: usize,
        /// `None` when no attempt reached the server.
        status: Option<u16>,
        detail: String,
    },
}

impl RequestError {
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::UnexpectedStatus { status, .. } => Some(*status),
            RequestError::RetryExhausted { status, .. } => *status,
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::UnexpectedStatus { status, body } => write!(
                f,
                "Response code is neither 200 nor retryable. Last status code {}, Response text: {}",
                status, body
            ),
            RequestError::RetryExhausted {
                attempts,
                status: Some(status),
                detail,
            } => write!(
                f,
                "No usable response after {} attempts. Last status code {}, Response text: {}",
                attempts, status, detail
            ),
            RequestError::RetryExhausted {
                attempts,
                status: None,
                detail,
            } => write!(
                f,
                "No response from website after {} attempts. Last error: {}",
                attempts, detail
            ),
        }
    }
}

impl std::error::Error for RequestError {}

/// Rejected [`RequestConfig`](super::RequestConfig) fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyUrl,
    NoAttempts,
    ZeroTimeout,
    PayloadWithoutPost(Method),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyUrl => write!(f, "A URL is required"),
            ConfigError::NoAttempts => write!(f, "max_attempts must be at least 1"),
            ConfigError::ZeroTimeout => write!(f, "timeout must be greater than zero"),
            ConfigError::PayloadWithoutPost(method) => {
                write!(f, "A payload can only be sent with POST, not {}", method)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Renders `error` on one line, prefixed with its type name.
///
/// ```
/// let line = scrapekit::http::format_error("line one\nline two");
/// assert_eq!(line, "Error Type: str, Error: line oneline two");
/// ```
pub fn format_error<E: fmt::Display + ?Sized>(error: &E) -> String {
    format!(
        "Error Type: {}, Error: {}",
        std::any::type_name::<E>(),
        error.to_string().replace('\n', "")
    )
}
