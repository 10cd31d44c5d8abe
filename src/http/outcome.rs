//! Classification of a single attempt.

use super::transport::{Reply, TransportError};

/// Why an attempt did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cause {
    Status { status: u16, body: String },
    Transport(TransportError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    Success { body: String },
    RetryableFailure(Cause),
    /// Only an HTTP status can be fatal.
    FatalFailure { status: u16, body: String },
}

/// 420 (Enhance Your Calm), 429 (Too Many Requests) and every 5xx.
pub fn is_retryable_status(status: u16) -> bool {
    status == 420 || status == 429 || status >= 500
}

impl RequestOutcome {
    /// Only HTTP-level signals can be fatal; a transport error is always
    /// worth another attempt.
    pub fn classify(attempt: Result<Reply, TransportError>) -> Self {
        match attempt {
            Err(e) => RequestOutcome::RetryableFailure(Cause::Transport(e)),
            Ok(Reply { status: 200, body }) => RequestOutcome::Success { body },
            Ok(Reply { status, body }) if is_retryable_status(status) => {
                RequestOutcome::RetryableFailure(Cause::Status { status, body })
            }
            Ok(Reply { status, body }) => RequestOutcome::FatalFailure { status, body },
        }
    }
}
