//! HTTP requests with status-aware retries.

mod client;
mod error;
mod logger;
mod outcome;
mod request;
mod retrier;
mod retry;
mod transport;

pub use client::{AsyncClient, BlockingClient};
pub use error::{ConfigError, RequestError, format_error};
pub use logger::{DEFAULT_LOG_TARGET, RetryLogger};
pub use outcome::{Cause, RequestOutcome, is_retryable_status};
pub use request::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_SLEEP_SECS, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
    Method, RequestConfig, RequestConfigBuilder,
};
pub use retrier::{RequestRetrier, ShortcutError};
pub use retry::{RetryState, Step, run_async, run_blocking};
pub use transport::{AsyncTransport, Reply, Transport, TransportError};
