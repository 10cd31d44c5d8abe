//! The seam between the retry loop and the network.

use async_trait::async_trait;
use std::fmt;

use super::error::format_error;
use super::request::RequestConfig;

/// What came back from one attempt that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// An attempt that never produced a status: connect failure, timeout, DNS,
/// a body that could not be read, or a client that could not be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    rendered: String,
}

impl TransportError {
    pub fn new<E: fmt::Display>(error: E) -> Self {
        Self {
            rendered: format_error(&error),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

impl std::error::Error for TransportError {}

/// Blocking transport: one call occupies the current thread.
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    fn send(&self, config: &RequestConfig) -> Result<Reply, TransportError>;
}

/// Cooperative transport: one call suspends at the network I/O.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AsyncTransport: Send + Sync {
    async fn send(&self, config: &RequestConfig) -> Result<Reply, TransportError>;
}
