//! `reqwest`-backed transports.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;

use super::request::{Method, RequestConfig};
use super::transport::{AsyncTransport, Reply, Transport, TransportError};

/// Blocking transport backed by `reqwest::blocking`.
///
/// Must not be called from inside a tokio runtime; wrap calls in
/// `tokio::task::spawn_blocking` there.
#[derive(Clone)]
pub struct BlockingClient {
    client: reqwest::blocking::Client,
}

impl BlockingClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .context("Failed to build blocking HTTP client")?;
        Ok(Self { client })
    }

    /// A client whose cookie jar persists across calls.
    pub fn with_session() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .build()
            .context("Failed to build blocking HTTP session")?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl Transport for BlockingClient {
    #[tracing::instrument(skip(self, config), fields(method = %config.method(), url = config.url()))]
    fn send(&self, config: &RequestConfig) -> Result<Reply, TransportError> {
        let proxied;
        let client = match config.proxy() {
            Some(proxy) => {
                debug!("{} {} via proxy {}", config.method(), config.url(), proxy);
                let proxy = reqwest::Proxy::all(proxy).map_err(TransportError::new)?;
                proxied = reqwest::blocking::Client::builder()
                    .proxy(proxy)
                    .build()
                    .map_err(TransportError::new)?;
                &proxied
            }
            None => &self.client,
        };

        let mut request = match config.method() {
            Method::Get => client.get(config.url()),
            Method::Post => client.post(config.url()),
        };
        for (name, value) in config.headers() {
            request = request.header(name, value);
        }
        if let Some(payload) = config.payload() {
            request = request.body(payload.to_string());
        }

        let response = request
            .timeout(config.timeout())
            .send()
            .map_err(TransportError::new)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(TransportError::new)?;
        Ok(Reply { status, body })
    }
}

/// Async transport backed by `reqwest::Client`.
#[derive(Clone)]
pub struct AsyncClient {
    client: reqwest::Client,
}

impl AsyncClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    /// A client whose cookie jar persists across calls.
    pub fn with_session() -> Result<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP session")?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AsyncTransport for AsyncClient {
    #[tracing::instrument(skip(self, config), fields(method = %config.method(), url = config.url()))]
    async fn send(&self, config: &RequestConfig) -> Result<Reply, TransportError> {
        let proxied;
        let client = match config.proxy() {
            Some(proxy) => {
                debug!("{} {} via proxy {}", config.method(), config.url(), proxy);
                let proxy = reqwest::Proxy::all(proxy).map_err(TransportError::new)?;
                proxied = reqwest::Client::builder()
                    .proxy(proxy)
                    .build()
                    .map_err(TransportError::new)?;
                &proxied
            }
            None => &self.client,
        };

        let mut request = match config.method() {
            Method::Get => client.get(config.url()),
            Method::Post => client.post(config.url()),
        };
        for (name, value) in config.headers() {
            request = request.header(name, value);
        }
        if let Some(payload) = config.payload() {
            request = request.body(payload.to_string());
        }

        let response = request
            .timeout(config.timeout())
            .send()
            .await
            .map_err(TransportError::new)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(TransportError::new)?;
        Ok(Reply { status, body })
    }
}
