//! JSON request files.
//!
//! ```json
//! {
//!   "url": "https://example.com/search",
//!   "method": "POST",
//!   "headers": { "Content-Type": "application/x-www-form-urlencoded" },
//!   "payload": "q=rust",
//!   "max_attempts": 3,
//!   "retry_sleep_seconds": 2
//! }
//! ```
//!
//! Every field is optional so a file can hold shared defaults while the URL
//! comes from the command line.
//!
//! The `scrapekit` subcommand always sets the method, so `method` in a file
//! only matters to library callers. Running a file that carries a `payload`
//! through `scrapekit get` is rejected as a payload without POST.

use anyhow::{Context, Result, anyhow};
use log::debug;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::http::{Method, RequestConfig};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestFile {
    pub url: Option<String>,
    pub method: Option<Method>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub payload: Option<String>,
    pub proxy: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub retry_sleep_seconds: Option<u64>,
    pub max_attempts: Option<usize>,
    pub silence_exceptions: Option<bool>,
}

impl RequestFile {
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading request file {}...", path.display());
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("Failed to parse request file {}", path.display()))
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Fields set in `overrides` win; headers are merged key by key.
    pub fn merge(mut self, overrides: RequestFile) -> Self {
        self.url = overrides.url.or(self.url);
        self.method = overrides.method.or(self.method);
        self.headers.extend(overrides.headers);
        self.payload = overrides.payload.or(self.payload);
        self.proxy = overrides.proxy.or(self.proxy);
        self.timeout_seconds = overrides.timeout_seconds.or(self.timeout_seconds);
        self.retry_sleep_seconds = overrides.retry_sleep_seconds.or(self.retry_sleep_seconds);
        self.max_attempts = overrides.max_attempts.or(self.max_attempts);
        self.silence_exceptions = overrides.silence_exceptions.or(self.silence_exceptions);
        self
    }

    pub fn into_config(self) -> Result<RequestConfig> {
        let url = self.url.ok_or_else(|| anyhow!("No URL given"))?;
        let mut builder =
            RequestConfig::builder(self.method.unwrap_or_default(), url).headers(self.headers);

        if let Some(payload) = self.payload {
            builder = builder.payload(payload);
        }
        if let Some(proxy) = self.proxy {
            builder = builder.proxy(proxy);
        }
        if let Some(secs) = self.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.retry_sleep_seconds {
            builder = builder.retry_sleep(Duration::from_secs(secs));
        }
        if let Some(max_attempts) = self.max_attempts {
            builder = builder.max_attempts(max_attempts);
        }
        if let Some(silence) = self.silence_exceptions {
            builder = builder.silence_exceptions(silence);
        }

        Ok(builder.build()?)
    }
}
