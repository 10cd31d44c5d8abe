//! Request description handed to the retrier and its transports.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use super::error::ConfigError;

/// User-Agent sent when the caller supplies no headers.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/119.0";

/// Per-attempt timeout unless overridden.
pub const DEFAULT_TIMEOUT_SECS: u64 = 45;

/// Pause after a throttled or server-error response unless overridden.
pub const DEFAULT_RETRY_SLEEP_SECS: u64 = 5;

/// Network attempts per call unless overridden.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// A validated, immutable request description.
///
/// Construct one with [`RequestConfig::get`], [`RequestConfig::post`] or
/// [`RequestConfig::builder`]; every constructor goes through
/// [`RequestConfigBuilder::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    url: String,
    method: Method,
    headers: BTreeMap<String, String>,
    payload: Option<String>,
    proxy: Option<String>,
    timeout: Duration,
    retry_sleep: Duration,
    max_attempts: usize,
    silence_exceptions: bool,
}

impl RequestConfig {
    pub fn builder(method: Method, url: impl Into<String>) -> RequestConfigBuilder {
        RequestConfigBuilder::new(method, url)
    }

    /// GET with every default.
    pub fn get(url: impl Into<String>) -> Result<Self, ConfigError> {
        Self::builder(Method::Get, url).build()
    }

    /// POST with every default and an optional raw body.
    pub fn post(url: impl Into<String>, payload: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = Self::builder(Method::Post, url);
        if let Some(payload) = payload {
            builder = builder.payload(payload);
        }
        builder.build()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Headers to put on the wire: the caller's, or the default User-Agent
    /// when the caller gave none.
    pub fn headers(&self) -> Vec<(&str, &str)> {
        if self.headers.is_empty() {
            return vec![("User-Agent", DEFAULT_USER_AGENT)];
        }
        self.headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect()
    }

    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retry_sleep(&self) -> Duration {
        self.retry_sleep
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn silence_exceptions(&self) -> bool {
        self.silence_exceptions
    }
}

#[derive(Debug, Clone)]
pub struct RequestConfigBuilder {
    url: String,
    method: Method,
    headers: BTreeMap<String, String>,
    payload: Option<String>,
    proxy: Option<String>,
    timeout: Duration,
    retry_sleep: Duration,
    max_attempts: usize,
    silence_exceptions: bool,
}

impl RequestConfigBuilder {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: BTreeMap::new(),
            payload: None,
            proxy: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry_sleep: Duration::from_secs(DEFAULT_RETRY_SLEEP_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            silence_exceptions: false,
        }
    }

    /// Adds a header. Supplying any header replaces the default User-Agent.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Single proxy URL used for both http and https targets.
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retry_sleep(mut self, retry_sleep: Duration) -> Self {
        self.retry_sleep = retry_sleep;
        self
    }

    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Return `None` instead of an error when the call cannot succeed.
    pub fn silence_exceptions(mut self, silence: bool) -> Self {
        self.silence_exceptions = silence;
        self
    }

    pub fn build(self) -> Result<RequestConfig, ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::EmptyUrl);
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::NoAttempts);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.payload.is_some() && self.method != Method::Post {
            return Err(ConfigError::PayloadWithoutPost(self.method));
        }

        Ok(RequestConfig {
            url: self.url,
            method: self.method,
            headers: self.headers,
            payload: self.payload,
            proxy: self.proxy,
            timeout: self.timeout,
            retry_sleep: self.retry_sleep,
            max_attempts: self.max_attempts,
            silence_exceptions: self.silence_exceptions,
        })
    }
}
