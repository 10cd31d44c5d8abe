use super::error::{ConfigError, RequestError};
use super::logger::RetryLogger;
use super::request::RequestConfig;
use super::retry::{run_async, run_blocking};
use super::transport::{AsyncTransport, Transport};

/// Errors from the URL shortcuts, which validate a default config first.
#[derive(Debug, PartialEq, Eq)]
pub enum ShortcutError {
    Config(ConfigError),
    Request(RequestError),
}

impl std::fmt::Display for ShortcutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShortcutError::Config(e) => write!(f, "Invalid request: {}", e),
            ShortcutError::Request(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ShortcutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShortcutError::Config(e) => Some(e),
            ShortcutError::Request(e) => Some(e),
        }
    }
}

impl From<ConfigError> for ShortcutError {
    fn from(e: ConfigError) -> Self {
        ShortcutError::Config(e)
    }
}

impl From<RequestError> for ShortcutError {
    fn from(e: RequestError) -> Self {
        ShortcutError::Request(e)
    }
}

/// Issues requests through `T` and retries them per [`RequestConfig`].
///
/// The blocking methods need `T: Transport`, the `_async` ones need
/// `T: AsyncTransport`. Every call owns its own retry state, so one retrier
/// can serve any number of concurrent calls.
///
/// `Ok(None)` means the call failed with `silence_exceptions` set. Treat it
/// as "no data".
pub struct RequestRetrier<T> {
    transport: T,
    logger: Option<RetryLogger>,
}

impl<T> RequestRetrier<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: RetryLogger) -> Self {
        self.logger = Some(logger);
        self
    }
}

impl<T: Transport> RequestRetrier<T> {
    /// Runs `config` on the current thread, sleeping it between retries.
    pub fn execute(&self, config: &RequestConfig) -> Result<Option<String>, RequestError> {
        run_blocking(
            config,
            self.logger.as_ref(),
            |config| self.transport.send(config),
            std::thread::sleep,
        )
    }

    pub fn get(&self, url: &str) -> Result<Option<String>, ShortcutError> {
        Ok(self.execute(&RequestConfig::get(url)?)?)
    }

    pub fn post(&self, url: &str, payload: Option<String>) -> Result<Option<String>, ShortcutError> {
        Ok(self.execute(&RequestConfig::post(url, payload)?)?)
    }
}

impl<T: AsyncTransport> RequestRetrier<T> {
    /// Runs `config` as a future; both the request and the retry pause yield
    /// to the runtime.
    pub async fn execute_async(
        &self,
        config: &RequestConfig,
    ) -> Result<Option<String>, RequestError> {
        run_async(
            config,
            self.logger.as_ref(),
            |config| self.transport.send(config),
            tokio::time::sleep,
        )
        .await
    }

    pub async fn get_async(&self, url: &str) -> Result<Option<String>, ShortcutError> {
        Ok(self.execute_async(&RequestConfig::get(url)?).await?)
    }

    pub async fn post_async(
        &self,
        url: &str,
        payload: Option<String>,
    ) -> Result<Option<String>, ShortcutError> {
        Ok(self
            .execute_async(&RequestConfig::post(url, payload)?)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::Method;
    use crate::http::transport::{MockAsyncTransport, MockTransport, Reply, TransportError};
    use mockall::Sequence;
    use std::time::Duration;

    fn fast(method: Method, max_attempts: usize) -> RequestConfig {
        RequestConfig::builder(method, "https://x.test")
            .max_attempts(max_attempts)
            .retry_sleep(Duration::ZERO)
            .build()
            .unwrap()
    }

    #[test]
    fn test_execute_returns_body_on_200() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Ok(Reply::new(200, "body")));

        let retrier = RequestRetrier::new(transport);
        let result = retrier.execute(&fast(Method::Get, 5));
        assert_eq!(result, Ok(Some("body".to_string())));
    }

    #[test]
    fn test_execute_retries_server_errors_until_exhausted() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(3)
            .returning(|_| Ok(Reply::new(500, "oops")));

        let retrier = RequestRetrier::new(transport).with_logger(RetryLogger::default());
        let result = retrier.execute(&fast(Method::Get, 3));
        assert!(matches!(
            result,
            Err(RequestError::RetryExhausted {
                attempts: 3,
                status: Some(500),
                ..
            })
        ));
    }

    #[test]
    fn test_execute_throttled_then_ok() {
        let mut seq = Sequence::new();
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Reply::new(429, "")));
        transport
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Reply::new(200, "OK")));

        let retrier = RequestRetrier::new(transport);
        assert_eq!(
            retrier.execute(&fast(Method::Get, 3)),
            Ok(Some("OK".to_string()))
        );
    }

    #[test]
    fn test_execute_passes_config_to_transport() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|config| config.method() == Method::Post && config.payload() == Some("x=1"))
            .times(1)
            .returning(|_| Ok(Reply::new(200, "")));

        let retrier = RequestRetrier::new(transport);
        let result = retrier.post("https://x.test", Some("x=1".to_string()));
        assert_eq!(result, Ok(Some(String::new())));
    }

    #[test]
    fn test_get_shortcut_rejects_empty_url() {
        let transport = MockTransport::new();
        let retrier = RequestRetrier::new(transport);
        assert_eq!(
            retrier.get(""),
            Err(ShortcutError::Config(ConfigError::EmptyUrl))
        );
    }

    #[test]
    fn test_not_found_is_not_retried() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Ok(Reply::new(404, "missing")));

        let retrier = RequestRetrier::new(transport);
        let err = retrier.execute(&fast(Method::Get, 5)).unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_execute_async_recovers_from_transport_errors() {
        let mut seq = Sequence::new();
        let mut transport = MockAsyncTransport::new();
        transport
            .expect_send()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Err(TransportError::new("connection reset")));
        transport
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Reply::new(200, "third")));

        let retrier = RequestRetrier::new(transport);
        let result = retrier.execute_async(&fast(Method::Get, 5)).await;
        assert_eq!(result, Ok(Some("third".to_string())));
    }

    #[tokio::test]
    async fn test_execute_async_silenced_fatal() {
        let mut transport = MockAsyncTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Ok(Reply::new(403, "denied")));

        let config = RequestConfig::builder(Method::Get, "https://x.test")
            .silence_exceptions(true)
            .build()
            .unwrap();
        let retrier = RequestRetrier::new(transport);
        assert_eq!(retrier.execute_async(&config).await, Ok(None));
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_async_sleeps_between_throttled_attempts() {
        let mut transport = MockAsyncTransport::new();
        transport
            .expect_send()
            .times(3)
            .returning(|_| Ok(Reply::new(420, "")));

        let config = RequestConfig::builder(Method::Get, "https://x.test")
            .max_attempts(3)
            .retry_sleep(Duration::from_secs(5))
            .build()
            .unwrap();
        let retrier = RequestRetrier::new(transport);

        let start = tokio::time::Instant::now();
        let result = retrier.execute_async(&config).await;

        assert!(result.is_err());
        // Two pauses: none after the final attempt.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(10), "slept {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(15), "slept {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_get_async_shortcut() {
        let mut transport = MockAsyncTransport::new();
        transport
            .expect_send()
            .withf(|config| config.url() == "https://x.test/a" && config.method() == Method::Get)
            .times(1)
            .returning(|_| Ok(Reply::new(200, "a")));

        let retrier = RequestRetrier::new(transport);
        assert_eq!(
            retrier.get_async("https://x.test/a").await,
            Ok(Some("a".to_string()))
        );
    }

    #[tokio::test]
    async fn test_post_async_against_real_client() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("POST", "/api")
            .match_body("q=1")
            .with_status(200)
            .with_body("result")
            .create_async()
            .await;

        let retrier = RequestRetrier::new(crate::http::AsyncClient::new().unwrap());
        let body = retrier
            .post_async(&format!("{}/api", url), Some("q=1".to_string()))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(body.as_deref(), Some("result"));
    }
}
