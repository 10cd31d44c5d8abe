//! The retry state machine shared by the blocking and async drivers.
//!
//! `RetryState::record` holds every branch of the policy. The drivers only
//! decide how an attempt is performed and how a pause is taken, so the same
//! policy runs on a plain thread or inside a tokio task.

use std::future::Future;
use std::time::Duration;

use super::error::{RequestError, format_error};
use super::logger::RetryLogger;
use super::outcome::{Cause, RequestOutcome};
use super::request::RequestConfig;
use super::transport::{Reply, TransportError};

/// What the driver does after an attempt has been recorded.
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    /// Attempt again, after `pause` if one is given.
    Retry { pause: Option<Duration> },
    /// The call is over.
    Finish(Result<Option<String>, RequestError>),
}

/// Bookkeeping for one in-flight call. Never shared between calls.
#[derive(Debug)]
pub struct RetryState<'a> {
    config: &'a RequestConfig,
    logger: Option<&'a RetryLogger>,
    attempts_made: usize,
    last_status: Option<u16>,
    last_body_snippet: Option<String>,
    /// Set by a transport error, cleared by the next reply.
    last_transport_error: Option<String>,
}

impl<'a> RetryState<'a> {
    pub fn new(config: &'a RequestConfig, logger: Option<&'a RetryLogger>) -> Self {
        Self {
            config,
            logger,
            attempts_made: 0,
            last_status: None,
            last_body_snippet: None,
            last_transport_error: None,
        }
    }

    pub fn attempts_made(&self) -> usize {
        self.attempts_made
    }

    pub fn last_status(&self) -> Option<u16> {
        self.last_status
    }

    pub fn last_body_snippet(&self) -> Option<&str> {
        self.last_body_snippet.as_deref()
    }

    pub fn last_transport_error(&self) -> Option<&str> {
        self.last_transport_error.as_deref()
    }

    pub fn has_budget(&self) -> bool {
        self.attempts_made < self.config.max_attempts()
    }

    pub fn record(&mut self, outcome: RequestOutcome) -> Step {
        match outcome {
            RequestOutcome::Success { body } => Step::Finish(Ok(Some(body))),

            RequestOutcome::RetryableFailure(Cause::Transport(error)) => {
                self.report_transport(&error);
                self.attempts_made += 1;
                self.last_transport_error = Some(error.to_string());
                Step::Retry { pause: None }
            }

            RequestOutcome::RetryableFailure(Cause::Status { status, body }) => {
                let snippet = format_error(&body);
                self.report_status(status, &snippet);
                self.attempts_made += 1;
                self.last_status = Some(status);
                self.last_body_snippet = Some(snippet);
                self.last_transport_error = None;
                // No pause once the budget is spent.
                let pause = self.has_budget().then(|| self.config.retry_sleep());
                Step::Retry { pause }
            }

            RequestOutcome::FatalFailure { status, body } => {
                let snippet = format_error(&body);
                self.report_status(status, &snippet);
                self.attempts_made += 1;
                self.last_status = Some(status);
                if self.config.silence_exceptions() {
                    return Step::Finish(Ok(None));
                }
                Step::Finish(Err(RequestError::UnexpectedStatus {
                    status,
                    body: snippet,
                }))
            }
        }
    }

    /// Result once the loop ran out of attempts.
    pub fn exhausted(self) -> Result<Option<String>, RequestError> {
        if self.config.silence_exceptions() {
            return Ok(None);
        }
        let detail = match (self.last_body_snippet, self.last_transport_error) {
            (Some(snippet), Some(error)) => format!("{}. Last error: {}", snippet, error),
            (Some(snippet), None) => snippet,
            (None, error) => error.unwrap_or_default(),
        };
        Err(RequestError::RetryExhausted {
            attempts: self.attempts_made,
            status: self.last_status,
            detail,
        })
    }

    fn report_transport(&self, error: &TransportError) {
        let method = self.config.method();
        match self.logger {
            Some(logger) => logger.record(format_args!("Failed to {} request. {}", method, error)),
            None => eprintln!("Failed to {} request. {}", method, error),
        }
    }

    fn report_status(&self, status: u16, snippet: &str) {
        if let Some(logger) = self.logger {
            logger.record(format_args!(
                "Failed to {} request. Status code {}, URL: {}, Response text: {}",
                self.config.method(),
                status,
                self.config.url(),
                snippet
            ));
        }
    }
}

/// Runs the policy on the current thread.
pub fn run_blocking<A, P>(
    config: &RequestConfig,
    logger: Option<&RetryLogger>,
    mut attempt: A,
    mut pause: P,
) -> Result<Option<String>, RequestError>
where
    A: FnMut(&RequestConfig) -> Result<Reply, TransportError>,
    P: FnMut(Duration),
{
    let mut state = RetryState::new(config, logger);
    while state.has_budget() {
        match state.record(RequestOutcome::classify(attempt(config))) {
            Step::Retry { pause: Some(delay) } => pause(delay),
            Step::Retry { pause: None } => {}
            Step::Finish(result) => return result,
        }
    }
    state.exhausted()
}

/// Runs the policy as a future, suspending at every attempt and pause.
pub async fn run_async<'c, A, AF, P, PF>(
    config: &'c RequestConfig,
    logger: Option<&'c RetryLogger>,
    mut attempt: A,
    mut pause: P,
) -> Result<Option<String>, RequestError>
where
    A: FnMut(&'c RequestConfig) -> AF,
    AF: Future<Output = Result<Reply, TransportError>>,
    P: FnMut(Duration) -> PF,
    PF: Future<Output = ()>,
{
    let mut state = RetryState::new(config, logger);
    while state.has_budget() {
        match state.record(RequestOutcome::classify(attempt(config).await)) {
            Step::Retry { pause: Some(delay) } => pause(delay).await,
            Step::Retry { pause: None } => {}
            Step::Finish(result) => return result,
        }
    }
    state.exhausted()
}
