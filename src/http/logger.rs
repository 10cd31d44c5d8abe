use log::Level;
use std::fmt;

/// Log target used by [`RetryLogger::default`].
pub const DEFAULT_LOG_TARGET: &str = "scrapekit";

/// Explicit logger handle passed to the retrier.
///
/// Failed attempts are reported under `target` at warn level, or at debug
/// level when built with `debug_level(true)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryLogger {
    target: String,
    debug: bool,
}

impl RetryLogger {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            debug: false,
        }
    }

    pub fn debug_level(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn level(&self) -> Level {
        if self.debug { Level::Debug } else { Level::Warn }
    }

    pub fn record(&self, args: fmt::Arguments<'_>) {
        log::log!(target: self.target.as_str(), self.level(), "{}", args);
    }
}

impl Default for RetryLogger {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_TARGET)
    }
}
