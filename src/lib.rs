//! Helpers for scraping projects: HTTP GET/POST with status-aware retries,
//! blocking or async, plus JSON request files for the `scrapekit` binary.
//!
//! ```no_run
//! use scrapekit::http::{BlockingClient, RequestRetrier, RetryLogger};
//!
//! # fn main() -> anyhow::Result<()> {
//! let retrier = RequestRetrier::new(BlockingClient::new()?).with_logger(RetryLogger::default());
//! if let Some(body) = retrier.get("https://example.com")? {
//!     println!("{}", body.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod http;
