use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use scrapekit::config::RequestFile;
use scrapekit::http::{
    AsyncClient, BlockingClient, Method, RequestConfig, RequestRetrier, RetryLogger,
};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

/// scrapekit - HTTP fetches with scraping-friendly retries
///
/// Retries 420, 429 and 5xx responses after a pause, retries connection
/// failures immediately, and gives up on any other status.
///
/// Examples:
///   scrapekit get https://example.com
///   scrapekit --max-attempts 3 post https://example.com/api -d 'q=rust'
#[derive(Parser, Debug)]
#[command(author, version = env!("SCRAPEKIT_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON request file; command-line options override its fields, and the
    /// subcommand always overrides its method
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Extra header, repeatable. Any header replaces the default User-Agent
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE", value_parser = parse_header, global = true)]
    headers: Vec<(String, String)>,

    /// Proxy URL used for both http and https
    #[arg(long, env = "SCRAPEKIT_PROXY", value_name = "URL", global = true)]
    proxy: Option<String>,

    /// Per-attempt timeout in seconds [default: 45]
    #[arg(long, value_name = "SECS", global = true)]
    timeout: Option<u64>,

    /// Pause after a throttled or 5xx response, in seconds [default: 5]
    #[arg(long = "retry-sleep", value_name = "SECS", global = true)]
    retry_sleep: Option<u64>,

    /// Network attempts before giving up [default: 5]
    #[arg(long = "max-attempts", value_name = "N", global = true)]
    max_attempts: Option<usize>,

    /// Exit quietly with no output instead of failing
    #[arg(long, global = true)]
    silence: bool,

    /// Use the async client instead of the blocking one
    #[arg(long = "async", global = true)]
    use_async: bool,

    /// Keep cookies between redirects and attempts
    #[arg(long, global = true)]
    session: bool,

    /// Report failed attempts at debug level instead of warn
    #[arg(long = "debug-log", global = true)]
    debug_log: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Send a GET request and print the body
    Get(GetArgs),

    /// Send a POST request and print the body
    Post(PostArgs),
}

#[derive(clap::Args, Debug)]
struct GetArgs {
    /// Target URL (may come from --config instead)
    #[arg(value_name = "URL")]
    url: Option<String>,
}

#[derive(clap::Args, Debug)]
struct PostArgs {
    /// Target URL (may come from --config instead)
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Raw request body
    #[arg(short = 'd', long = "data", value_name = "PAYLOAD")]
    data: Option<String>,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected NAME: VALUE, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing header name in '{}'", raw));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

impl Cli {
    fn overrides(&self) -> RequestFile {
        let (method, url, payload) = match &self.command {
            Commands::Get(args) => (Method::Get, args.url.clone(), None),
            Commands::Post(args) => (Method::Post, args.url.clone(), args.data.clone()),
        };
        RequestFile {
            url,
            method: Some(method),
            headers: self.headers.iter().cloned().collect::<BTreeMap<_, _>>(),
            payload,
            proxy: self.proxy.clone(),
            timeout_seconds: self.timeout,
            retry_sleep_seconds: self.retry_sleep,
            max_attempts: self.max_attempts,
            silence_exceptions: self.silence.then_some(true),
        }
    }

    fn request_config(&self) -> Result<RequestConfig> {
        let base = match &self.config {
            Some(path) => RequestFile::load(path)?,
            None => RequestFile::default(),
        };
        base.merge(self.overrides()).into_config()
    }
}

async fn fetch_async(
    config: RequestConfig,
    logger: RetryLogger,
    session: bool,
) -> Result<Option<String>> {
    let client = if session {
        AsyncClient::with_session()?
    } else {
        AsyncClient::new()?
    };
    let retrier = RequestRetrier::new(client).with_logger(logger);
    Ok(retrier.execute_async(&config).await?)
}

async fn fetch_blocking(
    config: RequestConfig,
    logger: RetryLogger,
    session: bool,
) -> Result<Option<String>> {
    tokio::task::spawn_blocking(move || -> Result<Option<String>> {
        let client = if session {
            BlockingClient::with_session()?
        } else {
            BlockingClient::new()?
        };
        let retrier = RequestRetrier::new(client).with_logger(logger);
        Ok(retrier.execute(&config)?)
    })
    .await
    .context("Request worker stopped unexpectedly")?
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let config = cli.request_config()?;
    let url = config.url().to_string();
    let logger = RetryLogger::default().debug_level(cli.debug_log);

    let body = if cli.use_async {
        fetch_async(config, logger, cli.session).await?
    } else {
        fetch_blocking(config, logger, cli.session).await?
    };

    match body {
        Some(body) => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(body.as_bytes())
                .context("Failed to write response body")?;
            stdout.flush()?;
        }
        None => warn!("No data returned for {}", url),
    }
    Ok(())
}
