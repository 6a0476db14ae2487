//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building the HTTP client with a proper user agent string
//! - The `Transport` seam: one GET split into a header phase and a body read
//! - Per-attempt timeouts on the header phase and capped retries with exponential backoff
//! - Error classification (timeout vs. hard failure vs. bad status)

use crate::config::{FetcherConfig, UserAgentConfig};
use crate::{HarvestError, LastStatus};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;

/// A successful HTTP response with its body fully read
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    body: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn text(&self) -> &str {
        &self.body
    }
}

/// Status line and headers have arrived; the body is still unread
#[derive(Debug)]
pub struct ResponseHead<B> {
    pub status: u16,
    pub body: B,
}

impl<B> ResponseHead<B> {
    pub fn new(status: u16, body: B) -> Self {
        Self { status, body }
    }

    /// True for any 2xx status
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Why a single GET did not produce a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request did not complete in time; worth retrying
    TimedOut,

    /// DNS failure, refused or reset connection, TLS error, unreadable body
    Request { message: String },
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::TimedOut => f.write_str("request timed out"),
            TransportError::Request { message } => f.write_str(message),
        }
    }
}

/// The unread body of a response
pub trait ResponseBody {
    fn read(self) -> impl Future<Output = Result<String, TransportError>> + Send;
}

/// An already buffered body
impl ResponseBody for String {
    async fn read(self) -> Result<String, TransportError> {
        Ok(self)
    }
}

impl ResponseBody for reqwest::Response {
    async fn read(self) -> Result<String, TransportError> {
        reqwest::Response::text(self)
            .await
            .map_err(|e| TransportError::Request {
                message: e.to_string(),
            })
    }
}

/// Performs exactly one HTTP GET, with no retry and no timeout of its own
///
/// `get` resolves once the status and headers are in; the body is read
/// separately through [`ResponseBody::read`].
pub trait Transport {
    type Body: ResponseBody + Send;

    fn get(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<ResponseHead<Self::Body>, TransportError>> + Send;
}

/// Builds an HTTP client with proper configuration
///
/// No overall request timeout is set here: the fetcher applies its own
/// per-attempt timeout around the header phase of each call.
///
/// # Example
///
/// ```no_run
/// use restaurant_harvester::config::UserAgentConfig;
/// use restaurant_harvester::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version
    let user_agent = format!("{}/{}", config.crawler_name, config.crawler_version);

    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// `Transport` backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::from_client(build_http_client(config)?))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    type Body = reqwest::Response;

    async fn get(&self, url: &str) -> Result<ResponseHead<reqwest::Response>, TransportError> {
        let response = self.client.get(url).send().await.map_err(classify_error)?;
        Ok(ResponseHead::new(response.status().as_u16(), response))
    }
}

fn classify_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::TimedOut
    } else {
        TransportError::Request {
            message: error.to_string(),
        }
    }
}

/// Attempt count, per-attempt timeout and backoff for one logical fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&FetcherConfig::default())
    }
}

impl From<&FetcherConfig> for RetryPolicy {
    fn from(config: &FetcherConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            attempt_timeout: Duration::from_millis(config.timeout_ms),
            base_delay: Duration::from_millis(config.backoff_base_ms),
        }
    }
}

impl RetryPolicy {
    /// Delay after a timed-out attempt `attempt` (0-based): `base * 2^attempt`
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// What the header phase of a single attempt ended with
enum Attempt<B> {
    Received(ResponseHead<B>),
    TimedOut,
}

impl<B> Attempt<B> {
    fn last_status(&self) -> LastStatus {
        match self {
            Attempt::Received(head) => LastStatus(Some(head.status)),
            Attempt::TimedOut => LastStatus(None),
        }
    }
}

/// Resilient fetcher: one logical GET with timeouts and backoff
///
/// Only the wait for the status line and headers is timed. Once a 2xx head
/// has arrived the body is read to the end without a deadline.
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | 2xx | Read the body and return the response |
/// | Any other status | Fail immediately |
/// | No headers within the timeout | Back off `base * 2^attempt`, retry up to `max_attempts` |
/// | Connection/DNS/TLS error | Fail immediately |
/// | Body read error | Fail immediately |
#[derive(Debug, Clone)]
pub struct Fetcher<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetches `url`, returning only a successful (2xx) response
    ///
    /// # Returns
    ///
    /// * `Ok(Response)` - A 2xx response with its body
    /// * `Err(HarvestError::Status)` - The server answered with a non-2xx status
    /// * `Err(HarvestError::Transport)` - A non-timeout request failure or an unreadable body
    /// * `Err(HarvestError::RetriesExhausted)` - Every attempt timed out
    pub async fn fetch(&self, url: &str) -> Result<Response, HarvestError> {
        let max_attempts = self.policy.max_attempts;
        let mut last_status = LastStatus::default();

        for attempt in 0..max_attempts {
            tracing::debug!("GET {} (attempt {}/{})", url, attempt + 1, max_attempts);

            let outcome = self.attempt(url).await?;
            last_status = outcome.last_status();

            match outcome {
                Attempt::Received(head) => return self.read_body(url, head).await,
                Attempt::TimedOut if attempt + 1 < max_attempts => {
                    tracing::warn!(
                        "Request to {} timed out, retrying... (attempt {}/{})",
                        url,
                        attempt + 1,
                        max_attempts
                    );
                    tokio::time::sleep(self.policy.backoff(attempt)).await;
                }
                // The final attempt is not followed by a backoff
                Attempt::TimedOut => {
                    tracing::warn!(
                        "Request to {} timed out, giving up (attempt {}/{})",
                        url,
                        attempt + 1,
                        max_attempts
                    );
                }
            }
        }

        Err(HarvestError::RetriesExhausted {
            url: url.to_string(),
            attempts: max_attempts,
            last_status,
        })
    }

    /// Waits for the status line and headers, bounded by the attempt timeout
    async fn attempt(&self, url: &str) -> Result<Attempt<T::Body>, HarvestError> {
        let head =
            match tokio::time::timeout(self.policy.attempt_timeout, self.transport.get(url)).await {
                Err(_) | Ok(Err(TransportError::TimedOut)) => return Ok(Attempt::TimedOut),
                Ok(Err(TransportError::Request { message })) => {
                    return Err(HarvestError::Transport {
                        url: url.to_string(),
                        message,
                    })
                }
                Ok(Ok(head)) => head,
            };

        if !head.is_ok() {
            return Err(HarvestError::Status {
                url: url.to_string(),
                status: head.status,
            });
        }

        Ok(Attempt::Received(head))
    }

    async fn read_body(
        &self,
        url: &str,
        head: ResponseHead<T::Body>,
    ) -> Result<Response, HarvestError> {
        let body = head
            .body
            .read()
            .await
            .map_err(|e| HarvestError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let response = Response::new(head.status, body);
        tracing::debug!(
            "{} answered {} ({} bytes)",
            url,
            response.status(),
            response.text().len()
        );
        Ok(response)
    }
}
