//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests to fetch and parse page content
//! - A randomized politeness delay after every attempt
//! - Bounded retry on 429 responses, honoring Retry-After
//! - Degrading every failure to an absent document plus a status

use crate::config::{PolitenessConfig, UserAgentConfig};
use crate::crawler::parser::parse_document;
use rand::Rng;
use reqwest::{header::RETRY_AFTER, redirect::Policy, Client, StatusCode};
use scraper::Html;
use std::time::Duration;

/// Status reported when no HTTP response was received at all
pub const NO_RESPONSE: u16 = 0;

/// Outcome of fetching one address
#[derive(Debug)]
pub struct FetchedPage {
    /// The address that was fetched
    pub address: String,

    /// Parsed document, present only for successful responses
    pub document: Option<Html>,

    /// Final HTTP status code, or [`NO_RESPONSE`]
    pub status: u16,
}

impl FetchedPage {
    /// A page whose content could not be obtained
    pub fn absent(address: &str, status: u16) -> Self {
        Self {
            address: address.to_string(),
            document: None,
            status,
        }
    }
}

/// Source of page content for the crawl engine
///
/// Implementations own the network call, the politeness delay and any retry
/// on rate limiting. They never fail: HTTP error statuses and transport
/// errors come back as a [`FetchedPage`] with no document.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn fetch(&self, address: &str) -> FetchedPage;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `politeness` - Supplies the request timeout
///
/// # Example
///
/// ```no_run
/// use tiercrawl::config::{PolitenessConfig, UserAgentConfig};
/// use tiercrawl::crawler::build_http_client;
///
/// let user_agent = UserAgentConfig {
///     crawler_name: "Tiercrawl".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&user_agent, &PolitenessConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    politeness: &PolitenessConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(user_agent))
        .timeout(Duration::from_secs(politeness.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Formats the user agent: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Result of a single HTTP attempt
enum Attempt {
    Page { status: u16, body: String },
    Status { status: u16, retry_after: Option<String> },
    Transport { status: u16, error: String },
}

/// Fetches pages over HTTP with politeness delays and 429 retries
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx | Parse body → document |
/// | HTTP 429 | Wait Retry-After, retry up to `max-retries` times |
/// | HTTP 429, retries exhausted | Absent document, status 429 |
/// | Other HTTP status | Absent document, that status |
/// | Timeout, connection refused | Absent document, status 0 |
pub struct HttpFetcher {
    client: Client,
    politeness: PolitenessConfig,
}

impl HttpFetcher {
    /// Creates a fetcher with a freshly built client
    pub fn new(
        user_agent: &UserAgentConfig,
        politeness: PolitenessConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, &politeness)?;
        Ok(Self::with_client(client, politeness))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, politeness: PolitenessConfig) -> Self {
        Self { client, politeness }
    }

    async fn attempt(&self, address: &str) -> Attempt {
        let response = match self.client.get(address).send().await {
            Ok(response) => response,
            Err(e) => {
                let error = if e.is_timeout() {
                    "Request timeout".to_string()
                } else if e.is_connect() {
                    "Connection refused".to_string()
                } else {
                    e.to_string()
                };
                return Attempt::Transport {
                    status: NO_RESPONSE,
                    error,
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            return Attempt::Status {
                status: status.as_u16(),
                retry_after,
            };
        }

        match response.text().await {
            Ok(body) => Attempt::Page {
                status: status.as_u16(),
                body,
            },
            Err(e) => Attempt::Transport {
                status: status.as_u16(),
                error: e.to_string(),
            },
        }
    }

    /// Sleeps a uniformly random time within the configured delay bounds
    async fn politeness_delay(&self) {
        let delay = self.politeness_delay_duration();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    fn politeness_delay_duration(&self) -> Duration {
        let (min, max) = (self.politeness.min_delay_ms, self.politeness.max_delay_ms);
        let millis = if min >= max {
            min
        } else {
            rand::thread_rng().gen_range(min..=max)
        };
        Duration::from_millis(millis)
    }

    /// Computes the wait before retrying a rate-limited request
    ///
    /// Only the delay-seconds form of Retry-After is understood; anything
    /// else falls back to the configured default. The result is capped.
    fn retry_after_wait(&self, header: Option<&str>) -> Duration {
        let secs = header
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or(self.politeness.default_retry_after_secs);
        Duration::from_secs(secs.min(self.politeness.max_retry_after_secs))
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, address: &str) -> FetchedPage {
        let mut retries = 0;

        loop {
            let attempt = self.attempt(address).await;

            // Delay after each fetch, to avoid flooding the server
            self.politeness_delay().await;

            match attempt {
                Attempt::Page { status, body } => {
                    return FetchedPage {
                        address: address.to_string(),
                        document: Some(parse_document(&body)),
                        status,
                    };
                }
                Attempt::Status {
                    status,
                    retry_after,
                } if status == StatusCode::TOO_MANY_REQUESTS.as_u16()
                    && retries < self.politeness.max_retries =>
                {
                    retries += 1;
                    let wait = self.retry_after_wait(retry_after.as_deref());
                    tracing::warn!(
                        "Rate limited on {}, retry {}/{} in {:?}",
                        address,
                        retries,
                        self.politeness.max_retries,
                        wait
                    );
                    tokio::time::sleep(wait).await;
                }
                Attempt::Status { status, .. } => {
                    tracing::warn!("Got {} response for '{}'", status, address);
                    return FetchedPage::absent(address, status);
                }
                Attempt::Transport { status, error } => {
                    tracing::warn!("Failed to fetch '{}': {}", address, error);
                    return FetchedPage::absent(address, status);
                }
            }
        }
    }
}
