//! Tiercrawl: a polite, priority-aware web crawler
//!
//! This crate walks a site from a single seed address, keeping a two-tier
//! frontier so that "detail" pages are visited before further "listing"
//! pages, and collects structured records from the pages a policy selects.
//! Every fetch is followed by a randomized politeness delay, and rate-limited
//! responses are retried a bounded number of times.

pub mod config;
pub mod crawler;
pub mod output;
pub mod site;
pub mod url;

use thiserror::Error;

/// Main error type for Tiercrawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Popped from a frontier with both tiers empty. The crawl loop guards
    /// against this, so seeing it means an engine invariant is broken.
    #[error("Frontier is empty")]
    EmptyFrontier,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Tiercrawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlPolicy, Crawler, FetchedPage, Fetcher, Frontier, HttpFetcher};
pub use output::{CrawlSnapshot, CrawlStats};
pub use site::{Product, ProductPolicy};
pub use url::{base_url, to_absolute_url};
