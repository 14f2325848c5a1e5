//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The two-tier frontier of pending addresses
//! - The crawl engine and its visit loop
//! - HTTP fetching with politeness delays and 429 retries
//! - HTML parsing and link extraction
//! - The policy trait that drives visiting and collection

mod engine;
mod fetcher;
mod frontier;
mod parser;
mod policy;

pub use engine::Crawler;
pub use fetcher::{
    build_http_client, user_agent_string, FetchedPage, Fetcher, HttpFetcher, NO_RESPONSE,
};
pub use frontier::Frontier;
pub use parser::{extract_links, parse_document};
pub use policy::CrawlPolicy;

use crate::config::Config;
use crate::site::{Product, ProductPolicy};
use crate::url::to_absolute_url;
use crate::CrawlError;

/// Builds an engine for the configured site over a real HTTP fetcher
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(Crawler)` - Engine seeded with the normalized start address
/// * `Err(CrawlError)` - The seed is not an absolute HTTP(S) URL, or the
///   HTTP client or the site policy could not be built
pub fn build_crawler(config: &Config) -> Result<Crawler<HttpFetcher, ProductPolicy>, CrawlError> {
    // Same form as discovered links, so a link back to the seed is a duplicate
    let seed = to_absolute_url("", &config.crawler.seed)?;
    let fetcher = HttpFetcher::new(&config.user_agent, config.politeness.clone())?;
    let policy = ProductPolicy::from_config(&config.site)?;
    Ok(Crawler::new(
        seed,
        config.crawler.max_visits,
        fetcher,
        policy,
    ))
}

/// Runs a complete crawl and returns the collected products
///
/// This is the main entry point for a crawl that needs no interruption
/// handling. It will:
/// 1. Build the HTTP fetcher and the site policy
/// 2. Seed the frontier with the configured start address
/// 3. Visit pages until the frontier empties or the budget runs out
///
/// # Example
///
/// ```no_run
/// use tiercrawl::config::load_config;
/// use tiercrawl::crawler::crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("tiercrawl.toml"))?;
/// let products = crawl(&config).await?;
/// println!("collected {} products", products.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: &Config) -> Result<Vec<Product>, CrawlError> {
    let mut crawler = build_crawler(config)?;
    crawler.run().await?;
    Ok(crawler.into_collected())
}
