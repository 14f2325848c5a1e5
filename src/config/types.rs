use serde::Deserialize;

/// Main configuration structure for Tiercrawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub politeness: PolitenessConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub site: SiteConfig,
}

/// Crawl traversal configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Address the crawl starts from
    pub seed: String,

    /// Maximum number of distinct addresses to visit
    #[serde(rename = "max-visits")]
    pub max_visits: usize,
}

/// Politeness and retry behavior of the HTTP fetcher
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PolitenessConfig {
    /// Lower bound of the randomized delay after each fetch (milliseconds)
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Upper bound of the randomized delay after each fetch (milliseconds)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Additional attempts after a 429 response
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Wait used when a 429 response carries no usable Retry-After (seconds)
    #[serde(default = "default_retry_after_secs")]
    pub default_retry_after_secs: u64,

    /// Ceiling applied to any Retry-After wait (seconds)
    #[serde(default = "default_max_retry_after_secs")]
    pub max_retry_after_secs: u64,

    /// Whole-request timeout (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for PolitenessConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_retries: default_max_retries(),
            default_retry_after_secs: default_retry_after_secs(),
            max_retry_after_secs: default_max_retry_after_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_min_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    1500
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_after_secs() -> u64 {
    60
}

fn default_max_retry_after_secs() -> u64 {
    300
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the CSV file receiving collected records
    #[serde(rename = "records-path")]
    pub records_path: String,

    /// Directory receiving a state snapshot when the crawl is interrupted
    #[serde(rename = "snapshot-dir")]
    pub snapshot_dir: String,
}

/// Site-specific crawl rules
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Addresses must match this regex to be visited
    #[serde(rename = "visit-pattern")]
    pub visit_pattern: String,

    /// Addresses matching this regex are visited first and collected
    #[serde(rename = "collect-pattern")]
    pub collect_pattern: String,

    /// Path fragments that exclude an address from the crawl
    #[serde(default)]
    pub disallow: Vec<String>,

    /// CSS selectors used to extract record fields
    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// CSS selectors for the fields of a product record
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub price: String,
    pub currency: String,
    pub category: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            id: "[data-product]".to_string(),
            name: "h1 [itemprop=name]".to_string(),
            brand: "[itemprop=brand]".to_string(),
            price: "[itemprop=price]".to_string(),
            currency: "[itemprop=priceCurrency]".to_string(),
            category: ".breadcrumb :last-of-type > a[itemprop=url]".to_string(),
        }
    }
}
