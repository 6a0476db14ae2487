use serde::Deserialize;

/// Main configuration structure for Restaurant-Harvester
///
/// Every section is optional in the TOML file; missing sections fall back to
/// the defaults for the Michelin Guide directory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub harvester: HarvesterConfig,
    pub fetcher: FetcherConfig,
    pub selectors: SelectorConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Where the directory lives
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL that relative restaurant links are resolved against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// First listing page; page `n` lives at `{listing-url}/page/{n}`
    #[serde(rename = "listing-url")]
    pub listing_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://guide.michelin.com".to_string(),
            listing_url: "https://guide.michelin.com/gb/en/restaurants".to_string(),
        }
    }
}

/// Pacing and bounds for the harvest pipeline
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarvesterConfig {
    /// Delay after each listing page (milliseconds)
    #[serde(rename = "page-delay-ms")]
    pub page_delay_ms: u64,

    /// Delay before each restaurant detail fetch (milliseconds)
    #[serde(rename = "detail-delay-ms")]
    pub detail_delay_ms: u64,

    /// Maximum number of detail pages in flight at once
    pub concurrency: usize,

    /// Cap on the number of restaurant URLs collected
    pub limit: Option<usize>,
}

impl Default for HarvesterConfig {
    fn default() -> Self {
        Self {
            page_delay_ms: 1_000,
            detail_delay_ms: 1_000,
            concurrency: 2,
            limit: None,
        }
    }
}

/// Retry behavior of the resilient fetcher
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Total attempts per logical fetch
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Per-attempt timeout (milliseconds)
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Backoff before attempt `n + 1` is `backoff-base-ms * 2^n`
    #[serde(rename = "backoff-base-ms")]
    pub backoff_base_ms: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            timeout_ms: 5_000,
            backoff_base_ms: 1_000,
        }
    }
}

/// CSS selectors used to query listing and detail pages
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub pagination: String,
    #[serde(rename = "restaurant-link")]
    pub restaurant_link: String,
    pub metadata: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            pagination: ".pagination a.btn".to_string(),
            restaurant_link: ".card__menu > a".to_string(),
            metadata: r#"script[type="application/ld+json"]"#.to_string(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "RestaurantHarvester".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the JSON document holding every harvested restaurant
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: crate::output::DEFAULT_OUTPUT_PATH.to_string(),
        }
    }
}
