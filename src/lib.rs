//! Restaurant-Harvester: a paginated restaurant directory scraper
//!
//! This crate walks the listing pages of a restaurant directory, collects the
//! detail-page URLs, and extracts the structured metadata embedded in each
//! detail page into a single JSON document.

pub mod config;
pub mod crawler;
pub mod output;

use thiserror::Error;

/// Main error type for Restaurant-Harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Failed to fetch {url} - expected \"200 OK\", got \"{status}\"")]
    Status { url: String, status: u16 },

    #[error("Fetching {url} failed after {attempts} attempts - expected \"200 OK\", got \"{last_status}\"")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_status: LastStatus,
    },

    #[error("Failed to find last page link at {url}")]
    Pagination { url: String },

    #[error("Failed to find metadata JSON at {url}")]
    MissingMetadata { url: String },

    #[error("Malformed metadata JSON at {url}: {source}")]
    MalformedMetadata {
        url: String,
        source: serde_json::Error,
    },

    #[error("Metadata at {url} is not a JSON object")]
    NotAnObject { url: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Status of the last response seen before a fetch gave up
///
/// Displays as `undefined` when no attempt produced a response at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LastStatus(pub Option<u16>);

impl std::fmt::Display for LastStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(status) => write!(f, "{}", status),
            None => f.write_str("undefined"),
        }
    }
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

    #[error("Invalid CSS selector '{0}'")]
    InvalidSelector(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Result type alias for Restaurant-Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// One restaurant, exactly as described by its page's embedded metadata
pub type Restaurant = serde_json::Map<String, serde_json::Value>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, Harvest, HarvestOptions};
