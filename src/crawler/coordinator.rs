//! Harvest coordinator - main pipeline orchestration logic
//!
//! This module drives a complete harvest:
//! - Discovering the number of listing pages
//! - Collecting restaurant URLs page by page
//! - Fetching restaurant details with bounded parallelism
//! - Reassembling records in URL order and reporting failures

use crate::config::{Config, HarvesterConfig, SiteConfig};
use crate::crawler::extractor::extract_restaurant;
use crate::crawler::fetcher::{Fetcher, HttpTransport, RetryPolicy, Transport};
use crate::crawler::harvester::{harvest_urls, HarvestPlan, RestaurantUrls};
use crate::crawler::parser::PageParser;
use crate::{ConfigError, HarvestError, Restaurant};
use futures::stream::{self, StreamExt};
use std::time::Duration;

/// Per-run knobs, usually taken from the CLI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestOptions {
    /// Cap on the number of restaurant URLs collected
    pub limit: Option<usize>,

    /// Maximum number of detail pages in flight at once (0 behaves as 1)
    pub concurrency: usize,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self::from(&HarvesterConfig::default())
    }
}

impl From<&HarvesterConfig> for HarvestOptions {
    fn from(config: &HarvesterConfig) -> Self {
        Self {
            limit: config.limit,
            concurrency: config.concurrency,
        }
    }
}

/// Outcome of a completed harvest
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    /// Extracted restaurants, in the order their URLs were discovered
    pub records: Vec<Restaurant>,

    /// URLs whose details could not be extracted, in discovery order
    pub failed_urls: Vec<String>,

    /// Number of distinct restaurant URLs discovered
    pub discovered: usize,
}

impl Harvest {
    pub fn into_records(self) -> Vec<Restaurant> {
        self.records
    }
}

/// Main harvest coordinator structure
pub struct Coordinator<T = HttpTransport> {
    fetcher: Fetcher<T>,
    parser: PageParser,
    site: SiteConfig,
    page_delay: Duration,
    detail_delay: Duration,
}

impl Coordinator<HttpTransport> {
    /// Creates a coordinator that talks to the network through reqwest
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let transport = HttpTransport::new(&config.user_agent)?;
        Self::new(config, transport)
    }
}

impl<T: Transport> Coordinator<T> {
    /// Creates a coordinator over an arbitrary transport
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(ConfigError)` - A selector or URL in the configuration is invalid
    pub fn new(config: &Config, transport: T) -> Result<Self, ConfigError> {
        let parser = PageParser::new(&config.selectors, &config.site.base_url)?;

        Ok(Self {
            fetcher: Fetcher::new(transport, RetryPolicy::from(&config.fetcher)),
            parser,
            site: config.site.clone(),
            page_delay: Duration::from_millis(config.harvester.page_delay_ms),
            detail_delay: Duration::from_millis(config.harvester.detail_delay_ms),
        })
    }

    pub fn fetcher(&self) -> &Fetcher<T> {
        &self.fetcher
    }

    /// Runs the full pipeline
    ///
    /// 1. Read the last page number from the first listing page
    /// 2. Collect restaurant URLs (up to `limit`)
    /// 3. Extract every restaurant, at most `concurrency` at a time
    /// 4. Log the URLs that failed
    ///
    /// # Returns
    ///
    /// * `Ok(Harvest)` - All URLs were processed; some may have failed
    /// * `Err(HarvestError)` - Pagination or a listing page could not be read
    pub async fn run(&self, options: &HarvestOptions) -> Result<Harvest, HarvestError> {
        tracing::info!("Starting harvest...");

        let last_page = self.last_page_number().await?;
        tracing::info!("Found {} page(s) of restaurants", last_page);

        let urls = self.harvest_urls(last_page, options.limit).await?;
        tracing::info!("Found {} restaurant(s)", urls.len());

        let discovered = urls.len();
        let (records, failed_urls) = self
            .fetch_restaurants(urls.as_slice(), options.concurrency)
            .await;

        if !failed_urls.is_empty() {
            tracing::warn!(
                "Failed to extract {} of {} restaurant(s):",
                failed_urls.len(),
                discovered
            );
            for url in &failed_urls {
                tracing::warn!("  {}", url);
            }
        }

        tracing::info!("Harvested {} restaurant(s)", records.len());

        Ok(Harvest {
            records,
            failed_urls,
            discovered,
        })
    }

    /// Highest page number advertised by the first listing page
    pub async fn last_page_number(&self) -> Result<u32, HarvestError> {
        let listing_url = &self.site.listing_url;
        let response = self.fetcher.fetch(listing_url).await?;

        self.parser
            .last_page_number(response.text())
            .ok_or_else(|| HarvestError::Pagination {
                url: listing_url.clone(),
            })
    }

    /// Collects restaurant URLs from listing pages `1..=last_page`
    pub async fn harvest_urls(
        &self,
        last_page: u32,
        limit: Option<usize>,
    ) -> Result<RestaurantUrls, HarvestError> {
        let plan = HarvestPlan {
            listing_url: &self.site.listing_url,
            last_page,
            limit,
            page_delay: self.page_delay,
        };
        harvest_urls(&self.fetcher, &self.parser, &plan).await
    }

    /// Extracts one restaurant; None if it failed (already logged)
    pub async fn extract_restaurant(&self, url: &str) -> Option<Restaurant> {
        extract_restaurant(&self.fetcher, &self.parser, url).await
    }

    /// Extracts every restaurant in `urls` with at most `concurrency` in flight
    ///
    /// Each extraction waits for the detail delay before starting, so the
    /// delay paces requests within each parallel slot. Results are tagged with
    /// their input index and folded back in input order, regardless of which
    /// finishes first.
    ///
    /// # Returns
    ///
    /// `(records, failed_urls)`, both in input order
    pub async fn fetch_restaurants(
        &self,
        urls: &[String],
        concurrency: usize,
    ) -> (Vec<Restaurant>, Vec<String>) {
        let total = urls.len();

        let extractions = urls.iter().enumerate().map(|(index, url)| async move {
            tokio::time::sleep(self.detail_delay).await;
            tracing::info!(
                "Fetching restaurant details from {} ({}/{})...",
                url,
                index + 1,
                total
            );
            (index, self.extract_restaurant(url).await)
        });

        let mut slots: Vec<Option<Restaurant>> = vec![None; total];
        let mut completed = stream::iter(extractions).buffer_unordered(concurrency.max(1));
        while let Some((index, restaurant)) = completed.next().await {
            slots[index] = restaurant;
        }

        let mut records = Vec::with_capacity(total);
        let mut failed_urls = Vec::new();
        for (url, slot) in urls.iter().zip(slots) {
            match slot {
                Some(restaurant) => records.push(restaurant),
                None => failed_urls.push(url.clone()),
            }
        }

        (records, failed_urls)
    }
}

/// Runs a complete harvest over the network
///
/// # Example
///
/// ```no_run
/// use restaurant_harvester::config::Config;
/// use restaurant_harvester::crawler::{run_harvest, HarvestOptions};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let options = HarvestOptions { limit: Some(10), concurrency: 2 };
/// let harvest = run_harvest(&Config::default(), &options).await?;
/// println!("{} restaurants", harvest.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(
    config: &Config,
    options: &HarvestOptions,
) -> Result<Harvest, HarvestError> {
    let coordinator = Coordinator::from_config(config)?;
    coordinator.run(options).await
}
