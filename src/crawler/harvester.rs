//! Restaurant URL discovery across listing pages
//!
//! Listing pages are visited strictly one after another, with a pause after
//! each page. Any listing page that cannot be fetched aborts the harvest.

use crate::crawler::fetcher::{Fetcher, Transport};
use crate::crawler::pages::{listing_page_url, page_numbers};
use crate::crawler::parser::PageParser;
use crate::HarvestError;
use std::collections::HashSet;
use std::time::Duration;

/// De-duplicated restaurant URLs, iterated in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestaurantUrls {
    urls: Vec<String>,
    seen: HashSet<String>,
}

impl RestaurantUrls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `url` unless already present; returns whether it was new
    pub fn insert(&mut self, url: String) -> bool {
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.urls.push(url);
        true
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.urls
    }

    pub fn into_vec(self) -> Vec<String> {
        self.urls
    }
}

impl IntoIterator for RestaurantUrls {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.urls.into_iter()
    }
}

impl<'a> IntoIterator for &'a RestaurantUrls {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.urls.iter()
    }
}

/// Inputs for one URL harvest
#[derive(Debug, Clone)]
pub struct HarvestPlan<'a> {
    /// First listing page; page `n` is `{listing_url}/page/{n}`
    pub listing_url: &'a str,

    pub last_page: u32,

    /// Stop as soon as this many distinct URLs have been collected
    pub limit: Option<usize>,

    /// Pause after each fully processed page
    pub page_delay: Duration,
}

/// Collects restaurant URLs from listing pages `1..=last_page`
///
/// # Returns
///
/// * `Ok(RestaurantUrls)` - Every distinct link found, or the first `limit` of them
/// * `Err(HarvestError)` - A listing page could not be fetched
pub async fn harvest_urls<T: Transport>(
    fetcher: &Fetcher<T>,
    parser: &PageParser,
    plan: &HarvestPlan<'_>,
) -> Result<RestaurantUrls, HarvestError> {
    let mut urls = RestaurantUrls::new();
    let limit_reached = |urls: &RestaurantUrls| plan.limit.is_some_and(|limit| urls.len() >= limit);

    if limit_reached(&urls) {
        return Ok(urls);
    }

    for page in page_numbers(1, plan.last_page) {
        tracing::info!("Fetching page {}/{}...", page, plan.last_page);

        let response = fetcher
            .fetch(&listing_page_url(plan.listing_url, page))
            .await?;
        let links = parser.restaurant_links(response.text());

        tracing::info!("Found {} restaurant(s) on page {}", links.len(), page);

        for link in links {
            urls.insert(link);

            if limit_reached(&urls) {
                tracing::debug!("URL limit reached on page {}", page);
                return Ok(urls);
            }
        }

        tokio::time::sleep(plan.page_delay).await;
    }

    Ok(urls)
}
