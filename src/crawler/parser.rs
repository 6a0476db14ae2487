//! HTML queries for listing and detail pages
//!
//! This module extracts the three things the harvester needs from raw HTML:
//! - The highest page number in the pagination controls
//! - Restaurant detail links from the listing cards (absolute URLs)
//! - The embedded `ld+json` metadata block of a detail page

use crate::config::SelectorConfig;
use crate::ConfigError;
use scraper::{Html, Selector};
use url::Url;

/// Compiled selectors plus the base URL links are resolved against
#[derive(Debug, Clone)]
pub struct PageParser {
    pagination: Selector,
    restaurant_link: Selector,
    metadata: Selector,
    base_url: Url,
}

impl PageParser {
    /// Compiles the configured selectors
    ///
    /// # Returns
    ///
    /// * `Ok(PageParser)` - All selectors compiled and the base URL parsed
    /// * `Err(ConfigError)` - A selector or the base URL is invalid
    pub fn new(selectors: &SelectorConfig, base_url: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", base_url, e)))?;

        Ok(Self {
            pagination: compile(&selectors.pagination)?,
            restaurant_link: compile(&selectors.restaurant_link)?,
            metadata: compile(&selectors.metadata)?,
            base_url,
        })
    }

    /// Highest numeric pagination control on a listing page
    ///
    /// Controls whose text is not a number ("Next", arrows) are ignored.
    /// Returns None when no numeric control is present.
    ///
    /// # Example
    ///
    /// ```
    /// use restaurant_harvester::config::SelectorConfig;
    /// use restaurant_harvester::crawler::PageParser;
    ///
    /// let parser = PageParser::new(&SelectorConfig::default(), "https://example.com").unwrap();
    /// let html = r#"<div class="pagination">
    ///     <a class="btn">1</a><a class="btn">2</a><a class="btn">17</a><a class="btn">&gt;</a>
    /// </div>"#;
    /// assert_eq!(parser.last_page_number(html), Some(17));
    /// ```
    pub fn last_page_number(&self, html: &str) -> Option<u32> {
        let document = Html::parse_document(html);

        document
            .select(&self.pagination)
            .filter_map(|element| element.text().collect::<String>().trim().parse::<u32>().ok())
            .max()
    }

    /// Restaurant detail URLs on a listing page, in document order
    pub fn restaurant_links(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);

        document
            .select(&self.restaurant_link)
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| resolve_link(href, &self.base_url))
            .collect()
    }

    /// Raw text of the first structured-data block on a detail page
    pub fn metadata(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);

        document
            .select(&self.metadata)
            .next()
            .map(|element| element.text().collect::<String>())
            .filter(|text| !text.trim().is_empty())
    }
}

fn compile(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|_| ConfigError::InvalidSelector(selector.to_string()))
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url.to_string()),
        _ => None,
    }
}
