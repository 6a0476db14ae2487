//! Restaurant detail extraction
//!
//! A failing detail page never aborts the harvest: the error is logged and
//! the restaurant is simply left out.

use crate::crawler::fetcher::{Fetcher, Transport};
use crate::crawler::parser::PageParser;
use crate::{HarvestError, Restaurant};
use serde_json::Value;

/// Fetches one detail page and returns its restaurant record
///
/// Returns None (after logging the URL and cause) if the page cannot be
/// fetched or its metadata block is missing or malformed.
pub async fn extract_restaurant<T: Transport>(
    fetcher: &Fetcher<T>,
    parser: &PageParser,
    url: &str,
) -> Option<Restaurant> {
    match try_extract_restaurant(fetcher, parser, url).await {
        Ok(restaurant) => Some(restaurant),
        Err(e) => {
            tracing::error!("Failed to fetch restaurant details from {}: {}", url, e);
            None
        }
    }
}

/// Like [`extract_restaurant`], but hands back the failure
pub async fn try_extract_restaurant<T: Transport>(
    fetcher: &Fetcher<T>,
    parser: &PageParser,
    url: &str,
) -> Result<Restaurant, HarvestError> {
    let response = fetcher.fetch(url).await?;

    let metadata = parser
        .metadata(response.text())
        .ok_or_else(|| HarvestError::MissingMetadata {
            url: url.to_string(),
        })?;

    parse_restaurant(url, &metadata)
}

/// Parses a metadata block into a restaurant record
///
/// The block must be a JSON object; its keys are kept verbatim and in order.
pub fn parse_restaurant(url: &str, metadata: &str) -> Result<Restaurant, HarvestError> {
    let value: Value =
        serde_json::from_str(metadata).map_err(|source| HarvestError::MalformedMetadata {
            url: url.to_string(),
            source,
        })?;

    match value {
        Value::Object(restaurant) => Ok(restaurant),
        _ => Err(HarvestError::NotAnObject {
            url: url.to_string(),
        }),
    }
}
