//! Crawler module for fetching and processing directory pages
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching with timeout and retry logic
//! - Listing page enumeration
//! - HTML queries for pagination, restaurant links and metadata
//! - Restaurant URL discovery and detail extraction
//! - Overall harvest coordination

mod coordinator;
mod extractor;
mod fetcher;
mod harvester;
mod pages;
mod parser;

pub use coordinator::{run_harvest, Coordinator, Harvest, HarvestOptions};
pub use extractor::{extract_restaurant, parse_restaurant, try_extract_restaurant};
pub use fetcher::{
    build_http_client, Fetcher, HttpTransport, Response, ResponseBody, ResponseHead, RetryPolicy,
    Transport, TransportError,
};
pub use harvester::{harvest_urls, HarvestPlan, RestaurantUrls};
pub use pages::{listing_page_url, page_numbers};
pub use parser::PageParser;
