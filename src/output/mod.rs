//! Output module for persisting harvest results
//!
//! This module handles:
//! - Writing harvested restaurants as a pretty-printed JSON document
//! - Formatting an end-of-run summary for the terminal

mod json;
mod summary;

pub use json::{format_restaurants, write_restaurants};
pub use summary::{format_summary, print_summary};

/// Where the restaurant document is written unless configured otherwise
pub const DEFAULT_OUTPUT_PATH: &str = "data/restaurants.json";
