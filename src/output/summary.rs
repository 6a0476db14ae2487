//! End-of-run summary

use crate::crawler::Harvest;
use std::path::Path;

/// Formats a short human-readable summary of a harvest
pub fn format_summary(harvest: &Harvest, output_path: &Path) -> String {
    let mut text = String::new();

    text.push_str("=== Harvest Summary ===\n\n");
    text.push_str(&format!("  Restaurants discovered: {}\n", harvest.discovered));
    text.push_str(&format!("  Restaurants extracted:  {}\n", harvest.records.len()));
    text.push_str(&format!("  Failed extractions:     {}\n", harvest.failed_urls.len()));

    for url in &harvest.failed_urls {
        text.push_str(&format!("    - {}\n", url));
    }

    text.push_str(&format!("\nOutput: {}\n", output_path.display()));
    text
}

/// Prints the summary to stdout
pub fn print_summary(harvest: &Harvest, output_path: &Path) {
    print!("{}", format_summary(harvest, output_path));
}
