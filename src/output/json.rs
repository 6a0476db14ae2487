//! JSON document output

use crate::{HarvestError, Restaurant};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes all restaurants to `output_path` as a pretty-printed JSON array
///
/// Missing parent directories are created. An existing file is replaced.
///
/// # Arguments
///
/// * `restaurants` - Harvested records, written in the given order
/// * `output_path` - Path of the JSON document
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the document
/// * `Err(HarvestError)` - Failed to serialize or write it
pub fn write_restaurants(restaurants: &[Restaurant], output_path: &Path) -> Result<(), HarvestError> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let json = format_restaurants(restaurants)?;

    let mut file = File::create(output_path)?;
    file.write_all(json.as_bytes())?;

    Ok(())
}

/// Formats restaurants as a JSON array indented by two spaces
pub fn format_restaurants(restaurants: &[Restaurant]) -> Result<String, HarvestError> {
    let mut json = serde_json::to_string_pretty(restaurants)?;
    json.push('\n');
    Ok(json)
}
