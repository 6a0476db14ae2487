//! Listing page enumeration

/// Page numbers from `first` to `last`, both inclusive, ascending
///
/// Empty when `first > last`.
///
/// ```
/// use restaurant_harvester::crawler::page_numbers;
///
/// assert_eq!(page_numbers(1, 4), vec![1, 2, 3, 4]);
/// assert!(page_numbers(3, 2).is_empty());
/// ```
pub fn page_numbers(first: u32, last: u32) -> Vec<u32> {
    (first..=last).collect()
}

/// URL of listing page `page`
pub fn listing_page_url(listing_url: &str, page: u32) -> String {
    format!("{}/page/{}", listing_url.trim_end_matches('/'), page)
}
