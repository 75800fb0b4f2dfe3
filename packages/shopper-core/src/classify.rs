//! Pure URL classification: no network, no markup.

/// URL prefix identifying a storefront search-results request.
const SEARCH_URL_PREFIX: &str = "https://www.amazon.com/s?k";

const SEARCH_BASE_URL: &str = "https://www.amazon.com/s";

/// The closed set of page shapes the extractors know how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    SearchResults,
    ProductDetails,
}

/// Classify a URL by its shape alone.
///
/// Total: anything that is not a search-results request is treated as a
/// product details page.
pub fn classify(url: &str) -> PageType {
    if url.starts_with(SEARCH_URL_PREFIX) {
        PageType::SearchResults
    } else {
        PageType::ProductDetails
    }
}

/// Build the search URL a goal query resolves to.
pub fn search_url_for(goal: &str) -> String {
    format!("{}?k={}", SEARCH_BASE_URL, goal.replace(' ', "+"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_classifies_as_search_results() {
        assert_eq!(
            classify("https://www.amazon.com/s?k=hiking+shoes"),
            PageType::SearchResults
        );
    }

    #[test]
    fn test_other_urls_classify_as_product_details() {
        assert_eq!(
            classify("https://amazon.com/Trail-Runner/dp/B0ABCDEF"),
            PageType::ProductDetails
        );
        assert_eq!(classify("https://example.com"), PageType::ProductDetails);
    }

    #[test]
    fn test_search_url_for_replaces_spaces() {
        assert_eq!(
            search_url_for("hiking shoes"),
            "https://www.amazon.com/s?k=hiking+shoes"
        );
    }

    #[test]
    fn test_constructed_search_url_round_trips_through_classify() {
        assert_eq!(
            classify(&search_url_for("trail mix")),
            PageType::SearchResults
        );
    }
}
