//! Markup extraction: one extractor per page type, selected by the classifier.
//!
//! Extractors are pure functions over the parsed document. A missing element
//! degrades to an omitted context field or a skipped item; only the fetch
//! itself can fail.

mod product_details;
mod search_results;

use std::sync::Arc;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::classify::{classify, search_url_for, PageType};
use crate::error::FetchError;
use crate::fetch::FetchCache;
use crate::types::{Action, ActionKind};

/// Relative hrefs on the storefront resolve against this origin.
pub(crate) const STOREFRONT_ORIGIN: &str = "https://amazon.com";

/// Trait for the engine's view of a storefront (to allow mocking)
#[async_trait]
pub trait ActionSource: Send + Sync {
    /// Seed the frontier for a fresh task; always a single `QueryGoal` action.
    fn initial_actions(&mut self, goal: &str) -> Vec<Action>;

    /// Fetch, classify, and extract the candidate actions reachable from `url`.
    async fn possible_actions(&self, url: &str) -> Result<Vec<Action>, FetchError>;
}

/// Production storefront reader backed by the shared fetch cache.
pub struct AmazonScraper {
    cache: Arc<FetchCache>,
    // Search URL recorded at task start; target of BackToSearchResults.
    search_url: Option<String>,
}

impl AmazonScraper {
    pub fn new(cache: Arc<FetchCache>) -> Self {
        Self {
            cache,
            search_url: None,
        }
    }
}

#[async_trait]
impl ActionSource for AmazonScraper {
    fn initial_actions(&mut self, goal: &str) -> Vec<Action> {
        let url = search_url_for(goal);
        self.search_url = Some(url.clone());
        vec![Action::new(ActionKind::QueryGoal, goal, Some(url))]
    }

    async fn possible_actions(&self, url: &str) -> Result<Vec<Action>, FetchError> {
        let content = self.cache.fetch(url).await?;
        let html = String::from_utf8_lossy(&content);
        let document = Html::parse_document(&html);

        let actions = match classify(url) {
            PageType::SearchResults => search_results::extract(&document),
            PageType::ProductDetails => {
                let mut actions = product_details::extract_recommendations(&document);
                actions.push(product_details::extract_buy_now(&document, url));
                actions.push(Action::new(
                    ActionKind::BackToSearchResults,
                    "Go back to search results",
                    self.search_url.clone(),
                ));
                actions
            }
        };

        debug!(url = %url, candidates = actions.len(), "Extracted frontier");
        Ok(actions)
    }
}

/// First matching element's text under `scope`, trimmed; `None` when the
/// element is missing or blank.
pub(crate) fn text_of(scope: ElementRef<'_>, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    let text: String = scope.select(&selector).next()?.text().collect();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// First matching element's attribute under `scope`.
pub(crate) fn attr_of(scope: ElementRef<'_>, css: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    scope
        .select(&selector)
        .next()?
        .value()
        .attr(attr)
        .map(str::to_string)
}

/// Trimmed non-empty texts of every matching element, in document order.
pub(crate) fn all_texts(scope: ElementRef<'_>, css: &str) -> Vec<String> {
    let selector = match Selector::parse(css) {
        Ok(s) => s,
        Err(_) => return vec![],
    };
    scope
        .select(&selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_of_returns_none_for_missing_element() {
        let document = Html::parse_document("<div><span class=\"a\">x</span></div>");
        let root = document.root_element();
        assert_eq!(text_of(root, "span.a"), Some("x".to_string()));
        assert_eq!(text_of(root, "span.b"), None);
    }

    #[test]
    fn test_text_of_treats_blank_as_missing() {
        let document = Html::parse_document("<div><span class=\"a\">   </span></div>");
        let root = document.root_element();
        assert_eq!(text_of(root, "span.a"), None);
    }
}
