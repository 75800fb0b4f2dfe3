//! Extractor for search-results pages.

use scraper::{ElementRef, Html, Selector};

use super::{attr_of, text_of, STOREFRONT_ORIGIN};
use crate::types::{Action, ActionKind, ContextParts};

/// At most this many listings become candidates; applied after the validity
/// filter, so invalid items never shrink the frontier below it.
const RESULT_LIMIT: usize = 5;

/// One `ClickSearchResult` per listing item with a resolvable title and
/// destination, in document order.
pub fn extract(document: &Html) -> Vec<Action> {
    let item_selector = match Selector::parse(r#"[data-component-type="s-search-result"]"#) {
        Ok(s) => s,
        Err(_) => return vec![],
    };

    let mut actions = Vec::new();
    for item in document.select(&item_selector) {
        let Some(action) = extract_item(item) else {
            continue;
        };
        actions.push(action);
        if actions.len() >= RESULT_LIMIT {
            break;
        }
    }
    actions
}

fn extract_item(item: ElementRef<'_>) -> Option<Action> {
    // Title and destination are mandatory; everything else degrades.
    let href = attr_of(item, "a.a-link-normal", "href")?;
    let title = text_of(item, "span.a-size-base-plus")?;
    let target_url = format!("{}{}", STOREFRONT_ORIGIN, href);

    let mut context = ContextParts::new();
    context.push("Product Title", Some(title));
    context.push("Price", text_of(item, "span.a-offscreen"));
    context.push(
        "Bestseller Status",
        Some(
            text_of(item, "span.a-badge-label").unwrap_or_else(|| "Not a Bestseller".to_string()),
        ),
    );
    context.push(
        "Star Rating",
        text_of(item, "i.a-icon-star-small span.a-icon-alt"),
    );
    context.push(
        "List Price",
        text_of(item, "span.a-price.a-text-price span.a-offscreen"),
    );

    Some(Action::new(
        ActionKind::ClickSearchResult,
        context.finish(),
        Some(target_url),
    ))
}
