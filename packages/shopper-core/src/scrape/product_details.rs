//! Extractors for product-details pages.

use scraper::{ElementRef, Html, Selector};

use super::{all_texts, attr_of, text_of, STOREFRONT_ORIGIN};
use crate::types::{Action, ActionKind, ContextParts};

const RECOMMENDATION_LIMIT: usize = 5;

/// Up to five `ClickRecommended` actions from the "frequently bought
/// together" carousel; cards missing a title or href are skipped.
pub fn extract_recommendations(document: &Html) -> Vec<Action> {
    let card_selector = match Selector::parse("li.a-carousel-card") {
        Ok(s) => s,
        Err(_) => return vec![],
    };

    let mut actions = Vec::new();
    for card in document.select(&card_selector) {
        let Some(action) = extract_card(card) else {
            continue;
        };
        actions.push(action);
        if actions.len() >= RECOMMENDATION_LIMIT {
            break;
        }
    }
    actions
}

fn extract_card(card: ElementRef<'_>) -> Option<Action> {
    let title = attr_of(card, "a.a-link-normal", "title")?;
    let href = attr_of(card, "a.a-link-normal", "href")?;
    let target_url = format!("{}{}", STOREFRONT_ORIGIN, href);

    let mut context = ContextParts::new();
    context.push("Product Title", Some(title));
    context.push("Product Price", text_of(card, "span.a-size-medium"));

    Some(Action::new(
        ActionKind::ClickRecommended,
        context.finish(),
        Some(target_url),
    ))
}

/// The single terminal action for the product being viewed.
///
/// The context aggregates whatever the buy box exposes; the target keeps the
/// product page URL even though a terminal action is never navigated.
pub fn extract_buy_now(document: &Html, page_url: &str) -> Action {
    let root = document.root_element();

    let mut context = ContextParts::new();
    context.push("Product Title", text_of(root, "span#productTitle"));
    context.push("Product Description", feature_bullets(root));
    for price in all_texts(root, "span.a-price-range span.a-price span.a-offscreen") {
        context.push("Price", Some(price));
    }
    context.push("Average Review", average_review(root));
    context.push("Number Ratings", ratings_count(root));

    Action::new(
        ActionKind::BuyNow,
        context.finish(),
        Some(page_url.to_string()),
    )
}

fn feature_bullets(root: ElementRef<'_>) -> Option<String> {
    let bullets = all_texts(root, "div#feature-bullets span.a-list-item");
    if bullets.is_empty() {
        None
    } else {
        Some(bullets.join("; "))
    }
}

/// The rating histogram's title attribute leads with the average, e.g.
/// "4.6 out of 5 stars".
fn average_review(root: ElementRef<'_>) -> Option<String> {
    attr_of(root, "span.reviewCountTextLinkedHistogram", "title")?
        .split_whitespace()
        .next()
        .map(str::to_string)
}

fn ratings_count(root: ElementRef<'_>) -> Option<String> {
    text_of(root, "span#acrCustomerReviewText")
        .map(|text| text.replace(" ratings", "").replace(',', ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCT_PAGE: &str = r#"<html><body>
        <span id="productTitle"> Summit Boot Pro </span>
        <div id="feature-bullets">
            <span class="a-list-item">Waterproof leather</span>
            <span class="a-list-item">Vibram outsole</span>
        </div>
        <span class="a-price-range">
            <span class="a-price"><span class="a-offscreen">$79.00</span></span>
            <span class="a-price"><span class="a-offscreen">$99.00</span></span>
        </span>
        <span class="reviewCountTextLinkedHistogram" title="4.6 out of 5 stars"></span>
        <span id="acrCustomerReviewText">1,204 ratings</span>
        <ul>
            <li class="a-carousel-card">
                <a class="a-link-normal" title="Wool Socks" href="/dp/B0SOCK"></a>
                <span class="a-size-medium">$14.99</span>
            </li>
            <li class="a-carousel-card">
                <a class="a-link-normal" href="/dp/B0NOTITLE"></a>
            </li>
            <li class="a-carousel-card">
                <a class="a-link-normal" title="Gaiters" href="/dp/B0GAITER"></a>
            </li>
        </ul>
    </body></html>"#;

    #[test]
    fn test_buy_now_aggregates_buy_box_fields() {
        let document = Html::parse_document(PRODUCT_PAGE);

        let action = extract_buy_now(&document, "https://amazon.com/dp/B0BOOT");

        assert_eq!(action.kind, ActionKind::BuyNow);
        assert_eq!(
            action.target_url.as_deref(),
            Some("https://amazon.com/dp/B0BOOT")
        );
        assert_eq!(
            action.context,
            "Product Title: Summit Boot Pro; \
             Product Description: Waterproof leather; Vibram outsole; \
             Price: $79.00; Price: $99.00; \
             Average Review: 4.6; \
             Number Ratings: 1204"
        );
    }

    #[test]
    fn test_buy_now_omits_absent_fields() {
        let document = Html::parse_document("<html><body><p>bare page</p></body></html>");

        let action = extract_buy_now(&document, "https://amazon.com/dp/B0EMPTY");

        assert_eq!(action.kind, ActionKind::BuyNow);
        assert_eq!(action.context, "");
    }

    #[test]
    fn test_recommendations_require_title_and_href() {
        let document = Html::parse_document(PRODUCT_PAGE);

        let actions = extract_recommendations(&document);

        // The card with no title is skipped; the priceless one survives.
        assert_eq!(actions.len(), 2);
        assert!(actions[0].context.contains("Product Title: Wool Socks"));
        assert!(actions[0].context.contains("Product Price: $14.99"));
        assert_eq!(actions[1].context, "Product Title: Gaiters");
        assert_eq!(
            actions[1].target_url.as_deref(),
            Some("https://amazon.com/dp/B0GAITER")
        );
    }

    #[test]
    fn test_recommendation_limit() {
        let mut cards = String::new();
        for i in 0..8 {
            cards.push_str(&format!(
                r#"<li class="a-carousel-card">
                    <a class="a-link-normal" title="Item {}" href="/dp/B{:04}"></a>
                </li>"#,
                i, i
            ));
        }
        let document =
            Html::parse_document(&format!("<html><body><ul>{}</ul></body></html>", cards));

        let actions = extract_recommendations(&document);

        assert_eq!(actions.len(), RECOMMENDATION_LIMIT);
        assert!(actions[0].context.contains("Item 0"));
    }
}
