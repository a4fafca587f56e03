//! Record extraction for listing items
//!
//! Capturing is the only part that touches the DOM: [`capture_item`] reads the
//! raw fields out of one `.product_pod` element. [`normalize_record`] is a pure
//! mapping from those raw fields to a [`Record`].

mod record;

pub use record::{normalize_record, ItemTags, RawItem, Record};

use scraper::{ElementRef, Selector};

/// Reads title, price, availability and image path from a listing item
///
/// Missing elements or attributes leave the corresponding field as `None`.
pub fn capture_item(item: ElementRef<'_>) -> RawItem {
    RawItem {
        title: first_attr(item, "h3 a", "title"),
        price: first_text(item, ".price_color"),
        availability: first_text(item, ".availability"),
        image: first_attr(item, "img", "src"),
    }
}

fn first_attr(item: ElementRef<'_>, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    item.select(&selector)
        .next()
        .and_then(|element| element.value().attr(attr))
        .map(str::to_string)
}

fn first_text(item: ElementRef<'_>, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    item.select(&selector)
        .next()
        .map(|element| element.text().collect::<String>())
}
