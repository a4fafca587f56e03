//! Page interface between the crawl core and whatever loads documents
//!
//! The crawl core only ever talks to a [`Page`]: it navigates, waits for a marker
//! element, extracts values with a selector, and probes for elements. The
//! concrete engine behind it is [`HttpPage`], which fetches static HTML with
//! reqwest and queries it with `scraper`.

mod document;
mod http;
#[cfg(test)]
pub(crate) mod testing;

pub use document::Document;
pub use http::{build_http_client, HttpPage};

use crate::PageError;
use async_trait::async_trait;
use scraper::ElementRef;
use url::Url;

/// Marks a listing page whose items are ready to extract
pub const LISTING_MARKER: &str = ".product_pod";

/// Present on a listing page when a further page exists
pub const NEXT_PAGE: &str = "li.next a";

/// Marks the page carrying the genre directory
pub const GENRE_DIRECTORY_MARKER: &str = ".side_categories";

/// One link per genre in the directory
pub const GENRE_LINKS: &str = ".side_categories ul li ul li a";

/// A loaded document the crawler can drive
///
/// Implementations keep the most recently loaded document as their state;
/// `extract` and `has_element` always query that document.
#[async_trait]
pub trait Page: Send {
    /// Loads `url`, replacing the current document
    async fn navigate(&mut self, url: &Url) -> Result<(), PageError>;

    /// Waits until an element matching `selector` is present in the current document
    async fn wait_for_marker(&mut self, selector: &str) -> Result<(), PageError>;

    /// Maps every element matching `selector` through `map`, in document order
    fn extract<T, F>(&self, selector: &str, map: F) -> Result<Vec<T>, PageError>
    where
        F: FnMut(ElementRef<'_>) -> T;

    /// Returns true if the current document contains an element matching `selector`
    fn has_element(&self, selector: &str) -> bool;
}
