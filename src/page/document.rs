use crate::PageError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A fetched HTML document together with the URL it was served from
///
/// The body is kept as text and parsed per query, so a `Document` can be held
/// across await points.
#[derive(Debug, Clone)]
pub struct Document {
    url: Url,
    body: String,
}

impl Document {
    pub fn new(url: Url, body: impl Into<String>) -> Self {
        Self {
            url,
            body: body.into(),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Maps every element matching `selector` through `map`
    pub fn select<T, F>(&self, selector: &str, map: F) -> Result<Vec<T>, PageError>
    where
        F: FnMut(ElementRef<'_>) -> T,
    {
        let parsed = Selector::parse(selector)
            .map_err(|_| PageError::InvalidSelector(selector.to_string()))?;
        let html = Html::parse_document(&self.body);
        let values = html.select(&parsed).map(map).collect();
        Ok(values)
    }

    /// Returns true if at least one element matches `selector`
    pub fn contains(&self, selector: &str) -> bool {
        self.select(selector, |_| ())
            .map(|matches| !matches.is_empty())
            .unwrap_or(false)
    }
}
