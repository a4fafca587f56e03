//! In-memory [`Page`] for unit tests

use crate::page::{Document, Page};
use crate::PageError;
use async_trait::async_trait;
use scraper::ElementRef;
use std::collections::HashMap;
use url::Url;

/// Serves canned HTML keyed by absolute URL; unknown URLs answer 404
#[derive(Default)]
pub(crate) struct StaticPage {
    pages: HashMap<String, String>,
    document: Option<Document>,
    pub visits: Vec<String>,
}

impl StaticPage {
    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }
}

#[async_trait]
impl Page for StaticPage {
    async fn navigate(&mut self, url: &Url) -> Result<(), PageError> {
        self.visits.push(url.to_string());
        self.document = None;
        let body = self.pages.get(url.as_str()).ok_or(PageError::Status {
            url: url.to_string(),
            status: 404,
        })?;
        self.document = Some(Document::new(url.clone(), body.as_str()));
        Ok(())
    }

    async fn wait_for_marker(&mut self, selector: &str) -> Result<(), PageError> {
        match &self.document {
            Some(doc) if doc.contains(selector) => Ok(()),
            Some(doc) => Err(PageError::MarkerTimeout {
                url: doc.url().to_string(),
                selector: selector.to_string(),
            }),
            None => Err(PageError::NotLoaded),
        }
    }

    fn extract<T, F>(&self, selector: &str, map: F) -> Result<Vec<T>, PageError>
    where
        F: FnMut(ElementRef<'_>) -> T,
    {
        self.document
            .as_ref()
            .ok_or(PageError::NotLoaded)?
            .select(selector, map)
    }

    fn has_element(&self, selector: &str) -> bool {
        self.document
            .as_ref()
            .is_some_and(|doc| doc.contains(selector))
    }
}
