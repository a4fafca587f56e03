//! reqwest-backed page implementation
//!
//! Listing pages of the catalog are static HTML, so "rendering" a page is a
//! GET request and waiting for the marker is a presence check on the body.

use crate::config::HttpConfig;
use crate::page::{Document, Page};
use crate::PageError;
use async_trait::async_trait;
use reqwest::Client;
use scraper::ElementRef;
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use shelf_scraper::config::HttpConfig;
/// use shelf_scraper::page::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// A [`Page`] that loads documents over HTTP
pub struct HttpPage {
    client: Client,
    document: Option<Document>,
}

impl HttpPage {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            document: None,
        }
    }

    /// The currently loaded document, if the last navigation succeeded
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    fn loaded(&self) -> Result<&Document, PageError> {
        self.document.as_ref().ok_or(PageError::NotLoaded)
    }
}

#[async_trait]
impl Page for HttpPage {
    async fn navigate(&mut self, url: &Url) -> Result<(), PageError> {
        // A failed navigation must not leave the previous document queryable
        self.document = None;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| PageError::Navigation {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PageError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|source| PageError::Navigation {
                url: url.to_string(),
                source,
            })?;

        self.document = Some(Document::new(final_url, body));
        Ok(())
    }

    async fn wait_for_marker(&mut self, selector: &str) -> Result<(), PageError> {
        let document = self.loaded()?;
        if document.contains(selector) {
            Ok(())
        } else {
            Err(PageError::MarkerTimeout {
                url: document.url().to_string(),
                selector: selector.to_string(),
            })
        }
    }

    fn extract<T, F>(&self, selector: &str, map: F) -> Result<Vec<T>, PageError>
    where
        F: FnMut(ElementRef<'_>) -> T,
    {
        self.loaded()?.select(selector, map)
    }

    fn has_element(&self, selector: &str) -> bool {
        self.document
            .as_ref()
            .is_some_and(|document| document.contains(selector))
    }
}
