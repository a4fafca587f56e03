//! Pagination controller
//!
//! Walks one listing stream page by page: computes each page's URL, fetches
//! and extracts it with bounded retries, and follows the "next page"
//! affordance until it disappears or the page limit is reached.
//!
//! # Failed pages
//!
//! A page that fails every attempt is skipped and the stream keeps going, but
//! only on the strength of the previous page's "next" link. The probe result of
//! the last successfully loaded page is reused when that page immediately
//! precedes the failed one; otherwise there is no trustworthy document to
//! probe and the stream ends. So a failing first page ends the stream, one bad
//! page between good ones is stepped over, and two consecutive failures stop
//! the traversal even without a page limit.

use crate::config::CrawlerConfig;
use crate::crawler::observer::CrawlObserver;
use crate::crawler::retry::{Operation, RetryPolicy};
use crate::extract::{capture_item, normalize_record, ItemTags, Record};
use crate::page::{Page, LISTING_MARKER, NEXT_PAGE};
use crate::PageError;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// How page numbers map to URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAddressing {
    /// Page 1 is `<root>/index.html`, page N is `<root>/catalogue/page-N.html`
    Catalog { root: Url },

    /// Page 1 is the genre's listing URL, page N replaces its last segment with `page-N.html`
    Genre { first_page: Url },
}

impl PageAddressing {
    pub fn url_for(&self, page_index: u32) -> Result<Url, url::ParseError> {
        match self {
            Self::Catalog { root } if page_index <= 1 => root.join("index.html"),
            Self::Catalog { root } => root.join(&format!("catalogue/page-{}.html", page_index)),
            Self::Genre { first_page } if page_index <= 1 => Ok(first_page.clone()),
            Self::Genre { first_page } => first_page.join(&format!("page-{}.html", page_index)),
        }
    }
}

/// Records of one listing page and whether a further page exists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub records: Vec<Record>,
    pub has_next: bool,
}

/// Fetches and extracts one listing page
#[async_trait]
pub trait ListingSource: Send {
    async fn fetch_listing(&mut self, url: &Url, page_index: u32) -> Result<ListingPage, PageError>;
}

/// [`ListingSource`] backed by a [`Page`]
///
/// Navigates, waits for the listing marker, extracts every item, and probes
/// the next-page affordance on the same document.
pub struct PageListingSource<'p, P> {
    page: &'p mut P,
    base_url: Url,
    genre: Option<String>,
}

impl<'p, P: Page> PageListingSource<'p, P> {
    /// Flat catalog stream; records are tagged with their page index
    pub fn catalog(page: &'p mut P, base_url: Url) -> Self {
        Self {
            page,
            base_url,
            genre: None,
        }
    }

    /// Genre stream; records are tagged with the genre name
    pub fn genre(page: &'p mut P, base_url: Url, genre: &str) -> Self {
        Self {
            page,
            base_url,
            genre: Some(genre.to_string()),
        }
    }

    fn tags(&self, page_index: u32) -> ItemTags {
        match &self.genre {
            Some(name) => ItemTags::genre(name.as_str()),
            None => ItemTags::page(page_index),
        }
    }
}

#[async_trait]
impl<'p, P: Page> ListingSource for PageListingSource<'p, P> {
    async fn fetch_listing(
        &mut self,
        url: &Url,
        page_index: u32,
    ) -> Result<ListingPage, PageError> {
        self.page.navigate(url).await?;
        self.page.wait_for_marker(LISTING_MARKER).await?;

        let tags = self.tags(page_index);
        let records = self
            .page
            .extract(LISTING_MARKER, capture_item)?
            .into_iter()
            .map(|raw| normalize_record(raw, &self.base_url, &tags))
            .collect();

        let has_next = self.page.has_element(NEXT_PAGE);

        Ok(ListingPage { records, has_next })
    }
}

/// One page fetch, as a retryable operation
struct FetchListing<'a, S> {
    source: &'a mut S,
    url: &'a Url,
    page_index: u32,
}

#[async_trait]
impl<'a, S: ListingSource> Operation for FetchListing<'a, S> {
    type Output = ListingPage;
    type Error = PageError;

    async fn attempt(&mut self) -> Result<ListingPage, PageError> {
        self.source.fetch_listing(self.url, self.page_index).await
    }
}

/// Per-stream traversal state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamState {
    /// Page about to be fetched, starting at 1
    pub current_page_index: u32,

    /// Whether the stream may continue past the current page
    pub has_next_page: bool,

    /// Index of the most recent page that loaded successfully
    pub last_loaded_index: Option<u32>,
}

impl Default for StreamState {
    fn default() -> Self {
        Self {
            current_page_index: 1,
            has_next_page: true,
            last_loaded_index: None,
        }
    }
}

impl StreamState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the current page should be fetched
    pub fn should_continue(&self, page_limit: Option<u32>) -> bool {
        self.has_next_page && page_limit.map_or(true, |limit| self.current_page_index <= limit)
    }

    /// The current page loaded; `has_next` is its next-page probe
    pub fn page_loaded(&mut self, has_next: bool) {
        self.last_loaded_index = Some(self.current_page_index);
        self.has_next_page = has_next;
        self.current_page_index += 1;
    }

    /// The current page was skipped after exhausting its retries
    pub fn page_skipped(&mut self) {
        let previous = self.current_page_index.checked_sub(1);
        self.has_next_page =
            self.has_next_page && previous.is_some() && self.last_loaded_index == previous;
        self.current_page_index += 1;
    }
}

/// Drives listing streams with one crawl configuration
#[derive(Debug, Clone)]
pub struct PaginationController {
    page_limit: Option<u32>,
    inter_page_delay: Duration,
    retry: RetryPolicy,
}

impl PaginationController {
    pub fn new(config: &CrawlerConfig) -> Self {
        Self {
            page_limit: config.page_limit,
            inter_page_delay: Duration::from_millis(config.inter_page_delay_ms),
            retry: RetryPolicy::from_config(config),
        }
    }

    /// Runs one stream to completion and returns its records in page order
    ///
    /// Page failures never abort the stream; they are retried, then skipped
    /// and reported to `observer`.
    pub async fn run<S, O>(
        &self,
        stream_id: &str,
        addressing: &PageAddressing,
        source: &mut S,
        observer: &mut O,
    ) -> Vec<Record>
    where
        S: ListingSource,
        O: CrawlObserver + ?Sized,
    {
        let mut state = StreamState::new();
        let mut records = Vec::new();
        let mut pages = 0u32;

        while state.should_continue(self.page_limit) {
            let page_index = state.current_page_index;

            let url = match addressing.url_for(page_index) {
                Ok(url) => url,
                Err(e) => {
                    let error = PageError::InvalidUrl(e.to_string());
                    observer.on_page_skipped(stream_id, &format!("page {}", page_index), 0, &error);
                    break;
                }
            };

            let mut fetch = FetchListing {
                source: &mut *source,
                url: &url,
                page_index,
            };
            let max_retries = self.retry.max_retries;
            let outcome = self
                .retry
                .run(&mut fetch, |retry, error| {
                    observer.on_page_retry(stream_id, url.as_str(), retry, max_retries, error)
                })
                .await;
            pages += 1;

            match outcome {
                Ok(listing) => {
                    observer.on_page(stream_id, page_index, listing.records.len());
                    records.extend(listing.records);
                    state.page_loaded(listing.has_next);
                }
                Err(exhausted) => {
                    observer.on_page_skipped(
                        stream_id,
                        url.as_str(),
                        exhausted.attempts,
                        &exhausted.error,
                    );
                    state.page_skipped();
                }
            }

            if state.should_continue(self.page_limit) && !self.inter_page_delay.is_zero() {
                tokio::time::sleep(self.inter_page_delay).await;
            }
        }

        observer.on_stream_done(stream_id, pages, records.len());
        records
    }
}
