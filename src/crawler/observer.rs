//! Progress hooks for the crawl core
//!
//! The core never logs progress itself. It reports to a [`CrawlObserver`] at
//! fixed points, and the observer decides what to do with it.
//! [`TracingObserver`] logs every event and keeps run statistics.

use crate::assets::AssetError;
use crate::genre::Genre;
use crate::output::CrawlStatistics;
use crate::PageError;
use std::path::Path;

/// Receives crawl progress events
///
/// All methods default to doing nothing. Calls are made synchronously from
/// the single crawl task, in the order the events happen.
pub trait CrawlObserver {
    /// A listing page was loaded and yielded `records` records
    fn on_page(&mut self, _stream: &str, _page_index: u32, _records: usize) {}

    /// A page load failed and will be retried
    fn on_page_retry(
        &mut self,
        _stream: &str,
        _url: &str,
        _retry: u32,
        _max_retries: u32,
        _error: &PageError,
    ) {
    }

    /// A page failed every attempt and was skipped
    fn on_page_skipped(&mut self, _stream: &str, _url: &str, _attempts: u32, _error: &PageError) {}

    /// A pagination stream ended
    fn on_stream_done(&mut self, _stream: &str, _pages: u32, _records: usize) {}

    /// The genre directory was read and filtered down to `selected`
    fn on_genres_selected(&mut self, _available: usize, _selected: &[Genre]) {}

    /// Requested genre names that matched no catalog genre
    fn on_genres_unmatched(&mut self, _names: &[String]) {}

    /// A genre's stream, downloads and per-genre file are done
    fn on_genre_done(&mut self, _genre: &str, _records: usize) {}

    fn on_image_saved(&mut self, _path: &Path) {}

    fn on_image_failed(&mut self, _url: &str, _error: &AssetError) {}

    /// A result file was written
    fn on_results_saved(&mut self, _path: &Path, _records: usize) {}

    /// A result set was empty, so no file was written
    fn on_nothing_to_save(&mut self, _what: &str) {}
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl CrawlObserver for NoopObserver {}

/// Logs events through `tracing` and counts them
#[derive(Debug, Default)]
pub struct TracingObserver {
    stats: CrawlStatistics,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statistics(&self) -> &CrawlStatistics {
        &self.stats
    }
}

impl CrawlObserver for TracingObserver {
    fn on_page(&mut self, stream: &str, page_index: u32, records: usize) {
        self.stats.pages_scraped += 1;
        tracing::info!("Scraped {} page {} ({} items)", stream, page_index, records);
    }

    fn on_page_retry(
        &mut self,
        stream: &str,
        url: &str,
        retry: u32,
        max_retries: u32,
        error: &PageError,
    ) {
        self.stats.page_retries += 1;
        tracing::warn!(
            "[{}] Retry {}/{} failed on {}: {}",
            stream,
            retry,
            max_retries,
            url,
            error
        );
    }

    fn on_page_skipped(&mut self, stream: &str, url: &str, attempts: u32, error: &PageError) {
        self.stats.pages_skipped += 1;
        tracing::warn!(
            "[{}] Skipping {} after {} attempts: {}",
            stream,
            url,
            attempts,
            error
        );
    }

    fn on_stream_done(&mut self, stream: &str, pages: u32, records: usize) {
        self.stats.streams += 1;
        self.stats.records += records as u64;
        tracing::debug!(
            "Stream {} finished after {} pages with {} records",
            stream,
            pages,
            records
        );
    }

    fn on_genres_selected(&mut self, available: usize, selected: &[Genre]) {
        tracing::info!(
            "Found {} genres, scraping {}",
            available,
            selected.len()
        );
        for genre in selected {
            tracing::debug!("  - {} ({})", genre.name, genre.listing_url);
        }
    }

    fn on_genres_unmatched(&mut self, names: &[String]) {
        tracing::warn!("Ignoring unknown genres: {}", names.join(", "));
    }

    fn on_genre_done(&mut self, genre: &str, records: usize) {
        self.stats.genres_processed += 1;
        tracing::info!("Scraped {} books from genre \"{}\"", records, genre);
    }

    fn on_image_saved(&mut self, path: &Path) {
        self.stats.images_saved += 1;
        tracing::debug!("Downloaded: {}", path.display());
    }

    fn on_image_failed(&mut self, url: &str, error: &AssetError) {
        self.stats.images_failed += 1;
        tracing::error!("Image {} skipped: {}", url, error);
    }

    fn on_results_saved(&mut self, path: &Path, records: usize) {
        self.stats.files_written += 1;
        tracing::info!("Saved {} items to {}", records, path.display());
    }

    fn on_nothing_to_save(&mut self, what: &str) {
        tracing::warn!("No data to save for {}", what);
    }
}
