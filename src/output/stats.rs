//! Run statistics
//!
//! This module provides the counters a run accumulates through its observer
//! and the summary printed at the end of a run.

/// Counters for one scraper run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Listing pages loaded and extracted
    pub pages_scraped: u64,

    /// Retries of failed page loads
    pub page_retries: u64,

    /// Pages given up on after exhausting their retries
    pub pages_skipped: u64,

    /// Pagination streams completed
    pub streams: u64,

    /// Genres fully processed
    pub genres_processed: u64,

    /// Records collected across all streams
    pub records: u64,

    /// Images written to disk
    pub images_saved: u64,

    /// Images that could not be acquired
    pub images_failed: u64,

    /// Result files written
    pub files_written: u64,
}

impl CrawlStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of attempted pages that were scraped, as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempted = self.pages_scraped + self.pages_skipped;
        if attempted == 0 {
            return 0.0;
        }
        (self.pages_scraped as f64 / attempted as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Scrape Statistics ===\n");

    println!("Pages:");
    println!("  Scraped: {}", stats.pages_scraped);
    println!("  Skipped: {}", stats.pages_skipped);
    println!("  Retries: {}", stats.page_retries);
    println!();

    println!("Streams: {}", stats.streams);
    if stats.genres_processed > 0 {
        println!("Genres: {}", stats.genres_processed);
    }
    println!("Records: {}", stats.records);
    println!();

    if stats.images_saved > 0 || stats.images_failed > 0 {
        println!("Images:");
        println!("  Saved: {}", stats.images_saved);
        println!("  Failed: {}", stats.images_failed);
        println!();
    }

    println!("Files written: {}", stats.files_written);
    println!(
        "Success Rate: {:.1}% ({} / {} pages scraped)",
        stats.success_rate(),
        stats.pages_scraped,
        stats.pages_scraped + stats.pages_skipped
    );
}
