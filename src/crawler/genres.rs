//! Genre orchestration
//!
//! A genre run reads the genre directory once, narrows it by the configured
//! filter and limit, then walks one pagination stream per genre in directory
//! order. Images and per-genre result files are written as each genre
//! finishes, so a later failure never loses an earlier genre's output.

use crate::crawler::coordinator::Coordinator;
use crate::crawler::observer::CrawlObserver;
use crate::crawler::pagination::{PageAddressing, PageListingSource};
use crate::crawler::retry::{Operation, RetryPolicy};
use crate::extract::Record;
use crate::genre::{discover_genres, resolve_genres, Genre};
use crate::output::persist_genre_results;
use crate::page::Page;
use crate::{PageError, ScrapeError};
use async_trait::async_trait;
use std::path::Path;
use url::Url;

/// Stream id used when reporting the genre directory fetch
const DIRECTORY_STREAM: &str = "genres";

/// Loading the genre directory, as a retryable operation
struct LoadDirectory<'a, P> {
    page: &'a mut P,
    base_url: &'a Url,
}

#[async_trait]
impl<'a, P: Page> Operation for LoadDirectory<'a, P> {
    type Output = Vec<Genre>;
    type Error = PageError;

    async fn attempt(&mut self) -> Result<Vec<Genre>, PageError> {
        self.page.navigate(self.base_url).await?;
        discover_genres(self.page, self.base_url).await
    }
}

impl<P: Page, O: CrawlObserver> Coordinator<P, O> {
    /// Fetches the genre directory and applies the filter and limit
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Genre>)` - Genres to crawl, in directory order
    /// * `Err(ScrapeError::Page)` - The directory could not be loaded
    /// * `Err(ScrapeError::Config)` - No requested genre exists
    pub(super) async fn select_genres(&mut self) -> Result<Vec<Genre>, ScrapeError> {
        let retry = RetryPolicy::from_config(&self.config.crawler);
        let base_url = self.base_url.clone();
        let observer = &mut self.observer;

        let mut load = LoadDirectory {
            page: &mut self.page,
            base_url: &base_url,
        };
        let outcome = retry
            .run(&mut load, |n, error| {
                observer.on_page_retry(
                    DIRECTORY_STREAM,
                    base_url.as_str(),
                    n,
                    retry.max_retries,
                    error,
                )
            })
            .await;

        let available = match outcome {
            Ok(genres) => genres,
            Err(exhausted) => {
                self.observer.on_page_skipped(
                    DIRECTORY_STREAM,
                    base_url.as_str(),
                    exhausted.attempts,
                    &exhausted.error,
                );
                return Err(exhausted.error.into());
            }
        };

        let mut selected = match &self.config.crawler.genres {
            Some(requested) => {
                let selection = resolve_genres(requested, &available)?;
                if !selection.unmatched.is_empty() {
                    self.observer.on_genres_unmatched(&selection.unmatched);
                }
                selection.genres
            }
            None => available.clone(),
        };

        if let Some(limit) = self.config.crawler.genre_limit {
            selected.truncate(limit);
        }

        self.observer.on_genres_selected(available.len(), &selected);
        Ok(selected)
    }

    /// Runs one pagination stream per selected genre
    ///
    /// Returns every genre's records concatenated in iteration order. Stream
    /// failures are absorbed per page; only directory, filter, and
    /// persistence failures are returned.
    pub(super) async fn crawl_genres(&mut self) -> Result<Vec<Record>, ScrapeError> {
        let genres = self.select_genres().await?;

        let image_run_dir = self.config.image_root().map(|root| self.stamp.run_dir(&root));
        let output_run_dir = self.stamp.run_dir(Path::new(&self.config.output.directory));
        let mut all_records = Vec::new();

        for genre in &genres {
            let addressing = PageAddressing::Genre {
                first_page: genre.listing_url.clone(),
            };
            let mut source =
                PageListingSource::genre(&mut self.page, self.base_url.clone(), &genre.name);
            let records = self
                .controller
                .run(&genre.name, &addressing, &mut source, &mut self.observer)
                .await;

            let genre_dir = genre.dir_name();

            if let Some(run_dir) = &image_run_dir {
                let destination = run_dir.join(&genre_dir);
                for record in &records {
                    self.acquire_image(record, &destination).await;
                }
            }

            if self.config.output.per_genre_files {
                if let Some(path) =
                    persist_genre_results(&records, &output_run_dir, &genre_dir, &self.stamp)?
                {
                    self.observer.on_results_saved(&path, records.len());
                }
            }

            self.observer.on_genre_done(&genre.name, records.len());
            all_records.extend(records);
        }

        Ok(all_records)
    }
}
