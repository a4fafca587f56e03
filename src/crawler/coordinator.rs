//! Crawler coordinator - top-level run orchestration
//!
//! The coordinator owns everything a run needs: the validated configuration,
//! the page it drives, the image acquirer, the observer, and the run stamp.
//! It picks the strategy for the configured target, runs it, and writes the
//! aggregate result file.

use crate::assets::ImageAcquirer;
use crate::config::{validate, Config, Target};
use crate::crawler::observer::CrawlObserver;
use crate::crawler::pagination::{PageAddressing, PageListingSource, PaginationController};
use crate::extract::Record;
use crate::output::{persist_results, RunStamp};
use crate::page::Page;
use crate::{ConfigError, ScrapeError};
use std::path::{Path, PathBuf};
use url::Url;

/// Stream id used for the flat catalog
pub const CATALOG_STREAM: &str = "catalog";

/// What a finished run produced
#[derive(Debug, Clone, Default)]
pub struct CrawlOutcome {
    /// Every record, in stream order
    pub records: Vec<Record>,

    /// The aggregate result file, if any records were found
    pub output_path: Option<PathBuf>,
}

/// Main crawler coordinator structure
pub struct Coordinator<P, O> {
    pub(super) config: Config,
    pub(super) base_url: Url,
    pub(super) page: P,
    pub(super) images: ImageAcquirer,
    pub(super) observer: O,
    pub(super) stamp: RunStamp,
    pub(super) controller: PaginationController,
}

impl<P: Page, O: CrawlObserver> Coordinator<P, O> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The run configuration; validated here
    /// * `page` - The page the crawl drives
    /// * `images` - Downloader for cover images
    /// * `observer` - Receives progress events
    /// * `stamp` - Names the run's output and asset directories
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(ScrapeError)` - The configuration is invalid
    pub fn new(
        config: Config,
        page: P,
        images: ImageAcquirer,
        observer: O,
        stamp: RunStamp,
    ) -> Result<Self, ScrapeError> {
        validate(&config)?;

        let base_url = Url::parse(&config.crawler.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", config.crawler.base_url, e)))?;
        let controller = PaginationController::new(&config.crawler);

        Ok(Self {
            config,
            base_url,
            page,
            images,
            observer,
            stamp,
            controller,
        })
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Runs the configured target to completion
    ///
    /// Page and image failures are absorbed and reported to the observer.
    /// Only configuration, genre directory, and persistence failures end the
    /// run with an error.
    pub async fn run(&mut self) -> Result<CrawlOutcome, ScrapeError> {
        let target = self.config.crawler.target;

        let records = match target {
            Target::Books | Target::Images => self.crawl_catalog().await,
            Target::Genre => self.crawl_genres().await?,
        };

        let output_path = persist_results(
            &records,
            Path::new(&self.config.output.directory),
            target.as_str(),
            self.config.output.format,
            &self.stamp,
        )?;

        match &output_path {
            Some(path) => self.observer.on_results_saved(path, records.len()),
            None => self.observer.on_nothing_to_save(target.as_str()),
        }

        Ok(CrawlOutcome {
            records,
            output_path,
        })
    }

    /// Walks the flat catalog as a single stream
    ///
    /// When images are enabled they are fetched after the stream ends, into
    /// one directory per page unless only the first page was requested.
    pub(super) async fn crawl_catalog(&mut self) -> Vec<Record> {
        let addressing = PageAddressing::Catalog {
            root: self.base_url.clone(),
        };
        let mut source = PageListingSource::catalog(&mut self.page, self.base_url.clone());
        let records = self
            .controller
            .run(CATALOG_STREAM, &addressing, &mut source, &mut self.observer)
            .await;

        if let Some(root) = self.config.image_root() {
            let per_page = self.config.crawler.page_limit != Some(1);
            for record in &records {
                let directory = match (per_page, record.page_index) {
                    (true, Some(index)) => root.join(format!("page-{}", index)),
                    _ => root.clone(),
                };
                self.acquire_image(record, &directory).await;
            }
        }

        records
    }

    /// Downloads a record's image into `directory`, reporting the outcome
    ///
    /// Records without an image are skipped silently.
    pub(super) async fn acquire_image(&mut self, record: &Record, directory: &Path) {
        if record.image.is_empty() {
            return;
        }

        match self
            .images
            .acquire(&record.image, directory, &record.title)
            .await
        {
            Ok(path) => self.observer.on_image_saved(&path),
            Err(e) => self.observer.on_image_failed(&record.image, &e),
        }
    }
}
