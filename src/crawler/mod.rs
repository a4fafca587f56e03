//! Crawler module for listing traversal and run orchestration
//!
//! This module contains the core crawling logic, including:
//! - Page-by-page traversal of one listing stream with bounded retries
//! - Genre directory selection and one stream per genre
//! - Progress reporting through [`CrawlObserver`]
//! - Overall run coordination and result persistence

mod coordinator;
mod genres;
pub mod observer;
pub mod pagination;
pub mod retry;

pub use coordinator::{Coordinator, CrawlOutcome, CATALOG_STREAM};
pub use observer::{CrawlObserver, NoopObserver, TracingObserver};
pub use pagination::{
    ListingPage, ListingSource, PageAddressing, PageListingSource, PaginationController,
    StreamState,
};
pub use retry::{Exhausted, Operation, RetryPolicy};
