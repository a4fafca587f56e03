//! Shelf-Scraper: a sequential book catalog scraper
//!
//! This crate walks the paginated listings of a book catalog, either as one flat
//! stream or one stream per genre, turns every listed item into a [`Record`],
//! optionally downloads cover images, and persists the results as JSON or CSV.

pub mod assets;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod genre;
pub mod output;
pub mod page;

use thiserror::Error;

/// Main error type for Shelf-Scraper operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Page error: {0}")]
    Page(#[from] PageError),

    #[error("Persistence error: {0}")]
    Persist(#[from] output::PersistError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid genres: no catalog genre matches \"{requested}\"")]
    InvalidGenres { requested: String },
}

/// Errors raised while loading or inspecting a listing page
///
/// Every variant is transient from the crawler's point of view: the pagination
/// controller retries it and eventually skips the page.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Navigation to {url} failed: {source}")]
    Navigation { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Marker '{selector}' not found on {url}")]
    MarkerTimeout { url: String, selector: String },

    #[error("No page has been loaded")]
    NotLoaded,

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Invalid page URL: {0}")]
    InvalidUrl(String),
}

// Re-export commonly used types
pub use config::Config;
pub use extract::Record;
pub use genre::Genre;
pub use page::{HttpPage, Page};
