//! Configuration module for Shelf-Scraper
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so an empty file (or no file at all) is a valid
//! configuration that scrapes the first catalog page.
//!
//! # Example
//!
//! ```no_run
//! use shelf_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scraper.toml")).unwrap();
//! println!("Retries per page: {}", config.crawler.max_retries);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, HttpConfig, OutputConfig, OutputFormat, Target, DEFAULT_BASE_URL,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_genre_list};

pub use validation::{validate, MAX_PAGE_LIMIT, MAX_RETRIES};
