use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Catalog root used when no configuration overrides it
pub const DEFAULT_BASE_URL: &str = "https://books.toscrape.com/";

/// Main configuration structure for Shelf-Scraper
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Returns the directory images are downloaded into, if downloads are enabled
    ///
    /// The `images` target always downloads; the other targets only when
    /// `download-images` is set.
    pub fn image_root(&self) -> Option<PathBuf> {
        let enabled = self.crawler.download_images || self.crawler.target == Target::Images;
        enabled.then(|| PathBuf::from(&self.crawler.assets_dir))
    }
}

/// What a run scrapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// The flat catalog, page by page
    #[default]
    Books,
    /// One stream per genre
    Genre,
    /// The flat catalog with cover images downloaded
    Images,
}

impl Target {
    /// Name used for aggregate output files
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Books => "books",
            Self::Genre => "genre",
            Self::Images => "images",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "books" => Ok(Self::Books),
            "genre" => Ok(Self::Genre),
            "images" => Ok(Self::Images),
            other => Err(format!(
                "unknown target '{}', expected books, genre or images",
                other
            )),
        }
    }
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Root of the catalog site
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Which strategy to run
    pub target: Target,

    /// Maximum listing pages per stream (absent = until pagination ends)
    #[serde(rename = "page-limit")]
    pub page_limit: Option<u32>,

    /// Maximum number of genres to crawl, applied after filtering
    #[serde(rename = "genre-limit")]
    pub genre_limit: Option<usize>,

    /// Genre names to crawl, matched case-insensitively
    pub genres: Option<Vec<String>>,

    /// Delay between listing pages (milliseconds)
    #[serde(rename = "inter-page-delay")]
    pub inter_page_delay_ms: u64,

    /// Delay between retries of a failed page (milliseconds)
    #[serde(rename = "retry-backoff")]
    pub retry_backoff_ms: u64,

    /// Retries per page after the first attempt
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Download cover images for genre and book runs
    #[serde(rename = "download-images")]
    pub download_images: bool,

    /// Root directory for downloaded images
    #[serde(rename = "assets-dir")]
    pub assets_dir: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            target: Target::Books,
            page_limit: Some(1),
            genre_limit: None,
            genres: None,
            inter_page_delay_ms: 1000,
            retry_backoff_ms: 500,
            max_retries: 2,
            download_images: false,
            assets_dir: "assets".to_string(),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("shelf-scraper/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Output file format for aggregate results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown format '{}', expected json or csv", other)),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory result files are written to
    pub directory: String,

    /// Format of the aggregate result file
    pub format: OutputFormat,

    /// Also write one JSON file per genre during genre runs
    #[serde(rename = "per-genre-files")]
    pub per_genre_files: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "output".to_string(),
            format: OutputFormat::Json,
            per_genre_files: true,
        }
    }
}
