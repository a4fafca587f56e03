//! Image acquisition
//!
//! Downloads one image per call into a destination directory under a name
//! derived from the item's title. Existing files are never overwritten: a
//! colliding name gets a `(n)` suffix.

use reqwest::Client;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Extensions kept as-is; anything else is saved as [`DEFAULT_EXTENSION`]
pub const IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".webp", ".gif"];

/// Extension used when the URL does not carry a usable one
pub const DEFAULT_EXTENSION: &str = ".jpg";

/// Longest accepted extension, including the dot
const MAX_EXTENSION_LENGTH: usize = 5;

/// Longest file stem, for filesystems with tight name limits
pub const MAX_FILE_STEM_LENGTH: usize = 50;

/// Stem used when a title has no usable characters
const FALLBACK_STEM: &str = "image";

/// Errors that can occur while acquiring an image
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Invalid image URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Download of {url} failed with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Download of {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Downloads images with a shared HTTP client
#[derive(Debug, Clone)]
pub struct ImageAcquirer {
    client: Client,
}

impl ImageAcquirer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Downloads `url` into `destination`, naming the file after `display_name`
    ///
    /// The directory is created only after the server answers with a success
    /// status. The body is streamed into a `.part` file next to the final path
    /// and renamed once complete; on any error the partial file is removed.
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Path of the written file
    /// * `Err(AssetError)` - The URL was malformed, the server refused, or the write failed
    pub async fn acquire(
        &self,
        url: &str,
        destination: &Path,
        display_name: &str,
    ) -> Result<PathBuf, AssetError> {
        let parsed = parse_image_url(url)?;
        let extension = image_extension(&parsed);
        let stem = sanitize_file_stem(display_name);

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|source| AssetError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        fs::create_dir_all(destination)
            .await
            .map_err(|source| AssetError::Io {
                path: destination.to_path_buf(),
                source,
            })?;

        let target = next_free_path(destination, &stem, extension);
        let partial = partial_path(&target);
        if let Err(err) = stream_to_file(response, url, &partial).await {
            let _ = fs::remove_file(&partial).await;
            return Err(err);
        }

        if let Err(source) = fs::rename(&partial, &target).await {
            let _ = fs::remove_file(&partial).await;
            return Err(AssetError::Io {
                path: target,
                source,
            });
        }

        Ok(target)
    }
}

async fn stream_to_file(
    mut response: reqwest::Response,
    url: &str,
    path: &Path,
) -> Result<(), AssetError> {
    let io_error = |source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = fs::File::create(path).await.map_err(io_error)?;

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|source| AssetError::Http {
            url: url.to_string(),
            source,
        })?
    {
        file.write_all(&chunk).await.map_err(io_error)?;
    }

    file.flush().await.map_err(io_error)?;
    Ok(())
}

fn parse_image_url(url: &str) -> Result<Url, AssetError> {
    let parsed = Url::parse(url.trim()).map_err(|e| AssetError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(AssetError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", scheme),
        }),
    }
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    target.with_file_name(name)
}

/// Derives the file extension (with dot, lowercase) from the URL path
///
/// Falls back to [`DEFAULT_EXTENSION`] when the last path segment has no
/// suffix, the suffix is too long, or it is not a known image type.
pub fn image_extension(url: &Url) -> &'static str {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");

    let Some(dot) = segment.rfind('.') else {
        return DEFAULT_EXTENSION;
    };

    let extension = segment[dot..].to_ascii_lowercase();
    if extension.len() > MAX_EXTENSION_LENGTH {
        return DEFAULT_EXTENSION;
    }

    IMAGE_EXTENSIONS
        .iter()
        .find(|known| **known == extension)
        .copied()
        .unwrap_or(DEFAULT_EXTENSION)
}

/// Turns a display name into a filesystem-safe file stem
///
/// Keeps ASCII letters, digits, `-`, `_` and whitespace, collapses each
/// whitespace run into a single `_`, and truncates to [`MAX_FILE_STEM_LENGTH`].
pub fn sanitize_file_stem(display_name: &str) -> String {
    let kept: String = display_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_' || c.is_whitespace())
        .collect();

    let stem: String = kept
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .take(MAX_FILE_STEM_LENGTH)
        .collect();

    if stem.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        stem
    }
}

/// First of `stem.ext`, `stem(1).ext`, `stem(2).ext`, ... that does not exist yet
pub fn next_free_path(directory: &Path, stem: &str, extension: &str) -> PathBuf {
    let candidate = directory.join(format!("{}{}", stem, extension));
    if !candidate.exists() {
        return candidate;
    }

    let mut counter = 1u32;
    loop {
        let candidate = directory.join(format!("{}({}){}", stem, counter, extension));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}
