use chrono::Local;
use std::path::{Path, PathBuf};

/// Timestamp and label shared by every file and directory a run creates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStamp {
    timestamp: String,
    selected_genres: bool,
}

impl RunStamp {
    /// Stamps a run starting now, in local time
    ///
    /// `selected_genres` is true when the run was restricted by a genre filter.
    pub fn now(selected_genres: bool) -> Self {
        Self::new(
            Local::now().format("%Y-%m-%d_%H-%M-%S").to_string(),
            selected_genres,
        )
    }

    pub fn new(timestamp: impl Into<String>, selected_genres: bool) -> Self {
        Self {
            timestamp: timestamp.into(),
            selected_genres,
        }
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn label(&self) -> &'static str {
        if self.selected_genres {
            "selectedGenres"
        } else {
            "allGenres"
        }
    }

    /// `<root>/<label>-<timestamp>`
    pub fn run_dir(&self, root: &Path) -> PathBuf {
        root.join(format!("{}-{}", self.label(), self.timestamp))
    }
}
