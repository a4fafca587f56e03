//! Genre discovery and filter resolution
//!
//! Genres are read once per run from the catalog's sidebar directory. A user
//! supplied filter is then resolved against the discovered names.

use crate::page::{Page, GENRE_DIRECTORY_MARKER, GENRE_LINKS};
use crate::{ConfigError, PageError};
use url::Url;

/// A catalog genre and the first page of its listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    pub name: String,
    pub listing_url: Url,
}

impl Genre {
    /// Filesystem form of the name: each whitespace run becomes `_`
    pub fn dir_name(&self) -> String {
        self.name.split_whitespace().collect::<Vec<_>>().join("_")
    }
}

/// Outcome of resolving a genre filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreSelection {
    /// Matching genres, in directory order
    pub genres: Vec<Genre>,

    /// Requested names that matched nothing
    pub unmatched: Vec<String>,
}

/// Reads the genre directory from the currently loaded page
///
/// The page must already have been navigated to a document that carries the
/// directory. Links are resolved against `base_url`; entries with an empty
/// name or an unresolvable href are skipped.
pub async fn discover_genres<P: Page>(
    page: &mut P,
    base_url: &Url,
) -> Result<Vec<Genre>, PageError> {
    page.wait_for_marker(GENRE_DIRECTORY_MARKER).await?;

    let links = page.extract(GENRE_LINKS, |link| {
        let name = link.text().collect::<String>().trim().to_string();
        let href = link.value().attr("href").map(str::to_string);
        (name, href)
    })?;

    let genres = links
        .into_iter()
        .filter_map(|(name, href)| {
            if name.is_empty() {
                return None;
            }
            let listing_url = base_url.join(href?.trim()).ok()?;
            Some(Genre { name, listing_url })
        })
        .collect();

    Ok(genres)
}

/// Resolves requested genre names against the available genres
///
/// Matching is case-insensitive and lenient: names that match nothing are
/// reported in [`GenreSelection::unmatched`] rather than rejected, as long as at
/// least one name matches. When none do, the whole filter is invalid.
///
/// # Example
///
/// ```
/// use shelf_scraper::genre::{resolve_genres, Genre};
/// use url::Url;
///
/// let travel = Genre {
///     name: "Travel".to_string(),
///     listing_url: Url::parse("https://books.example.com/travel_2/index.html").unwrap(),
/// };
///
/// let selection = resolve_genres(&["travel".to_string()], &[travel.clone()]).unwrap();
/// assert_eq!(selection.genres, vec![travel]);
/// ```
pub fn resolve_genres(
    requested: &[String],
    available: &[Genre],
) -> Result<GenreSelection, ConfigError> {
    let wanted: Vec<String> = requested
        .iter()
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    let genres: Vec<Genre> = available
        .iter()
        .filter(|genre| wanted.contains(&genre.name.to_lowercase()))
        .cloned()
        .collect();

    if genres.is_empty() {
        return Err(ConfigError::InvalidGenres {
            requested: requested.join(","),
        });
    }

    let unmatched = requested
        .iter()
        .filter(|name| {
            let name = name.trim().to_lowercase();
            !available.iter().any(|genre| genre.name.to_lowercase() == name)
        })
        .cloned()
        .collect();

    Ok(GenreSelection { genres, unmatched })
}
