use serde::{Deserialize, Serialize};
use url::Url;

/// Raw fields captured from one listing item, before normalization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    pub title: Option<String>,
    pub price: Option<String>,
    pub availability: Option<String>,
    pub image: Option<String>,
}

impl From<&Record> for RawItem {
    fn from(record: &Record) -> Self {
        Self {
            title: Some(record.title.clone()),
            price: Some(record.price.clone()),
            availability: Some(record.availability.clone()),
            image: Some(record.image.clone()),
        }
    }
}

/// Contextual tags merged into every record of a stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemTags {
    pub genre: Option<String>,
    pub page_index: Option<u32>,
}

impl ItemTags {
    pub fn genre(name: impl Into<String>) -> Self {
        Self {
            genre: Some(name.into()),
            page_index: None,
        }
    }

    pub fn page(index: u32) -> Self {
        Self {
            genre: None,
            page_index: Some(index),
        }
    }
}

/// One scraped catalog item
///
/// Textual fields are never absent: a field missing from the page is an empty
/// string. Tags that do not apply to the run are omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub title: String,
    pub price: String,
    pub availability: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(
        rename = "pageIndex",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub page_index: Option<u32>,
}

impl Record {
    /// Field names and values in output order, tags only when present
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("title", self.title.clone()),
            ("price", self.price.clone()),
            ("availability", self.availability.clone()),
            ("image", self.image.clone()),
        ];
        if let Some(genre) = &self.genre {
            fields.push(("genre", genre.clone()));
        }
        if let Some(index) = self.page_index {
            fields.push(("pageIndex", index.to_string()));
        }
        fields
    }
}

/// Normalizes raw item fields into a [`Record`]
///
/// Every field is trimmed and defaults to the empty string. A non-empty image
/// path is resolved against `base_url`; `../` segments stop at the site root and
/// absolute URLs pass through unchanged, so normalizing a record's own fields
/// again yields the same record.
///
/// # Example
///
/// ```
/// use shelf_scraper::extract::{normalize_record, ItemTags, RawItem};
/// use url::Url;
///
/// let base = Url::parse("https://books.toscrape.com/").unwrap();
/// let raw = RawItem {
///     title: Some(" Sapiens ".to_string()),
///     image: Some("../../media/cache/1e/10/1e10.jpg".to_string()),
///     ..RawItem::default()
/// };
///
/// let record = normalize_record(raw, &base, &ItemTags::page(2));
/// assert_eq!(record.title, "Sapiens");
/// assert_eq!(record.image, "https://books.toscrape.com/media/cache/1e/10/1e10.jpg");
/// assert_eq!(record.price, "");
/// assert_eq!(record.page_index, Some(2));
/// ```
pub fn normalize_record(raw: RawItem, base_url: &Url, tags: &ItemTags) -> Record {
    Record {
        title: clean(raw.title),
        price: clean(raw.price),
        availability: clean(raw.availability),
        image: resolve_image(clean(raw.image), base_url),
        genre: tags.genre.clone(),
        page_index: tags.page_index,
    }
}

fn clean(field: Option<String>) -> String {
    field.map(|value| value.trim().to_string()).unwrap_or_default()
}

fn resolve_image(path: String, base_url: &Url) -> String {
    if path.is_empty() {
        return path;
    }
    match base_url.join(&path) {
        Ok(url) => url.to_string(),
        Err(_) => path,
    }
}
