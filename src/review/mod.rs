//! Content Normalizer
//!
//! Turns one matched review (or review-shaped entry) into a [`ReviewRecord`]
//! with canonical scalar fields. Only `name` is mandatory because it becomes
//! the wiki page title.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use serde::Serialize;
use url::Url;

use crate::microformats::{MicroformatItem, PropertyValue};
use crate::utils::{SyndicationError, SyndicationResult};

static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\r\n]+").expect("static regex"));

/// Canonical fields of one review, ready to render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewRecord {
    pub name: String,
    /// `None` when the source carried no usable rating
    pub rating: Option<f64>,
    pub content_text: String,
    /// Spaces already percent-escaped
    pub photo_url: Option<String>,
    pub author_domain: String,
    /// Where the review lives, linked from the rendered block
    pub url: String,
}

impl ReviewRecord {
    /// Wiki title for the reviewed place
    pub fn page_title(&self) -> String {
        page_title(&self.name)
    }
}

/// Parse a rating as written in markup
///
/// Only finite numbers count; `NaN` or `inf` would otherwise be rendered back
/// into the page and poison every later average.
pub fn parse_rating(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|rating| rating.is_finite())
}

/// Wiki title derived from an item name: `"Joe's - Leeds"` => `"Joe's_Leeds"`
pub fn page_title(name: &str) -> String {
    name.replace(" - ", " ").replace(' ', "_")
}

/// Normalize a review item found on `source_url`
///
/// # Errors
/// Returns `MissingRequiredField` when the item has no name.
pub fn normalize(item: &MicroformatItem, source_url: &Url) -> SyndicationResult<ReviewRecord> {
    let name = item
        .first_text("name")
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| SyndicationError::MissingRequiredField("name".to_string()))?
        .to_string();

    let rating = item.first_text("rating").and_then(parse_rating);

    let photo_url = item
        .first_text("photo")
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(|url| url.replace(' ', "%20"));

    let url = item
        .first_text("url")
        .map(str::to_string)
        .unwrap_or_else(|| source_url.to_string());

    Ok(ReviewRecord {
        name,
        rating,
        content_text: content_text(item),
        photo_url,
        author_domain: source_url.host_str().unwrap_or_default().to_string(),
        url,
    })
}

/// Visible text of the review body
///
/// Prefers `content` reduced to text, then `description`, then nothing.
fn content_text(item: &MicroformatItem) -> String {
    let raw = match item.first("content") {
        Some(PropertyValue::Html { html, .. }) => strip_tags(html),
        Some(other) => other.as_text().unwrap_or_default().to_string(),
        None => item.first_text("description").unwrap_or_default().to_string(),
    };
    LINE_BREAKS.replace_all(raw.trim(), " ").into_owned()
}

fn strip_tags(html: &str) -> String {
    Html::parse_fragment(html).root_element().text().collect()
}
