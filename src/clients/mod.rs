//! Network collaborators
//!
//! The core only talks to the outside world through these traits, so every
//! pipeline can be driven by in-memory fakes in tests. All calls are
//! blocking from the caller's point of view; a failure aborts whatever
//! operation is in progress and is never retried here.

mod http;
mod mediawiki;
mod nominatim;

pub use http::HttpPageSource;
pub use mediawiki::MediaWikiClient;
pub use nominatim::NominatimGeocoder;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::utils::SyndicationResult;

/// Postal address of a coordinate
///
/// Any field may be blank; renderers show blanks rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub road: String,
    pub postcode: String,
    pub city: String,
    pub country: String,
}

/// Fetches raw documents (personal sites, wiki pages as HTML)
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> SyndicationResult<String>;
}

#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> SyndicationResult<Address>;
}

/// The wiki that stores every page this crate produces
#[async_trait]
pub trait WikiStore: Send + Sync {
    /// Current wikitext of a page, `None` when the page does not exist
    async fn fetch_page(&self, title: &str) -> SyndicationResult<Option<String>>;

    /// Create the page or overwrite its whole body
    async fn submit_edit(&self, title: &str, wikitext: &str, summary: &str) -> SyndicationResult<()>;

    /// Titles of the pages in `category` (name without the `Category:` prefix)
    async fn members_of(&self, category: &str) -> SyndicationResult<Vec<String>>;

    /// Names of every registered user
    async fn users(&self) -> SyndicationResult<Vec<String>>;
}
