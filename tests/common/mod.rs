#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use coffeebot::clients::{Address, PageSource, ReverseGeocoder, WikiStore};
use coffeebot::geo::{CategoryMapPublisher, GeoAggregator};
use coffeebot::{SyndicationError, SyndicationResult, Syndicator, SyndicatorOptions};

pub const BASE_URL: &str = "https://wiki.example";

/// Pages served from memory; listed URLs fail like a dead host
#[derive(Default)]
pub struct FakePages {
    pages: HashMap<String, String>,
    failing: Vec<String>,
    pub fetches: Mutex<Vec<String>>,
}

impl FakePages {
    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn with_failure(mut self, url: &str) -> Self {
        self.failing.push(url.to_string());
        self
    }
}

#[async_trait]
impl PageSource for FakePages {
    async fn fetch(&self, url: &str) -> SyndicationResult<String> {
        self.fetches.lock().unwrap().push(url.to_string());
        if self.failing.iter().any(|failing| failing == url) {
            return Err(SyndicationError::UpstreamFetch(format!("connection refused: {url}")));
        }
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| SyndicationError::UpstreamFetch(format!("HTTP 404 Not Found for {url}")))
    }
}

pub struct FakeGeocoder {
    pub address: Address,
    pub calls: AtomicUsize,
}

impl FakeGeocoder {
    pub fn leeds() -> Self {
        Self {
            address: Address {
                road: "Briggate".into(),
                postcode: "LS1 6HD".into(),
                city: "Leeds".into(),
                country: "United Kingdom".into(),
            },
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReverseGeocoder for FakeGeocoder {
    async fn reverse_geocode(&self, _latitude: f64, _longitude: f64) -> SyndicationResult<Address> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.address.clone())
    }
}

/// In-memory wiki recording every edit
#[derive(Default)]
pub struct FakeWiki {
    pub pages: Mutex<HashMap<String, String>>,
    pub edits: Mutex<Vec<(String, String, String)>>,
    pub categories: HashMap<String, Vec<String>>,
    pub users: Vec<String>,
}

impl FakeWiki {
    pub fn page(&self, title: &str) -> Option<String> {
        self.pages.lock().unwrap().get(title).cloned()
    }

    pub fn edit_count(&self) -> usize {
        self.edits.lock().unwrap().len()
    }
}

#[async_trait]
impl WikiStore for FakeWiki {
    async fn fetch_page(&self, title: &str) -> SyndicationResult<Option<String>> {
        Ok(self.page(title))
    }

    async fn submit_edit(&self, title: &str, wikitext: &str, summary: &str) -> SyndicationResult<()> {
        self.pages
            .lock()
            .unwrap()
            .insert(title.to_string(), wikitext.to_string());
        self.edits
            .lock()
            .unwrap()
            .push((title.to_string(), wikitext.to_string(), summary.to_string()));
        Ok(())
    }

    async fn members_of(&self, category: &str) -> SyndicationResult<Vec<String>> {
        Ok(self.categories.get(category).cloned().unwrap_or_default())
    }

    async fn users(&self) -> SyndicationResult<Vec<String>> {
        Ok(self.users.clone())
    }
}

pub struct Harness {
    pub pages: Arc<FakePages>,
    pub geocoder: Arc<FakeGeocoder>,
    pub wiki: Arc<FakeWiki>,
    pub syndicator: Syndicator,
}

pub fn harness(pages: FakePages, wiki: FakeWiki, require_authorized_author: bool) -> Harness {
    harness_with(
        pages,
        wiki,
        SyndicatorOptions {
            bot_name: "coffeebot".into(),
            require_authorized_author,
            dry_run: false,
        },
    )
}

pub fn harness_with(pages: FakePages, wiki: FakeWiki, options: SyndicatorOptions) -> Harness {
    let pages = Arc::new(pages);
    let geocoder = Arc::new(FakeGeocoder::leeds());
    let wiki = Arc::new(wiki);

    let publisher = CategoryMapPublisher::new(
        wiki.clone(),
        GeoAggregator::new(pages.clone(), 2),
        BASE_URL,
        "coffeebot",
    );
    let syndicator = Syndicator::new(
        pages.clone(),
        geocoder.clone(),
        wiki.clone(),
        publisher,
        options,
    );

    Harness {
        pages,
        geocoder,
        wiki,
        syndicator,
    }
}

/// A personal site page with one located review
pub fn review_page(name: &str, rating: &str, content: &str) -> String {
    format!(
        r#"<html><body>
        <article class="h-review">
          <h1 class="p-name">{name}</h1>
          <data class="p-rating" value="{rating}">{rating}/5</data>
          <div class="e-content"><p>{content}</p></div>
          <div class="p-location h-geo">
            <data class="p-latitude" value="53.8"></data>
            <data class="p-longitude" value="-1.5"></data>
          </div>
        </article>
        </body></html>"#
    )
}
