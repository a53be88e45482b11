//! End-to-end handling of one submitted URL
//!
//! 1. fetch and parse the source page
//! 2. optionally check the author against the wiki's users
//! 3. normalize every review before touching the wiki
//! 4. merge each review into its page and save it
//! 5. save recipe pages, or an entry page when nothing else matched
//!
//! Category map publishing triggered by new categories is returned as
//! pending work; [`Syndicator::publish_pending`] runs it.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use url::Url;

use crate::clients::{PageSource, ReverseGeocoder, WikiStore};
use crate::geo::{CategoryMap, CategoryMapPublisher, GeoCoordinate};
use crate::microformats::{ItemKind, ItemTree, extract, first_location, from_mf2_json, parse_html};
use crate::review::{ReviewRecord, normalize};
use crate::utils::{SyndicationError, SyndicationResult};
use crate::wiki::{
    AggregateRating, MergeWarning, PendingPublish, WikiDocument, entry_page,
    merge_review_with_geocoder, recipe_page,
};

/// Item tree of a fetched source, which is either HTML or an mf2 JSON document
fn parse_source(body: &str, source_url: &Url) -> SyndicationResult<ItemTree> {
    if body.trim_start().starts_with('{') {
        let document: serde_json::Value = serde_json::from_str(body)?;
        return from_mf2_json(&document);
    }
    Ok(parse_html(body, Some(source_url)))
}

/// A page body ready to be submitted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageEdit {
    pub title: String,
    pub body: String,
    pub summary: String,
}

/// What one syndication produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyndicationReport {
    /// Final body of each touched page, one edit per title
    pub edits: Vec<PageEdit>,
    /// Aggregate of each review page, by title
    pub aggregates: Vec<(String, AggregateRating)>,
    /// Categories whose map pages need regenerating, without duplicates
    pub pending_publishes: Vec<PendingPublish>,
    pub warnings: Vec<MergeWarning>,
}

#[derive(Debug, Clone)]
pub struct SyndicatorOptions {
    pub bot_name: String,
    pub require_authorized_author: bool,
    /// Produce edits without submitting them
    pub dry_run: bool,
}

pub struct Syndicator {
    pages: Arc<dyn PageSource>,
    geocoder: Arc<dyn ReverseGeocoder>,
    wiki: Arc<dyn WikiStore>,
    publisher: CategoryMapPublisher,
    options: SyndicatorOptions,
}

impl Syndicator {
    pub fn new(
        pages: Arc<dyn PageSource>,
        geocoder: Arc<dyn ReverseGeocoder>,
        wiki: Arc<dyn WikiStore>,
        publisher: CategoryMapPublisher,
        options: SyndicatorOptions,
    ) -> Self {
        Self {
            pages,
            geocoder,
            wiki,
            publisher,
            options,
        }
    }

    fn summary(&self, source: &str) -> String {
        format!("New page created by {} from {}", self.options.bot_name, source)
    }

    async fn save(&self, document: WikiDocument, source: &str) -> SyndicationResult<PageEdit> {
        let edit = PageEdit {
            title: document.title().to_string(),
            summary: self.summary(source),
            body: document.into_body(),
        };
        if self.options.dry_run {
            info!("Dry run, not saving {}", edit.title);
        } else {
            self.wiki.submit_edit(&edit.title, &edit.body, &edit.summary).await?;
        }
        Ok(edit)
    }

    async fn check_author(&self, domain: &str) -> SyndicationResult<()> {
        let users = self.wiki.users().await?;
        let domain = domain.to_lowercase();
        if users.iter().any(|user| user.to_lowercase() == domain) {
            Ok(())
        } else {
            Err(SyndicationError::UnauthorizedAuthor(domain))
        }
    }

    /// Turn the microformats on `url` into wiki edits
    ///
    /// # Errors
    /// - `UpstreamFetch` when the source, the wiki or the geocoder fails
    /// - `MissingRequiredField` when any review has no name; nothing is saved
    /// - `NoMatchingItem` when the page has no review, recipe or entry
    /// - `UnauthorizedAuthor` when author checking is on and fails
    pub async fn syndicate(&self, url: &str) -> SyndicationResult<SyndicationReport> {
        let source_url = Url::parse(url)?;
        let body = self.pages.fetch(url).await?;
        let tree = parse_source(&body, &source_url)?;

        let domain = source_url.host_str().unwrap_or_default().to_string();
        if self.options.require_authorized_author {
            self.check_author(&domain).await?;
        }

        let items = extract(
            &tree,
            &[ItemKind::Entry, ItemKind::Review, ItemKind::Recipe],
            Some(&source_url),
        );

        let records: Vec<ReviewRecord> = items
            .iter()
            .filter(|item| item.is(&ItemKind::Review))
            .map(|item| normalize(item, &source_url))
            .collect::<SyndicationResult<_>>()?;

        let coordinate = first_location(&tree).and_then(|geo| match GeoCoordinate::from_item(geo) {
            Ok(coordinate) => Some(coordinate.with_source(url)),
            Err(e) => {
                warn!("Ignoring location on {}: {}", url, e);
                None
            }
        });

        let mut report = SyndicationReport::default();

        for record in &records {
            let title = record.page_title();
            // a page already merged in this run is the base for the next review of it
            let document = match report.edits.iter().position(|edit| edit.title == title) {
                Some(index) => {
                    let earlier = report.edits.remove(index);
                    WikiDocument::new(title.clone(), earlier.body)
                }
                None => {
                    let existing = self.wiki.fetch_page(&title).await?.unwrap_or_default();
                    WikiDocument::new(title.clone(), existing)
                }
            };

            let outcome = merge_review_with_geocoder(
                &document,
                record,
                coordinate.clone(),
                self.geocoder.as_ref(),
            )
            .await?;

            report.aggregates.retain(|(earlier, _)| *earlier != title);
            report.aggregates.push((title, outcome.aggregate));
            report.warnings.extend(outcome.warnings);
            for pending in outcome.pending_publishes {
                if !report.pending_publishes.contains(&pending) {
                    report.pending_publishes.push(pending);
                }
            }
            report.edits.push(self.save(outcome.document, url).await?);
        }

        for recipe in items.iter().filter(|item| item.is(&ItemKind::Recipe)) {
            let page = recipe_page(recipe, &domain, chrono::Local::now().date_naive())?;
            report.edits.push(self.save(page, url).await?);
        }

        if report.edits.is_empty() {
            let entry = items
                .iter()
                .find(|item| item.is(&ItemKind::Entry))
                .ok_or_else(|| {
                    SyndicationError::NoMatchingItem(format!("no h-review, h-recipe or h-entry on {url}"))
                })?;
            report.edits.push(self.save(entry_page(entry, url)?, url).await?);
        }

        info!(
            "Syndicated {}: {} edits, {} pending category maps",
            url,
            report.edits.len(),
            report.pending_publishes.len()
        );
        Ok(report)
    }

    /// Publish the category maps a syndication asked for, one at a time
    pub async fn publish_pending(&self, pending: &[PendingPublish]) -> SyndicationResult<Vec<CategoryMap>> {
        let mut maps = Vec::with_capacity(pending.len());
        for publish in pending {
            let map = if self.options.dry_run {
                self.publisher.render(&publish.category).await?
            } else {
                self.publisher.publish(&publish.category).await?
            };
            maps.push(map);
        }
        Ok(maps)
    }
}
