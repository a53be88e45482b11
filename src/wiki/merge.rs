//! Page Merge Engine
//!
//! Merges one normalized review into a wiki page:
//! - no page, or no `== Reviews ==` section: append an optional infobox, a new
//!   reviews section with the review and a seeded aggregate, and location
//!   categories
//! - reviews section present: prepend the review inside the section, then
//!   re-scan the whole page and rewrite the aggregate block
//!
//! Categories added by a merge are reported back as [`PendingPublish`]
//! events; publishing the category map is the caller's job.

use serde::Serialize;
use tracing::{debug, warn};

use crate::clients::{Address, ReverseGeocoder};
use crate::geo::GeoCoordinate;
use crate::review::ReviewRecord;
use crate::utils::SyndicationResult;

use super::aggregate::AggregateRating;
use super::document::{SectionKind, WikiDocument};
use super::render;

/// Where a page stands before a merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MergeState {
    NoPage,
    PageNoReviewSection,
    /// Offset of the first byte after the reviews heading line
    PageWithReviewSection { offset: usize },
}

impl MergeState {
    pub fn of(document: &WikiDocument) -> Self {
        if document.is_empty() {
            return MergeState::NoPage;
        }
        match document.section(&SectionKind::Reviews) {
            Some(section) => MergeState::PageWithReviewSection {
                offset: section.content_start,
            },
            None => MergeState::PageNoReviewSection,
        }
    }

    /// Whether a merge from this state builds a new reviews section
    pub fn creates_section(&self) -> bool {
        !matches!(self, MergeState::PageWithReviewSection { .. })
    }
}

/// Resolved location of the reviewed place
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub coordinate: GeoCoordinate,
    pub address: Address,
}

impl Location {
    /// Categories a page about this place belongs to
    pub fn categories(&self) -> Vec<String> {
        [&self.address.city, &self.address.country]
            .into_iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// A category whose map page should be regenerated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingPublish {
    pub category: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MergeWarning {
    /// The review was spliced in but the displayed aggregate is stale
    AggregateBlockNotFound,
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub document: WikiDocument,
    /// State the page was in before the merge
    pub state: MergeState,
    /// Aggregate recomputed from the merged page
    pub aggregate: AggregateRating,
    pub pending_publishes: Vec<PendingPublish>,
    pub warnings: Vec<MergeWarning>,
}

/// Merge a review into a page
///
/// `location` is only consulted when a new reviews section is created.
pub fn merge_review(
    document: &WikiDocument,
    record: &ReviewRecord,
    location: Option<&Location>,
) -> MergeOutcome {
    let state = MergeState::of(document);
    debug!("Merging review of {} into {:?} page", record.name, state);

    let mut outcome = match state {
        MergeState::NoPage | MergeState::PageNoReviewSection => {
            create_review_section(document, record, location, state)
        }
        MergeState::PageWithReviewSection { offset } => {
            splice_into_review_section(document, record, offset, state)
        }
    };

    if let Some(photo) = &record.photo_url {
        outcome.document = add_photo(&outcome.document, photo);
    }

    outcome
}

/// Merge a review, resolving the page's location through `geocoder` first
///
/// The lookup only happens when a new reviews section will be created and a
/// coordinate is known.
///
/// # Errors
/// Returns `UpstreamFetch` when the reverse geocode call fails.
pub async fn merge_review_with_geocoder(
    document: &WikiDocument,
    record: &ReviewRecord,
    coordinate: Option<GeoCoordinate>,
    geocoder: &dyn ReverseGeocoder,
) -> SyndicationResult<MergeOutcome> {
    let location = match coordinate {
        Some(coordinate) if MergeState::of(document).creates_section() => {
            let address = geocoder
                .reverse_geocode(coordinate.latitude, coordinate.longitude)
                .await?;
            Some(Location { coordinate, address })
        }
        _ => None,
    };

    Ok(merge_review(document, record, location.as_ref()))
}

fn create_review_section(
    document: &WikiDocument,
    record: &ReviewRecord,
    location: Option<&Location>,
    state: MergeState,
) -> MergeOutcome {
    let aggregate = AggregateRating::from_ratings(&[record.rating]);

    let mut merged = document.clone();
    if let Some(location) = location {
        merged = merged.appended(&render::infobox(&location.coordinate, &location.address));
    }
    merged = merged.appended(&render::reviews_section(record, &aggregate));

    let mut pending_publishes = Vec::new();
    for category in location.map(Location::categories).unwrap_or_default() {
        if !merged.has_category(&category) {
            merged = merged.with_category(&category);
            pending_publishes.push(PendingPublish { category });
        }
    }

    MergeOutcome {
        document: merged,
        state,
        aggregate,
        pending_publishes,
        warnings: Vec::new(),
    }
}

fn splice_into_review_section(
    document: &WikiDocument,
    record: &ReviewRecord,
    offset: usize,
    state: MergeState,
) -> MergeOutcome {
    let spliced = document.inserted(offset, &format!("\n{}", render::review_block(record)));
    let aggregate = AggregateRating::rescan(&spliced);

    let mut warnings = Vec::new();
    let merged = match spliced.aggregate_block() {
        Some(range) => spliced.replaced(range, &render::aggregate_block(&record.name, &aggregate)),
        None => {
            warn!(
                "No aggregate block on page {}; review added, aggregate left stale",
                document.title()
            );
            warnings.push(MergeWarning::AggregateBlockNotFound);
            spliced
        }
    };

    MergeOutcome {
        document: merged,
        state,
        aggregate,
        pending_publishes: Vec::new(),
        warnings,
    }
}

/// Add a photo, opening the photos section on first use
fn add_photo(document: &WikiDocument, url: &str) -> WikiDocument {
    match document.section(&SectionKind::Photos) {
        Some(section) => {
            let prefix = if section.text.ends_with('\n') { "" } else { "\n" };
            document.inserted(
                section.span.end,
                &format!("{prefix}{}", render::photo_embed(url)),
            )
        }
        None => {
            let prefix = if document.body().ends_with('\n') { "" } else { "\n" };
            document.appended(&format!("{prefix}{}", render::photos_section(url)))
        }
    }
}
