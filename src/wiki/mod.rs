//! Wiki pages: model, fragments and the merge engine
//!
//! - `document` - immutable page with computed sections and categories
//! - `render` - wikitext fragments
//! - `aggregate` - aggregate rating re-derived from a page
//! - `merge` - merge a review into a page
//! - `pages` - whole pages for posts and recipes

mod aggregate;
mod document;
mod merge;
mod pages;
pub mod render;

pub use aggregate::AggregateRating;
pub use document::{Section, SectionKind, WikiDocument};
pub use merge::{
    Location, MergeOutcome, MergeState, MergeWarning, PendingPublish, merge_review,
    merge_review_with_geocoder,
};
pub use pages::{entry_page, recipe_page};
