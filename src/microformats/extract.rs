//! Extractor: find the items a pipeline cares about
//!
//! Reviews are sometimes published as the body of a generic post, so entry
//! content is re-parsed and any review found inside it ranks alongside the
//! top-level reviews. Geo items count both at top level and when embedded
//! directly in a review.

use url::Url;

use super::parser::parse_html;
use super::types::{ItemKind, ItemTree, MicroformatItem, PropertyValue};

/// Collect the items of the wanted kinds, in document order
///
/// Order rules, per top-level item:
/// - the item itself, if its kind is wanted
/// - for an entry: reviews parsed out of its `content` markup
/// - for a review: its embedded geo items, if geo is wanted
///
/// Items are cloned out of the tree and never deduplicated.
pub fn extract(tree: &ItemTree, wanted: &[ItemKind], base_url: Option<&Url>) -> Vec<MicroformatItem> {
    let wants = |kind: &ItemKind| wanted.contains(kind);
    let mut found = Vec::new();

    for item in &tree.items {
        if wants(&item.kind) {
            found.push(item.clone());
        }

        match item.kind {
            ItemKind::Entry if wants(&ItemKind::Review) => {
                for review in reviews_in_entry(item, base_url) {
                    if wants(&ItemKind::Geo) {
                        let geos: Vec<MicroformatItem> =
                            review.embedded(&ItemKind::Geo).into_iter().cloned().collect();
                        found.push(review);
                        found.extend(geos);
                    } else {
                        found.push(review);
                    }
                }
            }
            ItemKind::Review if wants(&ItemKind::Geo) => {
                found.extend(item.embedded(&ItemKind::Geo).into_iter().cloned());
            }
            _ => {}
        }
    }

    found
}

/// Reviews authored inside an entry's `content` markup
fn reviews_in_entry(entry: &MicroformatItem, base_url: Option<&Url>) -> Vec<MicroformatItem> {
    let Some(values) = entry.properties.get("content") else {
        return Vec::new();
    };

    values
        .iter()
        .filter_map(|value| match value {
            PropertyValue::Html { html, .. } => Some(html.as_str()),
            _ => None,
        })
        .flat_map(|html| parse_html(html, base_url).items)
        .filter(|item| item.is(&ItemKind::Review))
        .collect()
}

/// Every item of `kind` anywhere in the tree, depth-first in document order
///
/// Used when re-scanning a whole wiki page, where reviews sit inside an
/// `h-feed` wrapper rather than at top level.
pub fn descendants_of_kind<'a>(tree: &'a ItemTree, kind: &ItemKind) -> Vec<&'a MicroformatItem> {
    fn walk<'a>(item: &'a MicroformatItem, kind: &ItemKind, out: &mut Vec<&'a MicroformatItem>) {
        if item.is(kind) {
            out.push(item);
        }
        for child in &item.children {
            walk(child, kind, out);
        }
    }

    let mut out = Vec::new();
    for item in &tree.items {
        walk(item, kind, &mut out);
    }
    out
}

/// First geo location a source page carries
///
/// Looks at top-level geos and geos embedded in reviews or entries, which is
/// where personal sites put the location of the place they write about.
pub fn first_location(tree: &ItemTree) -> Option<&MicroformatItem> {
    tree.items.iter().find_map(|item| match item.kind {
        ItemKind::Geo => Some(item),
        ItemKind::Review | ItemKind::Entry => item.embedded(&ItemKind::Geo).into_iter().next(),
        _ => None,
    })
}
