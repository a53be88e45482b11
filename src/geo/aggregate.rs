//! Geo Aggregator
//!
//! Fetches every source page, collects the coordinates it carries and encodes
//! them as a map query. Per source, geos embedded in reviews come before
//! standalone geos; sources keep the order they were given in.

use std::sync::Arc;

use futures::{StreamExt, TryStreamExt, stream};
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use super::coordinate::{GeoCoordinate, encode_map_query};
use crate::clients::PageSource;
use crate::microformats::{ItemKind, ItemTree, MicroformatItem, extract, parse_html};
use crate::utils::SyndicationResult;

/// Coordinates of a batch of pages plus their map query
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeoAggregate {
    pub coordinates: Vec<GeoCoordinate>,
    pub query: String,
}

impl GeoAggregate {
    pub fn new(coordinates: Vec<GeoCoordinate>) -> Self {
        let query = encode_map_query(&coordinates);
        Self { coordinates, query }
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }
}

/// Aggregates coordinates over many pages
///
/// Fetches run concurrently, bounded by `max_concurrent`, but results are
/// always assembled in source order.
#[derive(Clone)]
pub struct GeoAggregator {
    pages: Arc<dyn PageSource>,
    max_concurrent: usize,
}

impl GeoAggregator {
    pub fn new(pages: Arc<dyn PageSource>, max_concurrent: usize) -> Self {
        Self {
            pages,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Collect the coordinates of every source
    ///
    /// # Errors
    /// The first failed fetch aborts the whole batch with `UpstreamFetch`;
    /// no partial result is returned.
    pub async fn aggregate(&self, sources: &[String]) -> SyndicationResult<GeoAggregate> {
        info!("Aggregating coordinates over {} sources", sources.len());

        let pages: Vec<String> = stream::iter(sources.iter())
            .map(|source| {
                let pages = Arc::clone(&self.pages);
                async move {
                    pages.fetch(source).await.inspect_err(|e| {
                        warn!("Aborting aggregation, fetch of {} failed: {}", source, e);
                    })
                }
            })
            .buffered(self.max_concurrent)
            .try_collect()
            .await?;

        let coordinates: Vec<GeoCoordinate> = sources
            .iter()
            .zip(&pages)
            .flat_map(|(source, html)| {
                let base = Url::parse(source).ok();
                let tree = parse_html(html, base.as_ref());
                coordinates_in(&tree, base.as_ref(), source)
            })
            .collect();

        info!("Found {} coordinates", coordinates.len());
        Ok(GeoAggregate::new(coordinates))
    }
}

/// Coordinates of one parsed source: review-embedded first, then standalone
pub fn coordinates_in(tree: &ItemTree, base_url: Option<&Url>, source: &str) -> Vec<GeoCoordinate> {
    let reviews = extract(tree, &[ItemKind::Review], base_url);
    let nested = reviews.iter().flat_map(|review| review.embedded(&ItemKind::Geo));
    let standalone = tree.items.iter().filter(|item| item.is(&ItemKind::Geo));

    nested
        .chain(standalone)
        .filter_map(|item| to_coordinate(item, source))
        .collect()
}

fn to_coordinate(item: &MicroformatItem, source: &str) -> Option<GeoCoordinate> {
    match GeoCoordinate::from_item(item) {
        Ok(coordinate) => Some(coordinate.with_source(source)),
        Err(e) => {
            debug!("Skipping geo item on {}: {}", source, e);
            None
        }
    }
}
