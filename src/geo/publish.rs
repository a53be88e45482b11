//! Category Map Publisher
//!
//! Rebuilds a category page as a single map panel over the coordinates of
//! its member pages. The category page body is overwritten, not merged.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::aggregate::{GeoAggregate, GeoAggregator};
use crate::clients::WikiStore;
use crate::utils::SyndicationResult;
use crate::wiki::render;

/// A rendered category map page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMap {
    pub title: String,
    pub body: String,
    pub summary: String,
    pub aggregate: GeoAggregate,
}

#[derive(Clone)]
pub struct CategoryMapPublisher {
    wiki: Arc<dyn WikiStore>,
    aggregator: GeoAggregator,
    base_url: String,
    bot_name: String,
}

impl CategoryMapPublisher {
    pub fn new(
        wiki: Arc<dyn WikiStore>,
        aggregator: GeoAggregator,
        base_url: impl Into<String>,
        bot_name: impl Into<String>,
    ) -> Self {
        Self {
            wiki,
            aggregator,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bot_name: bot_name.into(),
        }
    }

    /// Canonical URL of a wiki page
    pub fn page_url(&self, title: &str) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(&title.replace(' ', "_")))
    }

    /// Build the map page for `category` without saving it
    pub async fn render(&self, category: &str) -> SyndicationResult<CategoryMap> {
        let members = self.wiki.members_of(category).await?;
        info!("Category {} has {} member pages", category, members.len());

        let sources: Vec<String> = members.iter().map(|title| self.page_url(title)).collect();
        let aggregate = self.aggregator.aggregate(&sources).await?;

        Ok(CategoryMap {
            title: format!("Category:{category}"),
            body: render::map_embed(&aggregate.query),
            summary: format!(
                "New page created by {} from {}",
                self.bot_name,
                self.page_url(category)
            ),
            aggregate,
        })
    }

    /// Build the map page for `category` and overwrite the category page with it
    ///
    /// # Errors
    /// Any failed member listing, page fetch or edit aborts the publish; the
    /// category page is then left as it was.
    pub async fn publish(&self, category: &str) -> SyndicationResult<CategoryMap> {
        let map = self.render(category).await?;
        self.wiki.submit_edit(&map.title, &map.body, &map.summary).await?;
        info!(
            "Published map for {} with {} coordinates",
            map.title,
            map.aggregate.coordinates.len()
        );
        Ok(map)
    }
}
