//! Coordinates across pages
//!
//! - `coordinate` - coordinate type and map query encoding
//! - `aggregate` - fetch pages and collect their coordinates
//! - `publish` - render and save category map pages

mod aggregate;
mod coordinate;
mod publish;

pub use aggregate::{GeoAggregate, GeoAggregator, coordinates_in};
pub use coordinate::{GeoCoordinate, decode_map_query, encode_map_query};
pub use publish::{CategoryMap, CategoryMapPublisher};
