//! Microformat item trees
//!
//! - `types` - item, kind and property value model
//! - `parser` - HTML to item tree
//! - `json` - mf2 JSON to item tree
//! - `extract` - pick the items a pipeline needs out of a tree

mod extract;
mod json;
mod parser;
mod types;

pub use extract::{descendants_of_kind, extract, first_location};
pub use json::{from_mf2_json, item_from_mf2_json};
pub use parser::parse_html;
pub use types::{ItemKind, ItemTree, MicroformatItem, PropertyValue};
