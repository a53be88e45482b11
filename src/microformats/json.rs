//! mf2 JSON ingestion
//!
//! Standard microformats parsers emit JSON where every property is a list,
//! but hand-built payloads (webhooks, older parsers) often send a bare value
//! instead. Both shapes are accepted here and normalized into the same
//! [`ItemTree`] the HTML parser produces.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::types::{ItemKind, ItemTree, MicroformatItem, PropertyValue};
use crate::utils::{SyndicationError, SyndicationResult};

/// A value that may arrive alone or wrapped in a list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(values) => values,
            OneOrMany::One(value) => vec![value],
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    items: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(rename = "type")]
    types: OneOrMany<String>,
    #[serde(default)]
    properties: BTreeMap<String, OneOrMany<RawValue>>,
    #[serde(default)]
    children: Vec<RawItem>,
    #[serde(default)]
    value: Option<RawScalar>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Item(RawItem),
    Html {
        html: String,
        #[serde(default)]
        value: String,
    },
    Valued {
        value: RawScalar,
    },
    Scalar(RawScalar),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl RawScalar {
    fn into_string(self) -> String {
        match self {
            RawScalar::Text(text) => text,
            RawScalar::Number(number) => number.to_string(),
            RawScalar::Bool(flag) => flag.to_string(),
        }
    }
}

impl From<RawItem> for MicroformatItem {
    fn from(raw: RawItem) -> Self {
        let kind = raw
            .types
            .into_vec()
            .first()
            .map(|class| ItemKind::from_class(class))
            .unwrap_or_else(|| ItemKind::Other(String::new()));

        let properties = raw
            .properties
            .into_iter()
            .map(|(name, values)| {
                let values = values.into_vec().into_iter().map(PropertyValue::from).collect();
                (name, values)
            })
            .collect();

        MicroformatItem {
            kind,
            properties,
            children: raw.children.into_iter().map(MicroformatItem::from).collect(),
            value: raw.value.map(RawScalar::into_string),
        }
    }
}

impl From<RawValue> for PropertyValue {
    fn from(raw: RawValue) -> Self {
        match raw {
            RawValue::Item(item) => PropertyValue::Item(Box::new(item.into())),
            RawValue::Html { html, value } => PropertyValue::Html { html, text: value },
            RawValue::Valued { value } | RawValue::Scalar(value) => {
                PropertyValue::Text(value.into_string())
            }
        }
    }
}

/// Build an item tree from an mf2 JSON document (`{"items": [...]}`)
pub fn from_mf2_json(document: &serde_json::Value) -> SyndicationResult<ItemTree> {
    let raw = RawDocument::deserialize(document).map_err(|e| {
        SyndicationError::InvalidResponse(format!("not an mf2 document: {e}"))
    })?;
    Ok(ItemTree::new(raw.items.into_iter().map(MicroformatItem::from).collect()))
}

/// Build a single item from one mf2 JSON item object
pub fn item_from_mf2_json(item: &serde_json::Value) -> SyndicationResult<MicroformatItem> {
    let raw = RawItem::deserialize(item)
        .map_err(|e| SyndicationError::InvalidResponse(format!("not an mf2 item: {e}")))?;
    Ok(raw.into())
}
