//! Item tree types
//!
//! A parsed page is a list of top-level [`MicroformatItem`]s. Each item has a
//! kind, a property map and nested children. Property values are modelled as
//! an explicit tagged [`PropertyValue`] so that callers never have to sniff
//! the shape of a value at the call site.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Microformat vocabulary tag of an item (`h-review` => `Review`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ItemKind {
    Entry,
    Review,
    ReviewAggregate,
    Geo,
    Card,
    Recipe,
    Feed,
    Other(String),
}

impl ItemKind {
    /// Map a root class name such as `h-review` to its kind
    pub fn from_class(class: &str) -> Self {
        match class.strip_prefix("h-").unwrap_or(class) {
            "entry" => ItemKind::Entry,
            "review" => ItemKind::Review,
            "review-aggregate" => ItemKind::ReviewAggregate,
            "geo" => ItemKind::Geo,
            "card" => ItemKind::Card,
            "recipe" => ItemKind::Recipe,
            "feed" => ItemKind::Feed,
            other => ItemKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemKind::Entry => "entry",
            ItemKind::Review => "review",
            ItemKind::ReviewAggregate => "review-aggregate",
            ItemKind::Geo => "geo",
            ItemKind::Card => "card",
            ItemKind::Recipe => "recipe",
            ItemKind::Feed => "feed",
            ItemKind::Other(name) => name,
        };
        write!(f, "h-{name}")
    }
}

/// One value of a property
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PropertyValue {
    /// Plain text or a resolved URL
    Text(String),
    /// Embedded markup (`e-*` properties) with its visible text
    Html { html: String, text: String },
    /// An item nested directly as the value of a property
    Item(Box<MicroformatItem>),
}

impl PropertyValue {
    /// Reduce the value to a scalar string
    ///
    /// HTML values yield their visible text; nested items yield their own
    /// value, falling back to their first `name`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(text) => Some(text),
            PropertyValue::Html { text, .. } => Some(text),
            PropertyValue::Item(item) => item.value.as_deref().or_else(|| item.first_text("name")),
        }
    }

    pub fn as_item(&self) -> Option<&MicroformatItem> {
        match self {
            PropertyValue::Item(item) => Some(item),
            _ => None,
        }
    }
}

/// A parsed microformat object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MicroformatItem {
    pub kind: ItemKind,
    /// Property name (without prefix) to its values, in document order
    pub properties: BTreeMap<String, Vec<PropertyValue>>,
    pub children: Vec<MicroformatItem>,
    /// Set only when the item is itself the value of a property
    pub value: Option<String>,
}

impl MicroformatItem {
    pub fn new(kind: ItemKind) -> Self {
        Self {
            kind,
            properties: BTreeMap::new(),
            children: Vec::new(),
            value: None,
        }
    }

    /// Builder-style property insertion, mostly for fixtures
    pub fn with_property(mut self, name: &str, value: PropertyValue) -> Self {
        self.push_property(name, value);
        self
    }

    pub fn with_child(mut self, child: MicroformatItem) -> Self {
        self.children.push(child);
        self
    }

    pub fn push_property(&mut self, name: &str, value: PropertyValue) {
        self.properties
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    pub fn is(&self, kind: &ItemKind) -> bool {
        &self.kind == kind
    }

    /// First value of a property; lists always unwrap to their first element
    pub fn first(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name).and_then(|values| values.first())
    }

    pub fn first_text(&self, name: &str) -> Option<&str> {
        self.first(name).and_then(PropertyValue::as_text)
    }

    /// Every value of a property reduced to text, skipping values without one
    pub fn texts(&self, name: &str) -> Vec<&str> {
        self.properties
            .get(name)
            .map(|values| values.iter().filter_map(PropertyValue::as_text).collect())
            .unwrap_or_default()
    }

    /// Items embedded in this item of the given kind: direct children first,
    /// then items carried as property values
    pub fn embedded(&self, kind: &ItemKind) -> Vec<&MicroformatItem> {
        let children = self.children.iter().filter(|child| child.is(kind));
        let in_properties = self
            .properties
            .values()
            .flatten()
            .filter_map(PropertyValue::as_item)
            .filter(|item| item.is(kind));
        children.chain(in_properties).collect()
    }
}

/// The item forest produced by parsing one page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemTree {
    pub items: Vec<MicroformatItem>,
}

impl ItemTree {
    pub fn new(items: Vec<MicroformatItem>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
