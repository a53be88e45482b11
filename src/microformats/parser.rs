//! Microformats2 parser over raw HTML
//!
//! Walks the DOM produced by `scraper` and builds an [`ItemTree`]:
//! - `h-*` classes open an item; the first one names its kind
//! - `p-*`, `u-*`, `dt-*` and `e-*` classes attach properties to the nearest
//!   enclosing item
//! - an item carrying a property class becomes that property's value,
//!   otherwise it is a child of the enclosing item
//!
//! Only the parts of the mf2 parsing rules the wiki pipeline depends on are
//! implemented. The value-class pattern and implied `photo`/`url` are not.

use scraper::{ElementRef, Html};
use url::Url;

use super::types::{ItemKind, ItemTree, MicroformatItem, PropertyValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prefix {
    Plain,
    Url,
    DateTime,
    Embedded,
}

/// Parse a full HTML document into its top-level microformat items
///
/// Relative `u-*` values are resolved against `base_url` when one is given.
pub fn parse_html(html: &str, base_url: Option<&Url>) -> ItemTree {
    let document = Html::parse_document(html);
    let mut items = Vec::new();
    collect_roots(document.root_element(), base_url, &mut items);
    ItemTree::new(items)
}

fn child_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap)
}

fn collect_roots(element: ElementRef<'_>, base_url: Option<&Url>, out: &mut Vec<MicroformatItem>) {
    for child in child_elements(element) {
        if root_classes(child).is_empty() {
            collect_roots(child, base_url, out);
        } else {
            out.push(parse_item(child, base_url));
        }
    }
}

fn is_mf2_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('-')
        && !name.ends_with('-')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn root_classes(element: ElementRef<'_>) -> Vec<&str> {
    element
        .value()
        .classes()
        .filter(|class| class.strip_prefix("h-").is_some_and(is_mf2_name))
        .collect()
}

fn property_classes(element: ElementRef<'_>) -> Vec<(Prefix, &str)> {
    element
        .value()
        .classes()
        .filter_map(|class| {
            let (prefix, name) = if let Some(name) = class.strip_prefix("p-") {
                (Prefix::Plain, name)
            } else if let Some(name) = class.strip_prefix("u-") {
                (Prefix::Url, name)
            } else if let Some(name) = class.strip_prefix("dt-") {
                (Prefix::DateTime, name)
            } else if let Some(name) = class.strip_prefix("e-") {
                (Prefix::Embedded, name)
            } else {
                return None;
            };
            is_mf2_name(name).then_some((prefix, name))
        })
        .collect()
}

fn parse_item(element: ElementRef<'_>, base_url: Option<&Url>) -> MicroformatItem {
    let kind = root_classes(element)
        .first()
        .map(|class| ItemKind::from_class(class))
        .unwrap_or_else(|| ItemKind::Other(String::new()));

    let mut item = MicroformatItem::new(kind);
    let has_explicit_text = walk_properties(element, base_url, &mut item);

    if !has_explicit_text && !item.properties.contains_key("name") {
        let implied = implied_name(element);
        if !implied.is_empty() {
            item.push_property("name", PropertyValue::Text(implied));
        }
    }

    item
}

/// Attach the properties found below `element` to `item`
///
/// Returns true when a `p-*`/`e-*` property or a nested item was seen, which
/// suppresses the implied name.
fn walk_properties(element: ElementRef<'_>, base_url: Option<&Url>, item: &mut MicroformatItem) -> bool {
    let mut has_explicit_text = false;

    for child in child_elements(element) {
        let properties = property_classes(child);

        if !root_classes(child).is_empty() {
            has_explicit_text = true;
            let nested = parse_item(child, base_url);
            if properties.is_empty() {
                item.children.push(nested);
                continue;
            }
            for (prefix, name) in properties {
                let mut value_item = nested.clone();
                value_item.value = Some(nested_item_value(child, &nested, prefix, base_url));
                item.push_property(name, PropertyValue::Item(Box::new(value_item)));
            }
            continue;
        }

        for (prefix, name) in properties {
            has_explicit_text |= matches!(prefix, Prefix::Plain | Prefix::Embedded);
            item.push_property(name, property_value(child, prefix, base_url));
        }
        has_explicit_text |= walk_properties(child, base_url, item);
    }

    has_explicit_text
}

fn nested_item_value(
    element: ElementRef<'_>,
    nested: &MicroformatItem,
    prefix: Prefix,
    base_url: Option<&Url>,
) -> String {
    match prefix {
        Prefix::Plain => nested
            .first_text("name")
            .map(str::to_string)
            .unwrap_or_else(|| text_content(element)),
        Prefix::Url => nested
            .first_text("url")
            .map(str::to_string)
            .unwrap_or_else(|| url_value(element, base_url)),
        Prefix::DateTime | Prefix::Embedded => text_content(element),
    }
}

fn property_value(element: ElementRef<'_>, prefix: Prefix, base_url: Option<&Url>) -> PropertyValue {
    match prefix {
        Prefix::Plain => PropertyValue::Text(plain_value(element)),
        Prefix::Url => PropertyValue::Text(url_value(element, base_url)),
        Prefix::DateTime => PropertyValue::Text(datetime_value(element)),
        Prefix::Embedded => PropertyValue::Html {
            html: element.inner_html().trim().to_string(),
            text: text_content(element),
        },
    }
}

fn attr<'a>(element: ElementRef<'a>, tags: &[&str], name: &str) -> Option<&'a str> {
    let value = element.value();
    if tags.contains(&value.name()) {
        value.attr(name)
    } else {
        None
    }
}

fn plain_value(element: ElementRef<'_>) -> String {
    attr(element, &["abbr", "link"], "title")
        .or_else(|| attr(element, &["data", "input"], "value"))
        .or_else(|| attr(element, &["img", "area"], "alt"))
        .map(str::to_string)
        .unwrap_or_else(|| text_content(element))
}

fn url_value(element: ElementRef<'_>, base_url: Option<&Url>) -> String {
    let raw = attr(element, &["a", "area", "link"], "href")
        .or_else(|| attr(element, &["img", "audio", "video", "source", "iframe"], "src"))
        .or_else(|| attr(element, &["video"], "poster"))
        .or_else(|| attr(element, &["object"], "data"));

    match raw {
        Some(raw) => resolve(raw, base_url),
        None => plain_value(element),
    }
}

fn datetime_value(element: ElementRef<'_>) -> String {
    attr(element, &["time", "ins", "del"], "datetime")
        .or_else(|| attr(element, &["abbr"], "title"))
        .or_else(|| attr(element, &["data", "input"], "value"))
        .map(str::to_string)
        .unwrap_or_else(|| text_content(element))
}

fn implied_name(element: ElementRef<'_>) -> String {
    attr(element, &["img", "area"], "alt")
        .or_else(|| attr(element, &["abbr"], "title"))
        .map(str::to_string)
        .unwrap_or_else(|| text_content(element))
}

fn resolve(raw: &str, base_url: Option<&Url>) -> String {
    match base_url.map(|base| base.join(raw.trim())) {
        Some(Ok(resolved)) => resolved.to_string(),
        _ => raw.trim().to_string(),
    }
}

fn text_content(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const REVIEW_PAGE: &str = r#"
        <html><body>
          <article class="h-review">
            <h1 class="p-name">Joe's Cafe</h1>
            <data class="p-rating" value="4">four stars</data>
            <a class="u-url" href="/reviews/joes">permalink</a>
            <div class="e-content"><p>Great <b>coffee</b></p></div>
            <div class="p-location h-geo">
              <data class="p-latitude" value="53.8"></data>
              <data class="p-longitude" value="-1.5"></data>
            </div>
          </article>
          <div class="h-geo"><span class="p-latitude">51.5</span><span class="p-longitude">-0.1</span></div>
        </body></html>
    "#;

    #[test]
    fn parses_top_level_items_in_document_order() {
        let tree = parse_html(REVIEW_PAGE, None);
        let kinds: Vec<_> = tree.items.iter().map(|item| item.kind.clone()).collect();
        assert_eq!(kinds, vec![ItemKind::Review, ItemKind::Geo]);
    }

    #[test]
    fn reads_property_prefixes() {
        let base = Url::parse("https://alice.example/").unwrap();
        let tree = parse_html(REVIEW_PAGE, Some(&base));
        let review = &tree.items[0];

        assert_eq!(review.first_text("name"), Some("Joe's Cafe"));
        assert_eq!(review.first_text("rating"), Some("4"));
        assert_eq!(review.first_text("url"), Some("https://alice.example/reviews/joes"));
        match review.first("content") {
            Some(PropertyValue::Html { html, text }) => {
                assert!(html.contains("<b>coffee</b>"));
                assert_eq!(text, "Great coffee");
            }
            other => panic!("expected html content, got {other:?}"),
        }
    }

    #[test]
    fn property_items_stay_attached_to_their_parent() {
        let tree = parse_html(REVIEW_PAGE, None);
        let geos = tree.items[0].embedded(&ItemKind::Geo);
        assert_eq!(geos.len(), 1);
        assert_eq!(geos[0].first_text("latitude"), Some("53.8"));
        assert!(tree.items[0].children.is_empty());
    }

    #[test]
    fn plain_nested_roots_become_children() {
        let html = r#"<div class="h-feed"><div class="h-review"><span class="p-name">A</span></div>
            <div class="h-review"><span class="p-name">B</span></div></div>"#;
        let tree = parse_html(html, None);
        assert_eq!(tree.items.len(), 1);
        assert_eq!(tree.items[0].children.len(), 2);
    }

    #[test]
    fn implies_name_only_without_explicit_properties() {
        let tree = parse_html(r#"<a class="h-card" href="/">Ada Lovelace</a>"#, None);
        assert_eq!(tree.items[0].first_text("name"), Some("Ada Lovelace"));

        let tree = parse_html(r#"<div class="h-card"><span class="p-nickname">ada</span> extra</div>"#, None);
        assert_eq!(tree.items[0].first_text("name"), None);
    }

    #[test]
    fn ignores_malformed_class_names() {
        let tree = parse_html(r#"<div class="h- h-Foo"><span class="p-">x</span></div>"#, None);
        assert!(tree.is_empty());
    }
}
