//! Whole pages built from a single item: posts and recipes

use chrono::NaiveDate;

use crate::microformats::{MicroformatItem, PropertyValue};
use crate::utils::constants::RECIPES_CATEGORY;
use crate::utils::{SyndicationError, SyndicationResult};

use super::document::WikiDocument;
use super::render::{category_link, escape, photo_embed};

fn required_name(item: &MicroformatItem) -> SyndicationResult<String> {
    item.first_text("name")
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| SyndicationError::MissingRequiredField("name".to_string()))
}

/// Page for a generic post: its content, where it came from, its categories
///
/// # Errors
/// Returns `MissingRequiredField` when the entry has no name.
pub fn entry_page(entry: &MicroformatItem, source_url: &str) -> SyndicationResult<WikiDocument> {
    let name = required_name(entry)?;

    let content = match entry.first("content") {
        Some(PropertyValue::Html { html, .. }) => html.clone(),
        Some(other) => escape(other.as_text().unwrap_or_default()),
        None => String::new(),
    };
    let url = entry.first_text("url").unwrap_or(source_url);

    let mut body = format!("{content}\nThis page was originally created on {url}.");
    for category in entry.texts("category") {
        if !category.trim().is_empty() {
            body.push('\n');
            body.push_str(&category_link(category));
        }
    }

    Ok(WikiDocument::new(name, body))
}

/// Page for a recipe, filed under the recipes category
///
/// # Errors
/// Returns `MissingRequiredField` when the recipe has no name.
pub fn recipe_page(
    recipe: &MicroformatItem,
    author_domain: &str,
    imported_on: NaiveDate,
) -> SyndicationResult<WikiDocument> {
    let name = required_name(recipe)?;
    let text = |property: &str| escape(recipe.first_text(property).unwrap_or_default().trim());

    let mut body = String::from("<div class='h-recipe'>\n");
    body.push_str(&format!("'''<span class='p-name'>{}</span>'''\n\n", escape(&name)));

    if let Some(photo) = recipe.first_text("photo").filter(|photo| !photo.trim().is_empty()) {
        body.push_str(&photo_embed(photo.trim()));
        body.push('\n');
    }

    body.push_str(&format!(
        "'''Yield:''' <span class='p-yield'>{}</span><br />\n'''Duration:''' <span class='dt-duration'>{}</span>\n",
        text("yield"),
        text("duration"),
    ));

    body.push_str("\n=== Ingredients ===\n");
    for ingredient in recipe.texts("ingredient") {
        body.push_str(&format!("* <span class='p-ingredient'>{}</span>\n", escape(ingredient.trim())));
    }

    body.push_str(&format!(
        "\n=== Instructions ===\n<div class='e-instructions'>{}</div>\n",
        text("instructions")
    ));

    let source = recipe
        .first_text("url")
        .map(|url| format!(" from [{url} the original]"))
        .unwrap_or_default();
    body.push_str(&format!(
        "\nRecipe by [https://{author_domain} {author_domain}]{source}, imported on {}.\n</div>\n\n{}",
        imported_on.format("%Y-%m-%d"),
        category_link(RECIPES_CATEGORY),
    ));

    Ok(WikiDocument::new(name, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::microformats::ItemKind;

    fn text(value: &str) -> PropertyValue {
        PropertyValue::Text(value.to_string())
    }

    #[test]
    fn entry_page_credits_the_source_and_keeps_categories() {
        let entry = MicroformatItem::new(ItemKind::Entry)
            .with_property("name", text("Brew guide"))
            .with_property(
                "content",
                PropertyValue::Html { html: "<p>Grind fine.</p>".into(), text: "Grind fine.".into() },
            )
            .with_property("url", text("https://alice.example/brew"))
            .with_property("category", text("Brewing"))
            .with_property("category", text("V60"));

        let page = entry_page(&entry, "https://alice.example/").unwrap();
        assert_eq!(page.title(), "Brew guide");
        assert_eq!(
            page.body(),
            "<p>Grind fine.</p>\nThis page was originally created on https://alice.example/brew.\n[[Category:Brewing]]\n[[Category:V60]]"
        );
        assert_eq!(page.categories(), vec!["Brewing", "V60"]);
    }

    #[test]
    fn nameless_entry_is_rejected() {
        let entry = MicroformatItem::new(ItemKind::Entry).with_property("content", text("hi"));
        assert!(matches!(
            entry_page(&entry, "https://a.example/"),
            Err(SyndicationError::MissingRequiredField(_))
        ));
    }

    #[test]
    fn recipe_page_lists_ingredients_and_joins_recipes() {
        let recipe = MicroformatItem::new(ItemKind::Recipe)
            .with_property("name", text("Cold brew"))
            .with_property("yield", text("1 litre"))
            .with_property("ingredient", text("100g coffee"))
            .with_property("ingredient", text("1l water"))
            .with_property("instructions", text("Steep overnight & strain."));

        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let page = recipe_page(&recipe, "alice.example", date).unwrap();
        let body = page.body();

        assert_eq!(page.title(), "Cold brew");
        assert!(body.contains("* <span class='p-ingredient'>100g coffee</span>\n* <span class='p-ingredient'>1l water</span>\n"));
        assert!(body.contains("Steep overnight &amp; strain."));
        assert!(body.contains("imported on 2024-05-01."));
        assert!(body.ends_with("[[Category:Recipes]]"));
        assert!(!body.contains("plainlinks"));
    }
}
