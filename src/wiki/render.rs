//! Wikitext fragments
//!
//! The exact shapes matter: pages written by earlier runs are re-parsed as
//! microformats on every merge, so the classes and `data` values emitted
//! here are what the aggregate recomputation reads back.

use crate::clients::Address;
use crate::geo::GeoCoordinate;
use crate::review::ReviewRecord;
use crate::utils::constants::{
    ADD_YOURSELF_TEMPLATE, BEST_RATING, MAX_STAR_GLYPHS, PHOTOS_HEADING, REVIEWS_HEADING,
    STAR_GLYPH,
};

use super::aggregate::AggregateRating;

/// Escape text so it cannot open or close markup
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\'', "&#39;")
}

/// Like [`escape`], and also keeps square brackets from closing a wiki link
pub fn escape_link_text(text: &str) -> String {
    escape(text).replace('[', "&#91;").replace(']', "&#93;")
}

/// Rating as written by a person: `4` rather than `4.0`, `4.5` as is
pub fn format_rating(rating: f64) -> String {
    if rating.fract() == 0.0 {
        format!("{rating:.0}")
    } else {
        rating.to_string()
    }
}

/// `count` star glyphs, at most [`MAX_STAR_GLYPHS`]; negative counts render nothing
pub fn stars(count: i64) -> String {
    let count = usize::try_from(count).unwrap_or(0).min(MAX_STAR_GLYPHS);
    STAR_GLYPH.repeat(count)
}

pub fn category_link(name: &str) -> String {
    format!("[[Category:{}]]", name.trim())
}

/// Location summary template placed above the reviews
pub fn infobox(coordinate: &GeoCoordinate, address: &Address) -> String {
    format!(
        "{{{{Infobox\n|location={city}, {country}\n|lat={lat}\n|long={lon}\n|address={road}, {postcode} {city}, {country}\n}}}}\n",
        city = address.city,
        country = address.country,
        road = address.road,
        postcode = address.postcode,
        lat = coordinate.latitude,
        lon = coordinate.longitude,
    )
}

/// One review: linked name, author, rating and quoted content
pub fn review_block(record: &ReviewRecord) -> String {
    let rating = match record.rating {
        Some(rating) => format!(
            " - <data value='{value}' class='p-rating'>{glyphs}</data>",
            value = format_rating(rating),
            glyphs = stars(rating.round() as i64),
        ),
        None => String::new(),
    };

    format!(
        "<div class='h-review'>\n=== <span class='p-name'>[{url} {name}]</span> by <span class='p-author'>[https://{domain} {domain}]</span>{rating} ===\n<blockquote class='p-content'>{content}</blockquote>\n</div>\n",
        url = record.url.replace(' ', "%20"),
        name = escape_link_text(&record.name),
        domain = record.author_domain,
        content = escape(&record.content_text),
    )
}

/// Aggregate rating block for the page's item
pub fn aggregate_block(item_name: &str, aggregate: &AggregateRating) -> String {
    let noun = if aggregate.vote_count == 1 { "rating" } else { "ratings" };
    format!(
        "<div class='h-review-aggregate'>\n<span class='p-item'>{item}</span> aggregate review: {glyphs} - <data value='{average:.1}' class='p-average'>{average:.1}</data>/<data value='{best}' class='p-best'>{best}</data> (<data value='{votes}' class='p-votes'>{votes}</data> {noun})</div>",
        item = escape(item_name),
        glyphs = stars(aggregate.star_count),
        average = aggregate.average,
        best = BEST_RATING,
        votes = aggregate.vote_count,
    )
}

/// A freshly created reviews section holding one review and its aggregate
pub fn reviews_section(record: &ReviewRecord, aggregate: &AggregateRating) -> String {
    format!(
        "\n\n<div class='h-feed'>\n== {REVIEWS_HEADING} ==\n\n{review}\n{aggregate}\n\n{ADD_YOURSELF_TEMPLATE}\n</div>\n",
        review = review_block(record),
        aggregate = aggregate_block(&record.name, aggregate),
    )
}

/// External image wrapped so the wiki shows it without link decoration
pub fn photo_embed(url: &str) -> String {
    format!("<span class='plainlinks'>{}</span>\n", url.replace(' ', "%20"))
}

pub fn photos_section(url: &str) -> String {
    format!("\n== {PHOTOS_HEADING} ==\n{}", photo_embed(url))
}

/// Embedded map panel over an encoded coordinate query
pub fn map_embed(query: &str) -> String {
    format!("<iframe path=\"map?coordinates={query}\" width=\"100%\" height=\"600px\" key=\"cbc\" />")
}
