//! Aggregate rating, always re-derived from a document

use serde::Serialize;

use crate::microformats::{ItemKind, descendants_of_kind, parse_html};
use crate::review::parse_rating;

use super::document::WikiDocument;

/// Summary of every review block on one page
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregateRating {
    /// Mean of the rated blocks, rounded to one decimal place
    pub average: f64,
    /// Number of review blocks, rated or not
    pub vote_count: usize,
    /// `average` rounded to the nearest integer; not clamped
    pub star_count: i64,
}

impl AggregateRating {
    /// Compute from one entry per review block
    ///
    /// Unrated blocks count as votes but stay out of the average. With no
    /// rated blocks the average is 0.
    pub fn from_ratings(ratings: &[Option<f64>]) -> Self {
        let rated: Vec<f64> = ratings.iter().flatten().copied().collect();
        let average = if rated.is_empty() {
            0.0
        } else {
            round_to_tenth(rated.iter().sum::<f64>() / rated.len() as f64)
        };

        Self {
            average,
            vote_count: ratings.len(),
            star_count: average.round() as i64,
        }
    }

    /// Re-scan a whole document as microformats and summarize its reviews
    pub fn rescan(document: &WikiDocument) -> Self {
        let tree = parse_html(document.body(), None);
        let ratings: Vec<Option<f64>> = descendants_of_kind(&tree, &ItemKind::Review)
            .into_iter()
            .map(|review| review.first_text("rating").and_then(parse_rating))
            .collect();
        Self::from_ratings(&ratings)
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_rated_blocks_only() {
        let aggregate = AggregateRating::from_ratings(&[Some(5.0), None, Some(4.0), Some(4.0)]);
        assert_eq!(aggregate.vote_count, 4);
        assert_eq!(aggregate.average, 4.3);
        assert_eq!(aggregate.star_count, 4);
    }

    #[test]
    fn empty_and_unrated_documents_average_zero() {
        assert_eq!(AggregateRating::from_ratings(&[]).vote_count, 0);
        let unrated = AggregateRating::from_ratings(&[None]);
        assert_eq!((unrated.average, unrated.vote_count, unrated.star_count), (0.0, 1, 0));
    }

    #[test]
    fn out_of_range_ratings_propagate() {
        let aggregate = AggregateRating::from_ratings(&[Some(9.0)]);
        assert_eq!(aggregate.star_count, 9);
    }

    #[test]
    fn rescan_reads_review_blocks_back() {
        let body = "== Reviews ==\n<div class='h-feed'>\
            <div class='h-review'><data value='4' class='p-rating'>x</data></div>\
            <div class='h-review'><data value='2.5' class='p-rating'>x</data></div>\
            <div class='h-review-aggregate'><data value='9' class='p-average'>9</data></div></div>";
        let aggregate = AggregateRating::rescan(&WikiDocument::new("T", body));
        assert_eq!(aggregate.vote_count, 2);
        assert_eq!(aggregate.average, 3.3);
        assert_eq!(aggregate.star_count, 3);
    }

    #[test]
    fn non_finite_ratings_on_a_page_count_as_unrated() {
        let body = "== Reviews ==\n<div class='h-feed'>\
            <div class='h-review'><data value='NaN' class='p-rating'>x</data></div>\
            <div class='h-review'><data value='4' class='p-rating'>x</data></div>\
            <div class='h-review'><data value='2' class='p-rating'>x</data></div></div>";
        let aggregate = AggregateRating::rescan(&WikiDocument::new("T", body));
        assert_eq!(aggregate.vote_count, 3);
        assert_eq!(aggregate.average, 3.0);
        assert_eq!(aggregate.star_count, 3);
    }
}
