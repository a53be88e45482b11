mod common;

use std::sync::Arc;

use coffeebot::SyndicationError;
use coffeebot::geo::{CategoryMapPublisher, GeoAggregator, decode_map_query};

use common::{BASE_URL, FakePages, FakeWiki};

const CAFE: &str = "https://alice.example/cafe";
const BAKERY: &str = "https://bob.example/bakery";
const DEAD: &str = "https://carol.example/gone";

const STANDALONE_GEO: &str = r#"<div class="h-geo">
    <data class="p-latitude" value="53.8"></data>
    <data class="p-longitude" value="-1.5"></data>
  </div>"#;

const REVIEW_GEO: &str = r#"<div class="h-review">
    <span class="p-name">Bakery</span>
    <div class="p-location h-geo">
      <data class="p-latitude" value="51.5"></data>
      <data class="p-longitude" value="-0.1"></data>
    </div>
  </div>"#;

fn sources(urls: &[&str]) -> Vec<String> {
    urls.iter().map(|url| url.to_string()).collect()
}

#[tokio::test]
async fn keeps_source_order() {
    let pages = FakePages::default()
        .with_page(CAFE, STANDALONE_GEO)
        .with_page(BAKERY, REVIEW_GEO);
    let aggregator = GeoAggregator::new(Arc::new(pages), 2);

    let aggregate = aggregator.aggregate(&sources(&[CAFE, BAKERY])).await.unwrap();

    let pairs: Vec<(f64, f64)> = aggregate.coordinates.iter().map(|c| c.pair()).collect();
    assert_eq!(pairs, vec![(53.8, -1.5), (51.5, -0.1)]);
    assert_eq!(aggregate.query, "53.8,-1.5|51.5,-0.1");
    assert_eq!(decode_map_query(&aggregate.query).unwrap(), pairs);
    assert_eq!(aggregate.coordinates[1].source.as_deref(), Some(BAKERY));
}

#[tokio::test]
async fn order_holds_with_a_single_slot() {
    let pages = FakePages::default()
        .with_page(CAFE, STANDALONE_GEO)
        .with_page(BAKERY, REVIEW_GEO);
    let aggregator = GeoAggregator::new(Arc::new(pages), 1);

    let aggregate = aggregator.aggregate(&sources(&[BAKERY, CAFE])).await.unwrap();
    assert_eq!(aggregate.query, "51.5,-0.1|53.8,-1.5");
}

#[tokio::test]
async fn no_sources_is_an_empty_query() {
    let aggregator = GeoAggregator::new(Arc::new(FakePages::default()), 4);

    let aggregate = aggregator.aggregate(&[]).await.unwrap();
    assert!(aggregate.is_empty());
    assert_eq!(aggregate.query, "");
}

#[tokio::test]
async fn pages_without_geo_contribute_nothing() {
    let pages = FakePages::default()
        .with_page(CAFE, "<p>no location here</p>")
        .with_page(BAKERY, REVIEW_GEO);
    let aggregator = GeoAggregator::new(Arc::new(pages), 2);

    let aggregate = aggregator.aggregate(&sources(&[CAFE, BAKERY])).await.unwrap();
    assert_eq!(aggregate.query, "51.5,-0.1");
}

#[tokio::test]
async fn one_failed_fetch_fails_the_batch() {
    let pages = FakePages::default()
        .with_page(CAFE, STANDALONE_GEO)
        .with_failure(DEAD);
    let aggregator = GeoAggregator::new(Arc::new(pages), 2);

    let err = aggregator.aggregate(&sources(&[CAFE, DEAD])).await.unwrap_err();
    assert!(matches!(err, SyndicationError::UpstreamFetch(_)));
}

#[tokio::test]
async fn publisher_overwrites_the_category_page() {
    let member_url = format!("{BASE_URL}/Joe%27s_Leeds");
    let pages = Arc::new(FakePages::default().with_page(&member_url, STANDALONE_GEO));
    let mut wiki = FakeWiki::default();
    wiki.categories.insert("Leeds".into(), vec!["Joe's Leeds".into()]);
    wiki.pages
        .lock()
        .unwrap()
        .insert("Category:Leeds".into(), "hand-written notes".into());
    let wiki = Arc::new(wiki);

    let publisher = CategoryMapPublisher::new(wiki.clone(), GeoAggregator::new(pages, 2), BASE_URL, "coffeebot");
    let map = publisher.publish("Leeds").await.unwrap();

    assert_eq!(map.title, "Category:Leeds");
    assert_eq!(map.summary, format!("New page created by coffeebot from {BASE_URL}/Leeds"));
    assert_eq!(wiki.page("Category:Leeds").unwrap(), map.body);
    assert!(map.body.contains("map?coordinates=53.8,-1.5"));
    assert!(!map.body.contains("hand-written notes"));
}

#[tokio::test]
async fn failed_aggregation_leaves_the_category_page_alone() {
    let pages = Arc::new(FakePages::default().with_failure(&format!("{BASE_URL}/Gone")));
    let mut wiki = FakeWiki::default();
    wiki.categories.insert("Leeds".into(), vec!["Gone".into()]);
    wiki.pages
        .lock()
        .unwrap()
        .insert("Category:Leeds".into(), "old map".into());
    let wiki = Arc::new(wiki);

    let publisher = CategoryMapPublisher::new(wiki.clone(), GeoAggregator::new(pages, 2), BASE_URL, "coffeebot");
    assert!(publisher.publish("Leeds").await.is_err());

    assert_eq!(wiki.page("Category:Leeds").unwrap(), "old map");
    assert_eq!(wiki.edit_count(), 0);
}
