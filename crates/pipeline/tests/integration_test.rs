//! Integration tests for the pipeline.
//!
//! These tests verify that sources and filters work together in a
//! realistic scenario.

use data_loader::{Catalog, FeatureIndex, ItemId, ItemRecord, Mood, NeighborIndexSpec, SparseVector};
use pipeline::filters::*;
use pipeline::{Filter, FilterPipeline};
use sources::{PopularitySource, SimilaritySource};
use std::sync::Arc;

fn create_test_catalog() -> Arc<Catalog> {
    let records = vec![
        ItemRecord::new(1, "Farm Days")
            .with_mood(Mood::Relaxing)
            .with_tags(["farming", "simulation", "rpg"])
            .with_review_count(10),
        ItemRecord::new(2, "Cozy Tiles")
            .with_mood(Mood::Relaxing)
            .with_tags(["puzzle", "casual"])
            .with_review_count(50),
        ItemRecord::new(3, "Blast Zone")
            .with_mood(Mood::Intense)
            .with_tags(["fps", "action rpg"])
            .with_review_count(5),
        ItemRecord::new(4, "RPG Maker Pro")
            .with_mood(Mood::Brainy)
            .with_tags(["rpgmaker", "utilities"])
            .with_review_count(80),
        ItemRecord::new(5, "Night Shift")
            .with_tags(["horror", "rpg"]),
    ];
    Arc::new(Catalog::from_records(records).unwrap())
}

fn create_test_features() -> Arc<FeatureIndex> {
    let rows = vec![
        SparseVector::from_pairs([(0, 1.0), (1, 0.5)]).unwrap(),
        SparseVector::from_pairs([(0, 0.9), (1, 0.6)]).unwrap(),
        SparseVector::from_pairs([(2, 1.0)]).unwrap(),
        SparseVector::from_pairs([(1, 1.0), (2, 0.2)]).unwrap(),
        SparseVector::from_pairs([(0, 0.2), (2, 1.0)]).unwrap(),
    ];
    Arc::new(FeatureIndex::from_rows(3, rows).unwrap())
}

fn ids(records: &[&ItemRecord]) -> Vec<ItemId> {
    records.iter().map(|r| r.id).collect()
}

#[test]
fn test_mood_then_popularity() {
    let catalog = create_test_catalog();
    let pipeline = FilterPipeline::for_attributes(Some(Mood::Relaxing), None);

    let matching = pipeline.filter_catalog(&catalog);
    let ranked = sources::popularity::rank(matching, 5);

    // Cozy Tiles has more reviews than Farm Days
    assert_eq!(ids(&ranked), vec![2, 1]);
}

#[test]
fn test_genre_word_boundary_over_catalog() {
    let catalog = create_test_catalog();
    let pipeline = FilterPipeline::new().add_filter(GenreFilter::new("rpg").unwrap());

    let matching = pipeline.filter_catalog(&catalog);
    // "action rpg" matches, "rpgmaker" does not
    assert_eq!(ids(&matching), vec![1, 3, 5]);
}

#[test]
fn test_filter_order_does_not_matter() {
    let catalog = create_test_catalog();
    let mood_first = FilterPipeline::new()
        .add_filter(MoodFilter::new(Mood::Relaxing))
        .add_filter(GenreFilter::new("rpg").unwrap());
    let genre_first = FilterPipeline::new()
        .add_filter(GenreFilter::new("rpg").unwrap())
        .add_filter(MoodFilter::new(Mood::Relaxing));

    assert_eq!(
        ids(&mood_first.filter_catalog(&catalog)),
        ids(&genre_first.filter_catalog(&catalog))
    );
}

#[test]
fn test_filtering_is_idempotent() {
    let catalog = create_test_catalog();
    let pipeline = FilterPipeline::for_attributes(Some(Mood::Relaxing), Some("casual"));

    let once = pipeline.filter_catalog(&catalog);
    let twice = pipeline.retain_records(once.iter().copied());
    assert_eq!(ids(&once), ids(&twice));
}

#[test]
fn test_similarity_candidates_keep_their_order() {
    let catalog = create_test_catalog();
    let similarity =
        SimilaritySource::new(catalog.clone(), create_test_features(), NeighborIndexSpec::default())
            .unwrap();

    let candidates = similarity.get_candidates(0, 4).unwrap();
    let unfiltered: Vec<ItemId> = candidates.iter().map(|c| c.item_id).collect();

    let pipeline = FilterPipeline::for_attributes(Some(Mood::Relaxing), None);
    let filtered = pipeline.apply(candidates, &catalog).unwrap();
    let filtered_ids: Vec<ItemId> = filtered.iter().map(|c| c.item_id).collect();

    // filtered ids are a subsequence of the similarity order
    let mut rest = unfiltered.iter();
    assert!(filtered_ids.iter().all(|id| rest.any(|u| u == id)));
    assert_eq!(filtered_ids, vec![2]);
}

#[test]
fn test_popularity_source_after_filters() {
    let catalog = create_test_catalog();
    let popularity = PopularitySource::new(catalog.clone());
    let pipeline = FilterPipeline::new().add_filter(GenreFilter::new("rpg").unwrap());

    let filtered = pipeline.apply(popularity.all_candidates(), &catalog).unwrap();
    let ranked = popularity.rank(filtered, 2);
    let ranked_ids: Vec<ItemId> = ranked.iter().map(|c| c.item_id).collect();
    assert_eq!(ranked_ids, vec![1, 3]);
}

#[test]
fn test_filters_are_object_safe() {
    let filters: Vec<Box<dyn Filter>> = vec![
        Box::new(MoodFilter::new(Mood::Horror)),
        Box::new(GenreFilter::new("horror").unwrap()),
    ];
    let record = ItemRecord::new(9, "Dark").with_tags(["horror"]);
    let results: Vec<bool> = filters.iter().map(|f| f.matches(&record)).collect();
    assert_eq!(results, vec![false, true]);
}
