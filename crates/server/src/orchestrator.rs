//! # Recommendation Orchestrator
//!
//! This module turns a query into a ranked list of games:
//! 1. Resolve the anchor, if any (id first, then title)
//! 2. Anchored: nearest neighbors, then the mood filter
//! 3. Unanchored: mood and genre filters over the catalog, then popularity
//! 4. Wrap the survivors with rank, source and explanation
//!
//! An unknown anchor and an empty result are ordinary outcomes, not errors.
//! Errors on the request path are internal failures only.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use data_loader::{
    Catalog, EngineArtifacts, FeatureIndex, ItemRecord, Mood, NeighborIndexSpec,
    RowId,
};
use pipeline::FilterPipeline;
use sources::{Candidate, CandidateSource, PopularitySource, SimilaritySource};

use crate::config::{AppConfig, EngineConfig};
use crate::error::EngineError;
use crate::query::{AnchorRef, Query};

/// Final recommendation returned to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecommendation {
    pub record: ItemRecord,
    /// 1-based position in the result list
    pub rank: usize,
    pub source: CandidateSource,
    /// Distance to the anchor, for similarity results
    pub distance: Option<f32>,
    pub explanation: String,
}

/// What a query produced
#[derive(Debug, Clone, PartialEq)]
pub enum RecommendationOutcome {
    Recommendations(Vec<GameRecommendation>),
    /// The anchor matched nothing in the catalog
    NotFound(AnchorRef),
    /// Everything was filtered out
    EmptyResult,
}

impl RecommendationOutcome {
    pub fn recommendations(&self) -> &[GameRecommendation] {
        match self {
            RecommendationOutcome::Recommendations(recs) => recs,
            _ => &[],
        }
    }
}

/// Main orchestrator that coordinates sources and filters
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    catalog: Arc<Catalog>,
    similarity: Arc<SimilaritySource>,
    popularity: PopularitySource,
    config: EngineConfig,
}

impl RecommendationOrchestrator {
    /// Create an orchestrator over already-loaded state.
    ///
    /// Fails if the catalog and the feature index are not row-aligned or the
    /// configuration is invalid.
    pub fn new(
        catalog: Catalog,
        features: FeatureIndex,
        neighbor_spec: NeighborIndexSpec,
        config: EngineConfig,
    ) -> std::result::Result<Self, EngineError> {
        config.validate()?;
        data_loader::verify_alignment(&catalog, &features)?;

        let catalog = Arc::new(catalog);
        let similarity = SimilaritySource::new(catalog.clone(), Arc::new(features), neighbor_spec)?;
        let popularity = PopularitySource::new(catalog.clone());

        Ok(Self {
            catalog,
            similarity: Arc::new(similarity),
            popularity,
            config,
        })
    }

    pub fn from_artifacts(
        artifacts: EngineArtifacts,
        config: EngineConfig,
    ) -> std::result::Result<Self, EngineError> {
        Self::new(
            artifacts.catalog,
            artifacts.features,
            artifacts.neighbor_spec,
            config,
        )
    }

    /// Load the artifacts named by `config` and build the orchestrator
    pub fn load(config: &AppConfig) -> std::result::Result<Self, EngineError> {
        config.validate()?;
        let start = Instant::now();
        let artifacts = EngineArtifacts::load_from_files(&config.artifacts)?;
        let orchestrator = Self::from_artifacts(artifacts, config.engine)?;
        info!(
            "Engine ready: {} games loaded in {:.2?}",
            orchestrator.catalog.len(),
            start.elapsed()
        );
        Ok(orchestrator)
    }

    /// Load from the default artifact locations with default limits
    pub fn load_default() -> std::result::Result<Self, EngineError> {
        Self::load(&AppConfig::default())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Main entry point: recommendations for a query
    #[instrument(skip(self, query), fields(anchor = ?query.anchor, mood = ?query.mood, genre = ?query.genre))]
    pub fn recommend(&self, query: &Query) -> Result<RecommendationOutcome> {
        let start_time = Instant::now();

        let candidates = match query.anchor() {
            Some(anchor) => {
                let Some(position) = self.resolve(anchor) else {
                    info!("Anchor {} not found", anchor);
                    return Ok(RecommendationOutcome::NotFound(anchor.clone()));
                };
                self.similar_to(position, query.mood)?
            }
            None => self.popular_matching(query.mood, query.genre_token())?,
        };

        if candidates.is_empty() {
            info!("No games left after filtering ({:.2?})", start_time.elapsed());
            return Ok(RecommendationOutcome::EmptyResult);
        }

        let anchor_title = query
            .anchor()
            .and_then(|anchor| self.details(anchor))
            .map(|record| record.title.as_str());
        let recommendations = self.to_recommendations(candidates, anchor_title)?;
        info!(
            "Returning {} recommendations in {:.2?}",
            recommendations.len(),
            start_time.elapsed()
        );
        Ok(RecommendationOutcome::Recommendations(recommendations))
    }

    /// Single-record lookup, same resolution rules as `recommend`
    pub fn details(&self, anchor: &AnchorRef) -> Option<&ItemRecord> {
        self.resolve(anchor)
            .and_then(|position| self.catalog.record_at(position))
    }

    /// Catalog position of the anchor: by id first, then by title
    pub fn resolve(&self, anchor: &AnchorRef) -> Option<RowId> {
        if let Some(position) = anchor.id.and_then(|id| self.catalog.position_of_id(id)) {
            return Some(position);
        }
        anchor
            .title
            .as_deref()
            .and_then(|title| self.catalog.position_of_title(title))
    }

    /// Neighbors of the anchor, optionally restricted to one mood.
    ///
    /// The anchor's own mood is irrelevant; only neighbors are filtered.
    fn similar_to(&self, position: RowId, mood: Option<Mood>) -> Result<Vec<Candidate>> {
        let candidates = self
            .similarity
            .get_candidates(position, self.config.similar_limit)
            .context("Similarity search failed")?;
        debug!("Similarity returned {} candidates", candidates.len());

        FilterPipeline::for_attributes(mood, None)
            .apply(candidates, &self.catalog)
            .context("Failed to apply filters")
    }

    /// Most reviewed games passing the mood and genre filters
    fn popular_matching(&self, mood: Option<Mood>, genre: Option<&str>) -> Result<Vec<Candidate>> {
        let pipeline = FilterPipeline::for_attributes(mood, genre);
        if pipeline.is_empty() {
            return Ok(self.popularity.get_candidates(self.config.fallback_limit));
        }

        let filtered = pipeline
            .apply(self.popularity.all_candidates(), &self.catalog)
            .context("Failed to apply filters")?;
        debug!("{} games pass {:?}", filtered.len(), pipeline.filter_names());
        Ok(self.popularity.rank(filtered, self.config.fallback_limit))
    }

    fn to_recommendations(
        &self,
        candidates: Vec<Candidate>,
        anchor_title: Option<&str>,
    ) -> Result<Vec<GameRecommendation>> {
        candidates
            .into_iter()
            .enumerate()
            .map(|(i, candidate)| {
                let record = self
                    .catalog
                    .record_at(candidate.position)
                    .with_context(|| format!("No catalog row at position {}", candidate.position))?;
                let explanation = explain(&candidate, record, anchor_title);
                Ok(GameRecommendation {
                    record: record.clone(),
                    rank: i + 1,
                    source: candidate.source,
                    distance: candidate.distance,
                    explanation,
                })
            })
            .collect()
    }
}

fn explain(candidate: &Candidate, record: &ItemRecord, anchor_title: Option<&str>) -> String {
    match (candidate.source, anchor_title, candidate.distance) {
        (CandidateSource::Similarity, Some(anchor), Some(distance)) => {
            format!("Similar to {} (distance {:.3})", anchor, distance)
        }
        (CandidateSource::Similarity, _, _) => "Similar to your pick".to_string(),
        (CandidateSource::Popularity, _, _) => match record.review_count {
            Some(count) => format!("Popular pick with {} reviews", count),
            None => "Popular pick".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{ItemId, SparseVector};

    // ============================================================================
    // Test Fixtures
    // ============================================================================

    fn record(id: ItemId, title: &str, mood: Mood, reviews: u64) -> ItemRecord {
        ItemRecord::new(id, title)
            .with_mood(mood)
            .with_review_count(reviews)
    }

    /// Two clusters in feature space: columns 0/1 and column 2
    fn build_test_orchestrator() -> RecommendationOrchestrator {
        let catalog = Catalog::from_records(vec![
            record(1, "Farm Days", Mood::Relaxing, 100)
                .with_tags(["farming", "simulation"]),
            record(2, "Farm Nights", Mood::Horror, 40).with_tags(["farming", "horror"]),
            record(3, "Farm Friends", Mood::Relaxing, 70).with_tags(["farming", "casual"]),
            record(4, "Space Blaster", Mood::Intense, 500).with_tags(["shooter"]),
            record(5, "Space Blaster 2", Mood::Intense, 20).with_tags(["shooter", "action rpg"]),
        ])
        .unwrap();

        let rows = vec![
            SparseVector::from_pairs([(0, 1.0), (1, 0.2)]).unwrap(),
            SparseVector::from_pairs([(0, 1.0), (1, 0.4)]).unwrap(),
            SparseVector::from_pairs([(0, 1.0), (1, 0.6)]).unwrap(),
            SparseVector::from_pairs([(2, 1.0)]).unwrap(),
            SparseVector::from_pairs([(2, 1.0), (1, 0.1)]).unwrap(),
        ];
        let features = FeatureIndex::from_rows(3, rows).unwrap();
        let spec = NeighborIndexSpec {
            metric: data_loader::DistanceMetric::Cosine,
            n_neighbors: Some(6),
        };
        RecommendationOrchestrator::new(
            catalog,
            features,
            spec,
            EngineConfig {
                similar_limit: 2,
                fallback_limit: 3,
            },
        )
        .unwrap()
    }

    fn ids(outcome: &RecommendationOutcome) -> Vec<ItemId> {
        outcome.recommendations().iter().map(|r| r.record.id).collect()
    }

    // ============================================================================
    // Unit Tests: resolve
    // ============================================================================

    #[test]
    fn test_resolve_prefers_id_over_title() {
        let orchestrator = build_test_orchestrator();
        let anchor = AnchorRef {
            id: Some(4),
            title: Some("Farm Days".to_string()),
        };
        assert_eq!(orchestrator.resolve(&anchor), Some(3));
    }

    #[test]
    fn test_resolve_falls_back_to_title() {
        let orchestrator = build_test_orchestrator();
        let anchor = AnchorRef {
            id: Some(999),
            title: Some("farm days".to_string()),
        };
        assert_eq!(orchestrator.resolve(&anchor), Some(0));
        assert_eq!(orchestrator.resolve(&AnchorRef::title("Nope")), None);
    }

    // ============================================================================
    // Unit Tests: recommend
    // ============================================================================

    #[test]
    fn test_similarity_path_ranks_by_distance() {
        let orchestrator = build_test_orchestrator();
        let outcome = orchestrator
            .recommend(&Query::new().with_anchor(AnchorRef::id(1)))
            .unwrap();

        assert_eq!(ids(&outcome), vec![2, 3]);
        let recs = outcome.recommendations();
        assert_eq!(recs[0].rank, 1);
        assert_eq!(recs[0].source, CandidateSource::Similarity);
        assert!(recs[0].distance.unwrap() <= recs[1].distance.unwrap());
        assert!(recs[0].explanation.starts_with("Similar to Farm Days"));
    }

    #[test]
    fn test_similarity_path_applies_mood_not_genre() {
        let orchestrator = build_test_orchestrator();
        let query = Query::new()
            .with_anchor(AnchorRef::id(1))
            .with_mood(Mood::Relaxing)
            .with_genre("shooter");

        let outcome = orchestrator.recommend(&query).unwrap();
        assert_eq!(ids(&outcome), vec![3]);
    }

    #[test]
    fn test_anchor_mood_does_not_gate_resolution() {
        let orchestrator = build_test_orchestrator();
        // anchor is relaxing, neighbors filtered to horror
        let query = Query::new()
            .with_anchor(AnchorRef::title("Farm Days"))
            .with_mood(Mood::Horror);

        let outcome = orchestrator.recommend(&query).unwrap();
        assert_eq!(ids(&outcome), vec![2]);
    }

    #[test]
    fn test_fallback_path_ranks_by_popularity() {
        let orchestrator = build_test_orchestrator();
        let outcome = orchestrator.recommend(&Query::new()).unwrap();

        assert_eq!(ids(&outcome), vec![4, 1, 3]);
        let recs = outcome.recommendations();
        assert_eq!(recs[0].source, CandidateSource::Popularity);
        assert_eq!(recs[0].explanation, "Popular pick with 500 reviews");
    }

    #[test]
    fn test_fallback_path_applies_genre() {
        let orchestrator = build_test_orchestrator();
        let outcome = orchestrator.recommend(&Query::new().with_genre("rpg")).unwrap();
        assert_eq!(ids(&outcome), vec![5]);
    }

    #[test]
    fn test_unknown_anchor_is_not_found() {
        let orchestrator = build_test_orchestrator();
        let outcome = orchestrator
            .recommend(&Query::new().with_anchor(AnchorRef::id(424242)))
            .unwrap();
        assert_eq!(outcome, RecommendationOutcome::NotFound(AnchorRef::id(424242)));
    }

    #[test]
    fn test_everything_filtered_is_empty_result() {
        let orchestrator = build_test_orchestrator();
        let query = Query::new().with_mood(Mood::Brainy);
        assert_eq!(
            orchestrator.recommend(&query).unwrap(),
            RecommendationOutcome::EmptyResult
        );
    }

    #[test]
    fn test_details_lookup() {
        let orchestrator = build_test_orchestrator();
        assert_eq!(
            orchestrator.details(&AnchorRef::title("SPACE BLASTER")).unwrap().id,
            4
        );
        assert!(orchestrator.details(&AnchorRef::id(77)).is_none());
    }

    #[test]
    fn test_misaligned_state_rejected() {
        let catalog = Catalog::from_records(vec![ItemRecord::new(1, "Lonely")]).unwrap();
        let result = RecommendationOrchestrator::new(
            catalog,
            FeatureIndex::default(),
            NeighborIndexSpec::default(),
            EngineConfig::default(),
        );
        assert!(matches!(result, Err(EngineError::Load(_))));
    }

    #[test]
    fn test_orchestrator_is_shareable() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<RecommendationOrchestrator>();
    }
}
