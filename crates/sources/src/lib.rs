//! # Sources Crate
//!
//! This crate implements candidate generation for game recommendations.
//!
//! ## Components
//!
//! ### Similarity Source
//! Content similarity over the prebuilt feature index:
//! - "Games that read like the one you picked"
//! - Exact nearest-neighbor search, anchor excluded, deterministic order
//!
//! ### Popularity Source
//! The fallback ranker:
//! - Review count descending, absent counts last, stable on ties
//! - Used when there is no anchor to search from
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{PopularitySource, SimilaritySource};
//! use data_loader::{ArtifactPaths, EngineArtifacts};
//! use std::sync::Arc;
//!
//! let artifacts = EngineArtifacts::load_from_files(&ArtifactPaths::default())?;
//! let catalog = Arc::new(artifacts.catalog);
//! let features = Arc::new(artifacts.features);
//!
//! let similarity = SimilaritySource::new(catalog.clone(), features, artifacts.neighbor_spec)?;
//! let popularity = PopularitySource::new(catalog.clone());
//!
//! let anchor = catalog.position_of_title("portal 2").unwrap();
//! let similar = similarity.get_candidates(anchor, 5)?;
//! let popular = popularity.get_candidates(5);
//! ```

// Public modules
pub mod types;
pub mod similarity;
pub mod popularity;

// Re-export commonly used types
pub use types::{Candidate, CandidateSource};
pub use similarity::{Neighbor, SimilaritySource};
pub use popularity::PopularitySource;

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Catalog, FeatureIndex, ItemRecord, NeighborIndexSpec, SparseVector};
    use std::sync::Arc;

    fn create_test_catalog() -> Arc<Catalog> {
        Arc::new(
            Catalog::from_records(vec![
                ItemRecord::new(1, "Alpha").with_review_count(5),
                ItemRecord::new(2, "Beta").with_review_count(50),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_sources_share_one_catalog() {
        let catalog = create_test_catalog();
        let rows = vec![
            SparseVector::from_pairs([(0, 1.0)]).unwrap(),
            SparseVector::from_pairs([(0, 1.0)]).unwrap(),
        ];
        let features = Arc::new(FeatureIndex::from_rows(1, rows).unwrap());

        let similarity =
            SimilaritySource::new(catalog.clone(), features, NeighborIndexSpec::default()).unwrap();
        let popularity = PopularitySource::new(catalog.clone());

        assert_eq!(similarity.get_candidates(0, 5).unwrap()[0].item_id, 2);
        assert_eq!(popularity.get_candidates(1)[0].item_id, 2);
        assert_eq!(Arc::strong_count(&catalog), 3);
    }

    #[test]
    fn test_candidate_creation() {
        let candidate = Candidate::new(4, 40, CandidateSource::Similarity).with_distance(0.25);
        assert_eq!(candidate.position, 4);
        assert_eq!(candidate.item_id, 40);
        assert_eq!(candidate.distance, Some(0.25));
    }
}
