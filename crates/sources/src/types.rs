//! Candidate types shared by every source and by the filter pipeline.

use data_loader::{ItemId, RowId};

/// Which source proposed a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateSource {
    /// Nearest neighbor of an anchor in feature space
    Similarity,
    /// Popularity fallback (review count)
    Popularity,
}

/// A catalog row proposed for recommendation
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Catalog position; also the feature-index row
    pub position: RowId,
    pub item_id: ItemId,
    pub source: CandidateSource,
    /// Distance to the anchor, for similarity candidates
    pub distance: Option<f32>,
}

impl Candidate {
    pub fn new(position: RowId, item_id: ItemId, source: CandidateSource) -> Self {
        Self {
            position,
            item_id,
            source,
            distance: None,
        }
    }

    pub fn with_distance(mut self, distance: f32) -> Self {
        self.distance = Some(distance);
        self
    }
}
