//! Similarity Source - nearest neighbors in feature space
//!
//! Generates candidates that read like the anchor game:
//! "Games whose descriptions and tags look like this one"
//!
//! ## Algorithm
//! 1. Look up the anchor's sparse feature vector by catalog position
//! 2. Compute the distance from the anchor to every other row (parallel)
//! 3. Select the `k` closest with a total order: distance, then position
//! 4. Return them ascending, never padded
//!
//! The anchor is dropped before truncation, so a query for `k` neighbors
//! returns `k` other games whenever the catalog has that many.

use crate::types::{Candidate, CandidateSource};
use anyhow::{bail, Context, Result};
use data_loader::{
    verify_alignment, Catalog, DistanceMetric, FeatureIndex, NeighborIndexSpec, RowId,
    SparseVector,
};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, instrument};

/// One search hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: RowId,
    pub distance: f32,
}

impl Neighbor {
    fn total_cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.position.cmp(&other.position))
    }
}

/// Similarity source over the prebuilt feature index
#[derive(Debug)]
pub struct SimilaritySource {
    catalog: Arc<Catalog>,
    features: Arc<FeatureIndex>,
    spec: NeighborIndexSpec,
    /// L2 norm of every row, computed once
    norms: Vec<f32>,
}

impl SimilaritySource {
    /// Build the source; fails if catalog and features are not row-aligned
    pub fn new(
        catalog: Arc<Catalog>,
        features: Arc<FeatureIndex>,
        spec: NeighborIndexSpec,
    ) -> Result<Self> {
        verify_alignment(&catalog, &features).context("Feature index does not match catalog")?;

        let norms: Vec<f32> = features.rows().par_iter().map(|v| v.norm()).collect();
        debug!(
            "Similarity source ready: {} rows, metric {:?}",
            norms.len(),
            spec.metric
        );

        Ok(Self {
            catalog,
            features,
            spec,
            norms,
        })
    }

    pub fn metric(&self) -> DistanceMetric {
        self.spec.metric
    }

    /// Most neighbors a single query may return
    pub fn max_results(&self) -> usize {
        self.spec.max_results()
    }

    /// The `k` nearest rows to `position`, ascending by distance.
    ///
    /// `k` is further capped by the fitted neighbor count. The anchor row is
    /// never part of the output.
    #[instrument(skip(self))]
    pub fn neighbors(&self, position: RowId, k: usize) -> Result<Vec<Neighbor>> {
        let Some(anchor) = self.features.vector_at(position) else {
            bail!(
                "Position {} is outside the feature index ({} rows)",
                position,
                self.features.row_count()
            );
        };

        let k = k.min(self.max_results());
        if k == 0 {
            return Ok(Vec::new());
        }

        let anchor_norm = self.norms[position];
        let mut hits: Vec<Neighbor> = self
            .features
            .rows()
            .par_iter()
            .enumerate()
            .filter(|(row, _)| *row != position)
            .map(|(row, vector)| Neighbor {
                position: row,
                distance: self.distance(anchor, anchor_norm, vector, self.norms[row]),
            })
            .collect();

        if hits.len() > k {
            hits.select_nth_unstable_by(k - 1, Neighbor::total_cmp);
            hits.truncate(k);
        }
        hits.sort_unstable_by(Neighbor::total_cmp);

        debug!("Found {} neighbors for position {}", hits.len(), position);
        Ok(hits)
    }

    /// Neighbors of `position` as similarity candidates
    #[instrument(skip(self))]
    pub fn get_candidates(&self, position: RowId, k: usize) -> Result<Vec<Candidate>> {
        self.neighbors(position, k)?
            .into_iter()
            .map(|hit| {
                let record = self
                    .catalog
                    .record_at(hit.position)
                    .with_context(|| format!("No catalog row at position {}", hit.position))?;
                Ok(Candidate::new(hit.position, record.id, CandidateSource::Similarity)
                    .with_distance(hit.distance))
            })
            .collect()
    }

    fn distance(&self, a: &SparseVector, a_norm: f32, b: &SparseVector, b_norm: f32) -> f32 {
        match self.spec.metric {
            DistanceMetric::Cosine => {
                if a_norm == 0.0 || b_norm == 0.0 {
                    return 1.0;
                }
                1.0 - a.dot(b) / (a_norm * b_norm)
            }
            DistanceMetric::Euclidean => {
                let squared = a_norm * a_norm + b_norm * b_norm - 2.0 * a.dot(b);
                squared.max(0.0).sqrt()
            }
            DistanceMetric::Manhattan => a.l1_distance(b),
        }
    }
}
