//! Pre-built text features and neighbor-index parameters.
//!
//! The vectorizer and the k-NN model are fitted upstream. What reaches us is
//! a sparse matrix in compressed-sparse-row form (one row per catalog record,
//! same order) plus the parameters the neighbor model was fitted with.

use crate::error::{DataLoadError, Result};
use crate::types::RowId;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

// =============================================================================
// Sparse vectors
// =============================================================================

/// Sparse feature vector with strictly increasing column indices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    indices: Vec<u32>,
    values: Vec<f32>,
}

impl SparseVector {
    /// Build from `(column, value)` pairs.
    ///
    /// Zeros are dropped, pairs are sorted by column. Duplicate columns and
    /// non-finite values are rejected.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (u32, f32)>) -> Result<Self> {
        let mut sorted: Vec<(u32, f32)> = pairs.into_iter().filter(|(_, v)| *v != 0.0).collect();
        sorted.sort_by_key(|(column, _)| *column);

        for window in sorted.windows(2) {
            if window[0].0 == window[1].0 {
                return Err(DataLoadError::InvalidFeatureMatrix(format!(
                    "duplicate column {} in sparse row",
                    window[0].0
                )));
            }
        }
        if let Some((column, value)) = sorted.iter().find(|(_, v)| !v.is_finite()) {
            return Err(DataLoadError::InvalidFeatureMatrix(format!(
                "non-finite value {} at column {}",
                value, column
            )));
        }

        let (indices, values) = sorted.into_iter().unzip();
        Ok(Self { indices, values })
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Number of stored (non-zero) entries
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// L2 norm
    pub fn norm(&self) -> f32 {
        self.values.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    /// Dot product via a merge over both index lists
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Sum of absolute differences over the union of stored columns
    pub fn l1_distance(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.indices.len() || j < other.indices.len() {
            let left = self.indices.get(i);
            let right = other.indices.get(j);
            match (left, right) {
                (Some(a), Some(b)) if a == b => {
                    sum += (self.values[i] - other.values[j]).abs();
                    i += 1;
                    j += 1;
                }
                (Some(a), Some(b)) if a < b => {
                    sum += self.values[i].abs();
                    i += 1;
                }
                (Some(_), None) => {
                    sum += self.values[i].abs();
                    i += 1;
                }
                _ => {
                    sum += other.values[j].abs();
                    j += 1;
                }
            }
        }
        sum
    }
}

// =============================================================================
// Feature index
// =============================================================================

/// Compressed-sparse-row matrix as written by the upstream vectorizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrMatrix {
    /// `[rows, cols]`
    pub shape: [usize; 2],
    pub indptr: Vec<usize>,
    pub indices: Vec<u32>,
    pub data: Vec<f32>,
}

/// Row-addressed feature vectors, aligned with catalog positions
#[derive(Debug, Clone, Default)]
pub struct FeatureIndex {
    n_features: usize,
    rows: Vec<SparseVector>,
}

impl FeatureIndex {
    /// Build from already materialized rows
    pub fn from_rows(n_features: usize, rows: Vec<SparseVector>) -> Result<Self> {
        for (row, vector) in rows.iter().enumerate() {
            if let Some(&column) = vector.indices().last()
                && column as usize >= n_features
            {
                return Err(DataLoadError::InvalidFeatureMatrix(format!(
                    "row {} references column {} but matrix has {} columns",
                    row, column, n_features
                )));
            }
        }
        Ok(Self { n_features, rows })
    }

    /// Validate a CSR matrix and materialize its rows in parallel
    pub fn from_csr(matrix: CsrMatrix) -> Result<Self> {
        let [n_rows, n_cols] = matrix.shape;

        if matrix.indptr.len() != n_rows + 1 {
            return Err(DataLoadError::InvalidFeatureMatrix(format!(
                "indptr has {} entries, expected {}",
                matrix.indptr.len(),
                n_rows + 1
            )));
        }
        if matrix.indices.len() != matrix.data.len() {
            return Err(DataLoadError::InvalidFeatureMatrix(format!(
                "{} column indices but {} values",
                matrix.indices.len(),
                matrix.data.len()
            )));
        }
        if matrix.indptr.first() != Some(&0)
            || matrix.indptr.last() != Some(&matrix.indices.len())
            || matrix.indptr.windows(2).any(|w| w[0] > w[1])
        {
            return Err(DataLoadError::InvalidFeatureMatrix(
                "indptr must start at 0, be non-decreasing and end at nnz".to_string(),
            ));
        }

        let rows = (0..n_rows)
            .into_par_iter()
            .map(|row| {
                let span = matrix.indptr[row]..matrix.indptr[row + 1];
                let pairs = matrix.indices[span.clone()]
                    .iter()
                    .copied()
                    .zip(matrix.data[span].iter().copied());
                SparseVector::from_pairs(pairs)
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_rows(n_cols, rows)
    }

    /// Feature vector for the record at `row`
    pub fn vector_at(&self, row: RowId) -> Option<&SparseVector> {
        self.rows.get(row)
    }

    pub fn rows(&self) -> &[SparseVector] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }
}

// =============================================================================
// Neighbor index parameters
// =============================================================================

/// Distance the neighbor model was fitted with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Cosine,
    Euclidean,
    Manhattan,
}

/// Parameters of the fitted neighbor model.
///
/// `n_neighbors` counts the query point itself, the way a fitted k-NN model
/// reports it, so at most `n_neighbors - 1` other items come back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborIndexSpec {
    #[serde(default)]
    pub metric: DistanceMetric,
    #[serde(default)]
    pub n_neighbors: Option<usize>,
}

impl NeighborIndexSpec {
    /// Upper bound on neighbors returned per query, excluding the anchor
    pub fn max_results(&self) -> usize {
        self.n_neighbors
            .map(|n| n.saturating_sub(1))
            .unwrap_or(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(pairs: &[(u32, f32)]) -> SparseVector {
        SparseVector::from_pairs(pairs.iter().copied()).unwrap()
    }

    #[test]
    fn test_from_pairs_sorts_and_drops_zeros() {
        let v = vector(&[(5, 1.0), (2, 0.0), (1, 2.0)]);
        assert_eq!(v.indices(), &[1, 5]);
        assert_eq!(v.values(), &[2.0, 1.0]);
    }

    #[test]
    fn test_from_pairs_rejects_duplicates() {
        let result = SparseVector::from_pairs(vec![(3, 1.0), (3, 2.0)]);
        assert!(matches!(result, Err(DataLoadError::InvalidFeatureMatrix(_))));
    }

    #[test]
    fn test_dot_and_l1() {
        let a = vector(&[(0, 1.0), (2, 3.0)]);
        let b = vector(&[(2, 2.0), (4, 1.0)]);
        assert_eq!(a.dot(&b), 6.0);
        // |1| + |3-2| + |1|
        assert_eq!(a.l1_distance(&b), 3.0);
        assert_eq!(a.l1_distance(&a), 0.0);
    }

    #[test]
    fn test_from_csr() {
        let matrix = CsrMatrix {
            shape: [3, 4],
            indptr: vec![0, 2, 2, 3],
            indices: vec![0, 3, 1],
            data: vec![0.5, 0.5, 1.0],
        };
        let index = FeatureIndex::from_csr(matrix).unwrap();
        assert_eq!(index.row_count(), 3);
        assert_eq!(index.n_features(), 4);
        assert_eq!(index.vector_at(1).unwrap().nnz(), 0);
        assert_eq!(index.vector_at(2).unwrap().indices(), &[1]);
        assert!(index.vector_at(3).is_none());
    }

    #[test]
    fn test_from_csr_rejects_bad_indptr() {
        let matrix = CsrMatrix {
            shape: [2, 4],
            indptr: vec![0, 2],
            indices: vec![0, 1],
            data: vec![1.0, 1.0],
        };
        assert!(FeatureIndex::from_csr(matrix).is_err());
    }

    #[test]
    fn test_from_csr_rejects_column_out_of_range() {
        let matrix = CsrMatrix {
            shape: [1, 2],
            indptr: vec![0, 1],
            indices: vec![7],
            data: vec![1.0],
        };
        assert!(FeatureIndex::from_csr(matrix).is_err());
    }

    #[test]
    fn test_neighbor_spec_max_results() {
        let spec = NeighborIndexSpec {
            metric: DistanceMetric::Cosine,
            n_neighbors: Some(6),
        };
        assert_eq!(spec.max_results(), 5);
        assert_eq!(NeighborIndexSpec::default().max_results(), usize::MAX);
    }
}
