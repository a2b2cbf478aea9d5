//! Catalog building and artifact loading.
//!
//! This is where the three upstream artifacts become engine state:
//! - the catalog CSV becomes a `Catalog` with id and title indices
//! - the CSR matrix becomes a `FeatureIndex`
//! - the neighbor parameters become a `NeighborIndexSpec`
//!
//! The one structural invariant between them (row `i` of the catalog is row
//! `i` of the feature matrix) is checked here, once.

use crate::error::{DataLoadError, Result};
use crate::features::{FeatureIndex, NeighborIndexSpec};
use crate::parser;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};
use tracing::info;

impl Catalog {
    /// Build a catalog from records in load order.
    ///
    /// Fails if two records share an id. Duplicate titles are fine; title
    /// lookups resolve to the first one.
    pub fn from_records(records: Vec<ItemRecord>) -> Result<Self> {
        let mut id_index = HashMap::with_capacity(records.len());
        let mut title_index = HashMap::with_capacity(records.len());

        for (row, record) in records.iter().enumerate() {
            match id_index.entry(record.id) {
                Entry::Occupied(existing) => {
                    return Err(DataLoadError::DuplicateId {
                        id: record.id,
                        first: *existing.get(),
                        second: row,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(row);
                }
            }
            title_index
                .entry(normalize_title(&record.title))
                .or_insert(row);
        }

        Ok(Self {
            records,
            id_index,
            title_index,
        })
    }
}

/// Fail unless every catalog row has exactly one feature row
pub fn verify_alignment(catalog: &Catalog, features: &FeatureIndex) -> Result<()> {
    if catalog.len() != features.row_count() {
        return Err(DataLoadError::ConfigurationMismatch {
            catalog_rows: catalog.len(),
            feature_rows: features.row_count(),
        });
    }
    Ok(())
}

/// Where the three artifacts live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    pub catalog: PathBuf,
    pub feature_matrix: PathBuf,
    pub neighbor_index: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from("data/cleaned_games.csv"),
            feature_matrix: PathBuf::from("models/tfidf_matrix.json"),
            neighbor_index: PathBuf::from("models/knn_model.json"),
        }
    }
}

impl ArtifactPaths {
    /// Default file names under a single directory
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            catalog: dir.join("cleaned_games.csv"),
            feature_matrix: dir.join("tfidf_matrix.json"),
            neighbor_index: dir.join("knn_model.json"),
        }
    }
}

/// Everything the engine needs, loaded and cross-checked
#[derive(Debug)]
pub struct EngineArtifacts {
    pub catalog: Catalog,
    pub features: FeatureIndex,
    pub neighbor_spec: NeighborIndexSpec,
}

impl EngineArtifacts {
    /// Load all artifacts.
    ///
    /// The catalog and the feature matrix are parsed in parallel. File
    /// handles are scoped to the individual parsers and are closed whether
    /// parsing succeeds or fails.
    pub fn load_from_files(paths: &ArtifactPaths) -> Result<Self> {
        info!(
            "Loading catalog from {:?}, features from {:?}, neighbor index from {:?}",
            paths.catalog, paths.feature_matrix, paths.neighbor_index
        );

        let ((records, features), neighbor_spec) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_catalog(&paths.catalog),
                    || parser::parse_feature_matrix(&paths.feature_matrix),
                )
            },
            || parser::parse_neighbor_spec(&paths.neighbor_index),
        );

        let records = records?;
        let features = features?;
        let neighbor_spec = neighbor_spec?;

        info!(
            "Parsed {} catalog rows, {} feature rows ({} features)",
            records.len(),
            features.row_count(),
            features.n_features()
        );

        let catalog = Catalog::from_records(records)?;
        verify_alignment(&catalog, &features)?;

        info!(
            "Artifacts aligned: {} items, metric {:?}, n_neighbors {:?}",
            catalog.len(),
            neighbor_spec.metric,
            neighbor_spec.n_neighbors
        );
        Ok(Self {
            catalog,
            features,
            neighbor_spec,
        })
    }
}
