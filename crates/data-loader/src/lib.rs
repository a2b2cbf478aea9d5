//! # Data Loader Crate
//!
//! This crate turns the upstream artifacts into immutable engine state.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (ItemRecord, Mood, RatingLabel, Catalog)
//! - **parser**: Parse the catalog CSV and the JSON model artifacts
//! - **features**: Sparse feature vectors, the FeatureIndex, neighbor parameters
//! - **index**: Catalog construction, alignment checks, artifact loading
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{ArtifactPaths, EngineArtifacts};
//!
//! let artifacts = EngineArtifacts::load_from_files(&ArtifactPaths::default())?;
//!
//! let game = artifacts.catalog.find_by_title("stardew valley").unwrap();
//! let row = artifacts.catalog.position_of_id(game.id).unwrap();
//! let vector = artifacts.features.vector_at(row).unwrap();
//!
//! println!("{} has {} non-zero features", game.title, vector.nnz());
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod features;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use features::{CsrMatrix, DistanceMetric, FeatureIndex, NeighborIndexSpec, SparseVector};
pub use index::{verify_alignment, ArtifactPaths, EngineArtifacts};
pub use types::{
    // Type aliases
    ItemId,
    RowId,
    // Core types
    Catalog,
    ItemRecord,
    PlatformFlags,
    UnknownVariant,
    // Enums
    Mood,
    RatingLabel,
    // Helpers
    normalize_tags,
    normalize_title,
};
