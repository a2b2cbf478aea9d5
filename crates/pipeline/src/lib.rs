//! Pipeline for filtering game candidates by attributes.
//!
//! This crate provides:
//! - Filter trait and implementations for candidate filtering
//! - FilterPipeline for composing filters
//!
//! ## Architecture
//! Filters are pure predicates over a catalog record. The pipeline applies
//! them in sequence, either to candidates from a source (resolving each
//! candidate's record through the catalog) or to the catalog directly.
//! Order is always preserved, so a ranked input stays ranked.
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::FilterPipeline;
//! use pipeline::filters::*;
//!
//! let pipeline = FilterPipeline::new()
//!     .add_filter(MoodFilter::new(Mood::Relaxing))
//!     .add_filter(GenreFilter::new("puzzle")?);
//!
//! let filtered = pipeline.apply(candidates, &catalog)?;
//! let matching = pipeline.filter_catalog(&catalog);
//! ```

pub mod error;
pub mod traits;
pub mod filters;
pub mod filter_pipeline;

// Re-export main types
pub use error::FilterError;
pub use traits::Filter;
pub use filter_pipeline::FilterPipeline;
