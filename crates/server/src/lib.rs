//! Server crate for the game recommendation engine.
//!
//! This crate contains the orchestrator that coordinates all components
//! of the recommendation pipeline, plus the query, configuration and
//! presentation types front ends build on.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod presentation;
pub mod query;

pub use config::{AppConfig, ConfigError, EngineConfig};
pub use error::EngineError;
pub use orchestrator::{GameRecommendation, RecommendationOrchestrator, RecommendationOutcome};
pub use query::{AnchorRef, Query, QueryError};
