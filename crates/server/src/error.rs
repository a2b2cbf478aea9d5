//! Errors raised while bringing the engine up.
//!
//! Per-request outcomes such as an unknown anchor or an empty result are not
//! errors; they are variants of `RecommendationOutcome`.

use crate::config::ConfigError;
use data_loader::DataLoadError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to load artifacts: {0}")]
    Load(#[from] DataLoadError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
