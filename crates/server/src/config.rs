//! Engine configuration.
//!
//! Read from an optional TOML file:
//!
//! ```toml
//! [artifacts]
//! catalog = "data/cleaned_games.csv"
//! feature_matrix = "models/tfidf_matrix.json"
//! neighbor_index = "models/knn_model.json"
//!
//! [engine]
//! similar_limit = 5
//! fallback_limit = 5
//! ```
//!
//! Every key is optional; missing keys take their defaults.

use data_loader::ArtifactPaths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Result-size limits for the two recommendation paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Neighbors requested for an anchored query
    pub similar_limit: usize,
    /// Items returned by the popularity fallback
    pub fallback_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            similar_limit: 5,
            fallback_limit: 5,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.similar_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.similar_limit",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.fallback_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.fallback_limit",
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub artifacts: ArtifactPaths,
    pub engine: EngineConfig,
}

impl AppConfig {
    /// Load and validate a config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.engine.similar_limit, 5);
        assert_eq!(config.engine.fallback_limit, 5);
    }

    #[test]
    fn test_partial_config() {
        let config = AppConfig::from_toml_str(
            r#"
            [artifacts]
            catalog = "games.csv"

            [engine]
            fallback_limit = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.artifacts.catalog, PathBuf::from("games.csv"));
        assert_eq!(
            config.artifacts.feature_matrix,
            ArtifactPaths::default().feature_matrix
        );
        assert_eq!(config.engine.similar_limit, 5);
        assert_eq!(config.engine.fallback_limit, 10);
    }

    #[test]
    fn test_zero_limit_rejected() {
        let result = AppConfig::from_toml_str("[engine]\nsimilar_limit = 0\n");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                field: "engine.similar_limit",
                ..
            })
        ));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            AppConfig::from_toml_str("[engine\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game-recs.toml");
        fs::write(&path, "[engine]\nsimilar_limit = 8\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.engine.similar_limit, 8);

        let missing = AppConfig::from_file(&dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
