//! Filter to keep only games tagged with a genre.
//!
//! The requested token has to appear as a whole word somewhere in the
//! record's tags, so `rpg` matches `rpg` and `action rpg` but not
//! `rpgmaker`.

use crate::error::FilterError;
use crate::traits::Filter;
use data_loader::ItemRecord;
use regex::{Regex, RegexBuilder};

/// Keeps records whose tags contain the token as a whole word.
#[derive(Debug, Clone)]
pub struct GenreFilter {
    token: String,
    pattern: Regex,
}

impl GenreFilter {
    /// Build a filter for `token`.
    ///
    /// Surrounding whitespace is ignored. Regex metacharacters in the token
    /// are matched literally.
    pub fn new(token: &str) -> Result<Self, FilterError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(FilterError::InvalidFilterToken {
                filter: "GenreFilter",
                token: token.to_string(),
            });
        }

        let pattern = RegexBuilder::new(&format!(r"\b{}\b", regex::escape(token)))
            .case_insensitive(true)
            .build()
            .map_err(|_| FilterError::InvalidFilterToken {
                filter: "GenreFilter",
                token: token.to_string(),
            })?;

        Ok(Self {
            token: token.to_string(),
            pattern,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl Filter for GenreFilter {
    fn name(&self) -> &str {
        "GenreFilter"
    }

    fn matches(&self, record: &ItemRecord) -> bool {
        self.pattern.is_match(&record.tags.join(", "))
    }
}
