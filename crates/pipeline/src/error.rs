//! Errors raised while building filters.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// A filter was asked to match an empty or whitespace-only token
    #[error("Invalid token {token:?} for {filter}")]
    InvalidFilterToken { filter: &'static str, token: String },
}
