//! Query types.
//!
//! A query is an optional anchor (id and/or title), an optional mood and an
//! optional genre token. Every combination is accepted, including the empty
//! query, which means "most popular overall".

use data_loader::{ItemId, Mood};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Query has no anchor, mood or genre")]
    AmbiguousInput,
}

/// How the caller identified the anchor game.
///
/// The id is tried first, the title second.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorRef {
    pub id: Option<ItemId>,
    pub title: Option<String>,
}

impl AnchorRef {
    pub fn id(id: ItemId) -> Self {
        Self {
            id: Some(id),
            title: None,
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: Some(title.into()),
        }
    }

    /// Parse free text: all digits is an id, anything else a title
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if text.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(id) = text.parse::<ItemId>() {
                return Some(Self::id(id));
            }
        }
        Some(Self::title(text))
    }

    /// Whether anything usable was given
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self
                .title
                .as_deref()
                .is_none_or(|title| title.trim().is_empty())
    }
}

impl fmt::Display for AnchorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.id, &self.title) {
            (Some(id), Some(title)) => write!(f, "app {} / '{}'", id, title),
            (Some(id), None) => write!(f, "app {}", id),
            (None, Some(title)) => write!(f, "'{}'", title),
            (None, None) => write!(f, "<none>"),
        }
    }
}

/// A recommendation request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub anchor: Option<AnchorRef>,
    pub mood: Option<Mood>,
    pub genre: Option<String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query anchored on free text; see `AnchorRef::parse`
    pub fn from_anchor_text(text: &str) -> Self {
        Self {
            anchor: AnchorRef::parse(text),
            ..Self::default()
        }
    }

    pub fn with_anchor(mut self, anchor: AnchorRef) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn with_mood(mut self, mood: Mood) -> Self {
        self.mood = Some(mood);
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// The anchor, if one was given with usable content
    pub fn anchor(&self) -> Option<&AnchorRef> {
        self.anchor.as_ref().filter(|anchor| !anchor.is_empty())
    }

    /// Genre token with blank values treated as absent
    pub fn genre_token(&self) -> Option<&str> {
        self.genre
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// Strict validation for callers that want to reject empty queries.
    ///
    /// The engine itself answers an empty query with the popularity
    /// fallback; this is opt-in.
    pub fn require_discriminating_input(&self) -> Result<(), QueryError> {
        if self.anchor().is_none() && self.mood.is_none() && self.genre_token().is_none() {
            return Err(QueryError::AmbiguousInput);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_text_parsing() {
        assert_eq!(AnchorRef::parse("413150"), Some(AnchorRef::id(413150)));
        assert_eq!(AnchorRef::parse(" Portal 2 "), Some(AnchorRef::title("Portal 2")));
        assert_eq!(AnchorRef::parse("1942 Remake"), Some(AnchorRef::title("1942 Remake")));
        assert_eq!(AnchorRef::parse("   "), None);
        // too large for an id, so it is a title
        assert_eq!(
            AnchorRef::parse("99999999999"),
            Some(AnchorRef::title("99999999999"))
        );
    }

    #[test]
    fn test_blank_anchor_is_no_anchor() {
        let query = Query::new().with_anchor(AnchorRef::title("  "));
        assert!(query.anchor().is_none());
    }

    #[test]
    fn test_genre_token_trims() {
        assert_eq!(Query::new().with_genre(" rpg ").genre_token(), Some("rpg"));
        assert_eq!(Query::new().with_genre("   ").genre_token(), None);
    }

    #[test]
    fn test_strict_validation() {
        assert_eq!(
            Query::new().require_discriminating_input(),
            Err(QueryError::AmbiguousInput)
        );
        assert_eq!(
            Query::new().with_genre(" ").require_discriminating_input(),
            Err(QueryError::AmbiguousInput)
        );
        assert!(Query::new()
            .with_mood(Mood::Horror)
            .require_discriminating_input()
            .is_ok());
        assert!(Query::from_anchor_text("Portal")
            .require_discriminating_input()
            .is_ok());
    }

    #[test]
    fn test_anchor_display() {
        assert_eq!(AnchorRef::id(7).to_string(), "app 7");
        assert_eq!(AnchorRef::title("Celeste").to_string(), "'Celeste'");
    }
}
