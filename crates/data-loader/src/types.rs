//! Core domain types for the game catalog.
//!
//! This module defines the record schema the rest of the engine works with
//! and the in-memory `Catalog` that owns every record. Whatever column names
//! the source dataset used, by the time a record lands here it has exactly
//! one canonical shape.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a catalog item (a store app id)
pub type ItemId = u32;

/// Ordinal position of a record in load order.
///
/// The same position addresses the record's feature vector, so positions are
/// the only cross-reference between the catalog and the feature index.
pub type RowId = usize;

// =============================================================================
// Vocabularies
// =============================================================================

/// Coarse categorical mood tag used as a hard filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    General,
    Horror,
    Brainy,
    Intense,
    Relaxing,
}

impl Mood {
    /// Every mood, in the order a picker would list them
    pub const ALL: [Mood; 5] = [
        Mood::General,
        Mood::Horror,
        Mood::Brainy,
        Mood::Intense,
        Mood::Relaxing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::General => "general",
            Mood::Horror => "horror",
            Mood::Brainy => "brainy",
            Mood::Intense => "intense",
            Mood::Relaxing => "relaxing",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not part of a fixed vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub vocabulary: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.vocabulary, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

impl FromStr for Mood {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Mood::ALL
            .into_iter()
            .find(|mood| mood.as_str() == normalized)
            .ok_or_else(|| UnknownVariant {
                vocabulary: "mood",
                value: s.to_string(),
            })
    }
}

/// Aggregate review label, ordered from worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RatingLabel {
    OverwhelminglyNegative,
    VeryNegative,
    Negative,
    MostlyNegative,
    Mixed,
    MostlyPositive,
    Positive,
    VeryPositive,
    OverwhelminglyPositive,
}

impl RatingLabel {
    pub const ALL: [RatingLabel; 9] = [
        RatingLabel::OverwhelminglyNegative,
        RatingLabel::VeryNegative,
        RatingLabel::Negative,
        RatingLabel::MostlyNegative,
        RatingLabel::Mixed,
        RatingLabel::MostlyPositive,
        RatingLabel::Positive,
        RatingLabel::VeryPositive,
        RatingLabel::OverwhelminglyPositive,
    ];

    /// The label as the store displays it
    pub fn as_str(&self) -> &'static str {
        match self {
            RatingLabel::OverwhelminglyNegative => "Overwhelmingly Negative",
            RatingLabel::VeryNegative => "Very Negative",
            RatingLabel::Negative => "Negative",
            RatingLabel::MostlyNegative => "Mostly Negative",
            RatingLabel::Mixed => "Mixed",
            RatingLabel::MostlyPositive => "Mostly Positive",
            RatingLabel::Positive => "Positive",
            RatingLabel::VeryPositive => "Very Positive",
            RatingLabel::OverwhelminglyPositive => "Overwhelmingly Positive",
        }
    }
}

impl fmt::Display for RatingLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RatingLabel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        RatingLabel::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownVariant {
                vocabulary: "rating label",
                value: s.to_string(),
            })
    }
}

/// Platforms an item ships on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformFlags {
    pub windows: bool,
    pub mac: bool,
    pub linux: bool,
}

// =============================================================================
// Item Records
// =============================================================================

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    /// Display title, as loaded. Lookups go through `normalize_title`.
    pub title: String,
    /// Lower-cased, de-duplicated descriptive tags
    pub tags: Vec<String>,
    pub mood: Option<Mood>,
    /// `None` means the item is free
    pub price: Option<f64>,
    pub release_date: Option<NaiveDate>,
    pub platforms: PlatformFlags,
    pub rating_label: Option<RatingLabel>,
    pub review_count: Option<u64>,
    pub description: String,
}

impl ItemRecord {
    /// Create a record with only the required fields set
    pub fn new(id: ItemId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            tags: Vec::new(),
            mood: None,
            price: None,
            release_date: None,
            platforms: PlatformFlags::default(),
            rating_label: None,
            review_count: None,
            description: String::new(),
        }
    }

    pub fn with_mood(mut self, mood: Mood) -> Self {
        self.mood = Some(mood);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = normalize_tags(tags);
        self
    }

    pub fn with_review_count(mut self, count: u64) -> Self {
        self.review_count = Some(count);
        self
    }
}

/// Normalize a title for case-insensitive exact lookup
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Trim, lower-case and de-duplicate tags, keeping first-seen order
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim().to_lowercase();
        if !tag.is_empty() && !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    normalized
}

// =============================================================================
// Catalog - The In-Memory Store
// =============================================================================

/// Immutable, load-ordered table of item records.
///
/// Records live in a fixed `Vec`; the two hash indices only ever point into
/// it by position. Nothing can reorder the vector after construction, which
/// keeps row `i` aligned with feature vector `i`.
#[derive(Debug, Default)]
pub struct Catalog {
    pub(crate) records: Vec<ItemRecord>,
    pub(crate) id_index: HashMap<ItemId, RowId>,
    /// Normalized title -> first row carrying it
    pub(crate) title_index: HashMap<String, RowId>,
}

impl Catalog {
    /// Find a record by identifier
    pub fn find_by_id(&self, id: ItemId) -> Option<&ItemRecord> {
        self.position_of_id(id).map(|row| &self.records[row])
    }

    /// Find a record by case-insensitive exact title.
    ///
    /// When several records share a title the first-loaded one wins.
    pub fn find_by_title(&self, title: &str) -> Option<&ItemRecord> {
        self.position_of_title(title).map(|row| &self.records[row])
    }

    pub fn position_of_id(&self, id: ItemId) -> Option<RowId> {
        self.id_index.get(&id).copied()
    }

    pub fn position_of_title(&self, title: &str) -> Option<RowId> {
        self.title_index.get(&normalize_title(title)).copied()
    }

    pub fn record_at(&self, row: RowId) -> Option<&ItemRecord> {
        self.records.get(row)
    }

    /// All records in load order
    pub fn all(&self) -> &[ItemRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Case-insensitive title search: exact matches first, then substring
    /// matches, each group ordered by review count descending.
    pub fn search_titles(&self, fragment: &str, limit: usize) -> Vec<&ItemRecord> {
        let needle = normalize_title(fragment);
        if needle.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<(u8, &ItemRecord)> = self
            .records
            .iter()
            .filter_map(|record| {
                let title = normalize_title(&record.title);
                if title == needle {
                    Some((0, record))
                } else if title.contains(&needle) {
                    Some((1, record))
                } else {
                    None
                }
            })
            .collect();

        matches.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| b.1.review_count.cmp(&a.1.review_count))
        });
        matches.truncate(limit);
        matches.into_iter().map(|(_, record)| record).collect()
    }
}
