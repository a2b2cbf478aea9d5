//! Filter to keep only games with the requested mood.

use crate::traits::Filter;
use data_loader::{ItemRecord, Mood};

/// Keeps records whose mood equals the requested one.
///
/// Records without a mood never match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodFilter {
    mood: Mood,
}

impl MoodFilter {
    pub fn new(mood: Mood) -> Self {
        Self { mood }
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }
}

impl Filter for MoodFilter {
    fn name(&self) -> &str {
        "MoodFilter"
    }

    fn matches(&self, record: &ItemRecord) -> bool {
        record.mood == Some(self.mood)
    }
}
