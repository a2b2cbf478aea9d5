//! The FilterPipeline orchestrates multiple filters.
//!
//! This module provides the main FilterPipeline struct that chains
//! multiple filters together using the builder pattern.

use crate::filters::{GenreFilter, MoodFilter};
use crate::traits::Filter;
use anyhow::{Context, Result};
use data_loader::{Catalog, ItemRecord, Mood};
use rayon::prelude::*;
use sources::Candidate;
use tracing;

/// Chains multiple filters together into a processing pipeline.
///
/// A record passes the pipeline when it passes every filter. An empty
/// pipeline passes everything.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(MoodFilter::new(Mood::Horror))
///     .add_filter(GenreFilter::new("survival")?);
///
/// let filtered = pipeline.apply(candidates, &catalog)?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Pipeline for the optional mood and genre of a query.
    ///
    /// A blank genre token is not an error here: it means no genre filter.
    pub fn for_attributes(mood: Option<Mood>, genre: Option<&str>) -> Self {
        let mut pipeline = Self::new();
        if let Some(mood) = mood {
            pipeline = pipeline.add_filter(MoodFilter::new(mood));
        }
        if let Some(token) = genre {
            match GenreFilter::new(token) {
                Ok(filter) => pipeline = pipeline.add_filter(filter),
                Err(e) => tracing::debug!("Skipping genre filter: {}", e),
            }
        }
        pipeline
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Names of the filters, in application order
    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Whether a single record passes every filter
    pub fn matches(&self, record: &ItemRecord) -> bool {
        self.filters.iter().all(|filter| filter.matches(record))
    }

    /// Apply all filters in sequence to the candidates.
    ///
    /// ## Algorithm
    /// 1. Start with the input candidates
    /// 2. For each filter in order:
    ///    a. Log filter name and input count
    ///    b. Keep candidates whose catalog record passes
    ///    c. Log output count
    /// 3. Return final filtered set, in input order
    ///
    /// Fails if a candidate points at a position the catalog doesn't have.
    pub fn apply(&self, candidates: Vec<Candidate>, catalog: &Catalog) -> Result<Vec<Candidate>> {
        let mut current: Vec<(Candidate, &ItemRecord)> = candidates
            .into_iter()
            .map(|candidate| {
                let record = catalog.record_at(candidate.position).with_context(|| {
                    format!("Candidate position {} has no catalog record", candidate.position)
                })?;
                Ok((candidate, record))
            })
            .collect::<Result<_>>()?;

        for filter in &self.filters {
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current.retain(|(_, record)| filter.matches(record));
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        Ok(current.into_iter().map(|(candidate, _)| candidate).collect())
    }

    /// Keep the records that pass every filter, preserving order
    pub fn retain_records<'a, I>(&self, records: I) -> Vec<&'a ItemRecord>
    where
        I: IntoIterator<Item = &'a ItemRecord>,
    {
        records.into_iter().filter(|record| self.matches(record)).collect()
    }

    /// Every catalog record that passes, in catalog order.
    ///
    /// Evaluated in parallel; the indexed collect keeps load order.
    pub fn filter_catalog<'a>(&self, catalog: &'a Catalog) -> Vec<&'a ItemRecord> {
        if self.is_empty() {
            return catalog.all().iter().collect();
        }
        let matching: Vec<&ItemRecord> = catalog
            .all()
            .par_iter()
            .filter(|record| self.matches(record))
            .collect();
        tracing::debug!(
            "Filters {:?} kept {} of {} catalog records",
            self.filter_names(),
            matching.len(),
            catalog.len()
        );
        matching
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
