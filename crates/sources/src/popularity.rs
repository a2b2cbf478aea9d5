//! Popularity Source - the fallback ranker
//!
//! Used whenever there is no similarity anchor. Orders games by how many
//! user reviews they have, most reviewed first.
//!
//! Games without a review count sort after every game that has one. Ties
//! keep their input order (catalog order for full-catalog ranking).

use crate::types::{Candidate, CandidateSource};
use data_loader::{Catalog, ItemRecord};
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Rank records by review count, descending and stable.
///
/// `None < Some(_)`, so under `Reverse` absent counts land last.
pub fn rank<'a, I>(records: I, limit: usize) -> Vec<&'a ItemRecord>
where
    I: IntoIterator<Item = &'a ItemRecord>,
{
    let mut ranked: Vec<&ItemRecord> = records.into_iter().collect();
    ranked.sort_by_key(|record| Reverse(record.review_count));
    ranked.truncate(limit);
    ranked
}

/// Popularity source over the whole catalog
#[derive(Debug, Clone)]
pub struct PopularitySource {
    catalog: Arc<Catalog>,
}

impl PopularitySource {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Rank already-filtered candidates by their records' review counts
    #[instrument(skip(self, candidates), fields(input = candidates.len()))]
    pub fn rank(&self, candidates: Vec<Candidate>, limit: usize) -> Vec<Candidate> {
        let mut ranked: Vec<(Reverse<Option<u64>>, Candidate)> = candidates
            .into_iter()
            .map(|candidate| {
                let reviews = self
                    .catalog
                    .record_at(candidate.position)
                    .and_then(|record| record.review_count);
                (Reverse(reviews), candidate)
            })
            .collect();

        ranked.sort_by_key(|(reviews, _)| *reviews);
        ranked.truncate(limit);

        debug!("Ranked {} popularity candidates", ranked.len());
        ranked
            .into_iter()
            .map(|(_, candidate)| Candidate {
                source: CandidateSource::Popularity,
                distance: None,
                ..candidate
            })
            .collect()
    }

    /// Every catalog row as an unranked popularity candidate, in load order
    pub fn all_candidates(&self) -> Vec<Candidate> {
        self.catalog
            .all()
            .iter()
            .enumerate()
            .map(|(position, record)| {
                Candidate::new(position, record.id, CandidateSource::Popularity)
            })
            .collect()
    }

    /// Top `limit` of the whole catalog
    pub fn get_candidates(&self, limit: usize) -> Vec<Candidate> {
        self.rank(self.all_candidates(), limit)
    }
}
