//! Example: Generate candidates for an anchor game
//!
//! Run with: cargo run --package sources --example similar_games -- "Portal 2"
//!
//! This example shows how to:
//! 1. Load the engine artifacts
//! 2. Resolve an anchor game by title
//! 3. Generate similarity candidates around it
//! 4. Generate popularity candidates for comparison

use anyhow::Context;
use data_loader::{ArtifactPaths, EngineArtifacts};
use sources::{PopularitySource, SimilaritySource};
use std::sync::Arc;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let title = std::env::args().nth(1).unwrap_or_else(|| "Portal 2".to_string());

    println!("=== Game Candidate Generation Example ===\n");

    let start = Instant::now();
    let artifacts = EngineArtifacts::load_from_files(&ArtifactPaths::default())?;
    println!("Loaded {} games in {:?}\n", artifacts.catalog.len(), start.elapsed());

    let catalog = Arc::new(artifacts.catalog);
    let similarity = SimilaritySource::new(
        catalog.clone(),
        Arc::new(artifacts.features),
        artifacts.neighbor_spec,
    )?;
    let popularity = PopularitySource::new(catalog.clone());

    let anchor = catalog
        .position_of_title(&title)
        .with_context(|| format!("'{}' is not in the catalog", title))?;

    let start = Instant::now();
    let similar = similarity.get_candidates(anchor, 5)?;
    println!("Games similar to {} ({:?}):", title, start.elapsed());
    for (i, candidate) in similar.iter().enumerate() {
        if let Some(game) = catalog.record_at(candidate.position) {
            println!(
                "  {}. {} (distance {:.3})",
                i + 1,
                game.title,
                candidate.distance.unwrap_or_default()
            );
        }
    }

    let start = Instant::now();
    let popular = popularity.get_candidates(5);
    println!("\nMost reviewed games ({:?}):", start.elapsed());
    for (i, candidate) in popular.iter().enumerate() {
        if let Some(game) = catalog.record_at(candidate.position) {
            println!("  {}. {} ({:?} reviews)", i + 1, game.title, game.review_count);
        }
    }

    Ok(())
}
