use anyhow::Context;
use data_loader::{ArtifactPaths, EngineArtifacts};
use std::path::PathBuf;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("models"));
    let paths = ArtifactPaths::in_dir(&dir);

    println!("Loading engine artifacts from {}...\n", dir.display());

    let start = Instant::now();
    let artifacts = EngineArtifacts::load_from_files(&paths).context("Failed to load artifacts")?;
    let elapsed = start.elapsed();

    let nnz: usize = artifacts.features.rows().iter().map(|v| v.nnz()).sum();

    println!("=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Items: {}", artifacts.catalog.len());
    println!("Features: {}", artifacts.features.n_features());
    println!("Non-zero entries: {}", nnz);
    println!("Metric: {:?}", artifacts.neighbor_spec.metric);
    println!(
        "\nPerformance: {:.0} items/second",
        artifacts.catalog.len() as f64 / elapsed.as_secs_f64()
    );
    Ok(())
}
