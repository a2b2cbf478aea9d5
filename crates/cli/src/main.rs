use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use data_loader::{ItemId, ItemRecord, Mood};
use rayon::prelude::*;
use server::presentation::{
    format_price, format_rating, format_release_date, format_reviews, platform_labels, store_url,
};
use server::{
    AnchorRef, AppConfig, GameRecommendation, Query, RecommendationOrchestrator,
    RecommendationOutcome,
};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

/// game-recs - Game Recommendation Engine
#[derive(Parser)]
#[command(name = "game-recs")]
#[command(about = "Game recommendations from content similarity and popularity", long_about = None)]
struct Cli {
    /// TOML config file with [artifacts] and [engine] sections
    #[arg(long, env = "GAME_RECS_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Catalog CSV (overrides the config file)
    #[arg(long, env = "GAME_RECS_CATALOG", global = true)]
    catalog: Option<PathBuf>,

    /// Feature matrix JSON (overrides the config file)
    #[arg(long, env = "GAME_RECS_FEATURES", global = true)]
    features: Option<PathBuf>,

    /// Neighbor index JSON (overrides the config file)
    #[arg(long, env = "GAME_RECS_NEIGHBORS", global = true)]
    neighbors: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// One way of naming a game
#[derive(Args)]
struct AnchorArgs {
    /// Game title (case-insensitive exact match)
    #[arg(long)]
    title: Option<String>,

    /// Steam app id
    #[arg(long)]
    app_id: Option<ItemId>,
}

impl AnchorArgs {
    fn to_anchor(&self) -> Option<AnchorRef> {
        let anchor = AnchorRef {
            id: self.app_id,
            title: self.title.clone(),
        };
        (!anchor.is_empty()).then_some(anchor)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Get game recommendations
    Recommend {
        #[command(flatten)]
        anchor: AnchorArgs,

        /// Only games with this mood (general, horror, brainy, intense, relaxing)
        #[arg(long)]
        mood: Option<Mood>,

        /// Only games tagged with this genre (ignored when an anchor is given)
        #[arg(long)]
        genre: Option<String>,

        /// Number of recommendations to return
        #[arg(long)]
        limit: Option<usize>,

        /// Reject queries with no anchor, mood or genre
        #[arg(long)]
        strict: bool,

        /// Show detailed explanation for each recommendation
        #[arg(long)]
        explain: bool,
    },

    /// Show everything known about one game
    Details {
        #[command(flatten)]
        anchor: AnchorArgs,
    },

    /// Search for games by title
    Search {
        /// Title fragment to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,

        /// Maximum number of results
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = load_config(&cli)?;

    if let Commands::Recommend {
        limit: Some(limit), ..
    } = &cli.command
    {
        config.engine.similar_limit = *limit;
        config.engine.fallback_limit = *limit;
    }

    println!("Loading games from {}...", config.artifacts.catalog.display());
    let start = Instant::now();
    let orchestrator =
        RecommendationOrchestrator::load(&config).context("Failed to load engine artifacts")?;
    println!(
        "{} Loaded {} games in {:?}",
        "✓".green(),
        orchestrator.catalog().len(),
        start.elapsed()
    );

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            anchor,
            mood,
            genre,
            strict,
            explain,
            ..
        } => handle_recommend(&orchestrator, &anchor, mood, genre, strict, explain)?,
        Commands::Details { anchor } => handle_details(&orchestrator, &anchor)?,
        Commands::Search { title, limit } => handle_search(&orchestrator, &title, limit),
        Commands::Benchmark { requests } => handle_benchmark(&orchestrator, requests)?,
    }

    Ok(())
}

/// Config file (if any) with artifact paths overridden by flags and env vars
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(path) = &cli.catalog {
        config.artifacts.catalog = path.clone();
    }
    if let Some(path) = &cli.features {
        config.artifacts.feature_matrix = path.clone();
    }
    if let Some(path) = &cli.neighbors {
        config.artifacts.neighbor_index = path.clone();
    }
    Ok(config)
}

/// Handle the 'recommend' command
fn handle_recommend(
    orchestrator: &RecommendationOrchestrator,
    anchor: &AnchorArgs,
    mood: Option<Mood>,
    genre: Option<String>,
    strict: bool,
    explain: bool,
) -> Result<()> {
    let query = Query {
        anchor: anchor.to_anchor(),
        mood,
        genre,
    };
    if strict {
        query.require_discriminating_input()?;
    }

    match orchestrator.recommend(&query)? {
        RecommendationOutcome::Recommendations(recommendations) => {
            print_recommendations(&recommendations, explain)
        }
        RecommendationOutcome::NotFound(anchor) => {
            println!("{} No game matches {}", "✗".red(), anchor);
            println!("Try `game-recs search --title <fragment>` to find the exact title.");
        }
        RecommendationOutcome::EmptyResult => {
            println!("{} No games match those filters", "✗".yellow());
        }
    }
    Ok(())
}

/// Handle the 'details' command
fn handle_details(orchestrator: &RecommendationOrchestrator, anchor: &AnchorArgs) -> Result<()> {
    let Some(anchor) = anchor.to_anchor() else {
        bail!("Give a game with --title or --app-id");
    };
    match orchestrator.details(&anchor) {
        Some(record) => print_details(record),
        None => println!("{} No game matches {}", "✗".red(), anchor),
    }
    Ok(())
}

/// Handle the 'search' command
fn handle_search(orchestrator: &RecommendationOrchestrator, title: &str, limit: usize) {
    let matches = orchestrator.catalog().search_titles(title, limit);

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    if matches.is_empty() {
        println!("  (no matches)");
    }
    for record in matches {
        println!(
            "{}: {} [{}] {}",
            record.id,
            record.title,
            record.tags.join(", "),
            format_reviews(record.review_count)
        );
    }
}

/// Handle the 'benchmark' command
fn handle_benchmark(orchestrator: &RecommendationOrchestrator, requests: usize) -> Result<()> {
    let catalog = orchestrator.catalog();
    if requests == 0 || catalog.is_empty() {
        bail!("Benchmark needs at least one request and a non-empty catalog");
    }

    // Random anchors from the catalog
    let anchors: Vec<ItemId> = (0..requests)
        .filter_map(|_| catalog.record_at(rand::random_range(0..catalog.len())))
        .map(|record| record.id)
        .collect();

    info!("Issuing {} requests on {} threads", anchors.len(), rayon::current_num_threads());
    let wall = Instant::now();
    let mut timings: Vec<Duration> = anchors
        .par_iter()
        .map(|&id| {
            let start = Instant::now();
            orchestrator.recommend(&Query::new().with_anchor(AnchorRef::id(id)))?;
            Ok::<_, anyhow::Error>(start.elapsed())
        })
        .collect::<Result<_>>()?;
    let wall_time = wall.elapsed();

    let total_time: Duration = timings.iter().sum();
    let avg_latency = total_time / (timings.len() as u32);
    timings.sort();
    let percentile = |p: f32| {
        let idx = ((timings.len() as f32 * p) as usize).min(timings.len() - 1);
        timings[idx]
    };
    let throughput = timings.len() as f64 / wall_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {}", timings.len());
    println!("Wall time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Format and print recommendations
fn print_recommendations(recommendations: &[GameRecommendation], explain: bool) {
    print!("{}", "Game Recommendations:\n".bold().blue());
    for rec in recommendations {
        let game = &rec.record;
        println!(
            "{}. {} [{}] - {} - {}",
            rec.rank.to_string().green(),
            game.title.bold(),
            game.tags.iter().take(5).cloned().collect::<Vec<_>>().join(", "),
            format_price(game.price),
            format_rating(game.rating_label)
        );
        if explain {
            println!("   Source: {:?}", rec.source);
            println!("   Explanation: {}", rec.explanation);
            println!("   {}", store_url(game.id).dimmed());
        }
    }
}

fn print_details(record: &ItemRecord) {
    let platforms = platform_labels(record.platforms);
    let mood = record
        .mood
        .map(|m| m.to_string())
        .unwrap_or_else(|| "none".to_string());

    println!("{}", format!("{} (app {})", record.title, record.id).bold().blue());
    println!("{}Price: {}", "• ".green(), format_price(record.price));
    println!("{}Rating: {}", "• ".green(), format_rating(record.rating_label));
    println!("{}Reviews: {}", "• ".green(), format_reviews(record.review_count));
    println!(
        "{}Released: {}",
        "• ".green(),
        format_release_date(record.release_date)
    );
    println!("{}Mood: {}", "• ".cyan(), mood);
    println!("{}Tags: {}", "• ".cyan(), record.tags.join(", "));
    if platforms.is_empty() {
        println!("{}Platforms: unknown", "• ".cyan());
    } else {
        println!("{}Platforms: {}", "• ".cyan(), platforms.join(", "));
    }
    if !record.description.is_empty() {
        println!("\n{}", record.description);
    }
    println!("\n{}", store_url(record.id).dimmed());
}
