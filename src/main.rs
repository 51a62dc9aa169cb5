mod models;
mod input_types;
mod load;
mod keys;
mod filter;
mod season;
mod aggregate;
mod sentiment;
mod episodes;
mod config;
mod pipeline;
mod render;
mod viz_export;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};

use config::PipelineConfig;
use pipeline::{run, InputPaths};

/// Viewer Vibes - franchise/season viewing bars joined with sentiment
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Viewing dataset CSV (Title, Simple_Title, Views, Release Date, net_season)
    #[arg(long)]
    viewing: PathBuf,

    /// Sentiment dataset CSV (franchise, season, avg_score, n_episodes)
    #[arg(long)]
    sentiment: PathBuf,

    /// Optional per-episode CSV for season drill-downs
    #[arg(long)]
    episodes: Option<PathBuf>,

    /// Optional word-weight CSV for overview highlighting
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Output directory for generated files (default: "out")
    #[arg(short, long, default_value = "out")]
    output_dir: PathBuf,

    /// YAML pipeline config (overrides VIBES_CONFIG environment variable)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of franchises to keep after ranking
    #[arg(long)]
    top_n: Option<usize>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    info!("Starting viewer_vibes");

    let args = Args::parse();

    // Config path: CLI arg > VIBES_CONFIG > built-in defaults
    let cfg_path = args
        .config
        .clone()
        .or_else(|| std::env::var("VIBES_CONFIG").ok().map(PathBuf::from));
    if let Some(ref p) = cfg_path {
        debug!("Using pipeline config: {}", p.display());
    }
    let cfg = PipelineConfig::resolve(cfg_path.as_deref(), args.top_n)?;

    let paths = InputPaths {
        viewing: args.viewing,
        sentiment: args.sentiment,
        episodes: args.episodes,
        lexicon: args.lexicon,
    };

    let counts = run(&paths, &cfg, &args.output_dir)?;
    info!(
        "Done - franchises={}, seasons={}, sentiment_match={:.1}%, output_dir={}",
        counts.franchises,
        counts.seasons,
        counts.match_rate * 100.0,
        args.output_dir.display()
    );
    Ok(())
}
