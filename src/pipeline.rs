use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::aggregate::summarize;
use crate::config::PipelineConfig;
use crate::episodes::EpisodeIndex;
use crate::filter::base_rows;
use crate::load::{load_episodes, load_lexicon, load_sentiment, load_viewing};
use crate::models::{FranchiseSummary, RawViewingRecord};
use crate::render::render_digest_markdown;
use crate::sentiment::SentimentIndex;
use crate::viz_export::{write_all_viz, VizCounts, VizInputs};

#[derive(Debug, Clone)]
pub struct InputPaths {
    pub viewing: PathBuf,
    pub sentiment: PathBuf,
    pub episodes: Option<PathBuf>,
    pub lexicon: Option<PathBuf>,
}

/// Filter, reindex, aggregate and rank. Pure over its inputs.
pub fn build_summaries(records: &[RawViewingRecord], cfg: &PipelineConfig) -> Vec<FranchiseSummary> {
    let rows = base_rows(records, cfg);
    summarize(&rows, cfg)
}

pub fn run(paths: &InputPaths, cfg: &PipelineConfig, output_dir: &Path) -> Result<VizCounts> {
    let pipeline_start = std::time::Instant::now();
    info!("Pipeline started - output_dir={}", output_dir.display());

    // 1) load, in order: the sentiment table must exist before the join
    let load_start = std::time::Instant::now();
    let viewing = load_viewing(&paths.viewing)
        .with_context(|| format!("viewing dataset {}", paths.viewing.display()))?;
    let sentiment_rows = load_sentiment(&paths.sentiment)
        .with_context(|| format!("sentiment dataset {}", paths.sentiment.display()))?;
    let episodes = load_episodes(paths.episodes.as_deref());
    let lexicon = load_lexicon(paths.lexicon.as_deref());
    info!(
        "Datasets loaded - duration={:.2}s, viewing={}, sentiment={}, episodes={}, lexicon={}",
        load_start.elapsed().as_secs_f32(),
        viewing.len(),
        sentiment_rows.len(),
        episodes.len(),
        lexicon.len()
    );

    let sentiment = SentimentIndex::build(&sentiment_rows);
    if sentiment.is_empty() {
        warn!("Sentiment index is empty - every season will render as Unknown");
    } else {
        debug!("Sentiment index ready - keys={}", sentiment.len());
    }
    if lexicon.is_empty() {
        warn!("Lexicon has no usable words - overviews will not be highlighted");
    }
    let episodes = EpisodeIndex::build(episodes);
    if episodes.is_empty() {
        debug!("No episode detail available for drill-downs");
    }

    // 2) aggregate
    let agg_start = std::time::Instant::now();
    let summaries = build_summaries(&viewing, cfg);
    info!(
        "Summaries built - duration={:.2}s, franchises={}",
        agg_start.elapsed().as_secs_f32(),
        summaries.len()
    );

    // 3) join diagnostics
    sentiment.match_rate(&summaries);

    // 4) persist
    let generated_at = chrono::Utc::now().to_rfc3339();
    let inputs = VizInputs {
        summaries: &summaries,
        sentiment: &sentiment,
        episodes: &episodes,
        lexicon: &lexicon,
        cfg,
    };
    let counts = write_all_viz(output_dir, &generated_at, &inputs)?;
    debug!("Wrote viz bundle");

    let digest = render_digest_markdown(&summaries, &sentiment, cfg);
    std::fs::write(output_dir.join("digest.md"), digest.as_bytes())
        .with_context(|| format!("write {}", output_dir.join("digest.md").display()))?;
    debug!("Wrote digest.md");

    info!(
        "Pipeline completed successfully - total_duration={:.2}s, franchises={}, seasons={}",
        pipeline_start.elapsed().as_secs_f32(),
        counts.franchises,
        counts.seasons
    );
    Ok(counts)
}
