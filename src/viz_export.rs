// src/viz_export.rs
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;
use std::{fs, path::Path};
use xxhash_rust::xxh3::xxh3_64;

use crate::config::PipelineConfig;
use crate::episodes::{display_title, episode_number, EpisodeIndex};
use crate::models::{FranchiseSummary, Lexicon, SentimentEntry, SentimentLabel};
use crate::render::highlight_text;
use crate::sentiment::{sentiment_label, SentimentIndex};

/* -------------------------------------------------------------------------- */
/* Entry point                                                                */
/* -------------------------------------------------------------------------- */

/// Lookups shared by every builder. All read-only.
pub struct VizInputs<'a> {
    pub summaries: &'a [FranchiseSummary],
    pub sentiment: &'a SentimentIndex,
    pub episodes: &'a EpisodeIndex,
    pub lexicon: &'a Lexicon,
    pub cfg: &'a PipelineConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VizCounts {
    pub franchises: usize,
    pub seasons: usize,
    pub sentiment_hits: usize,
    pub match_rate: f64,
}

/// Write the D3-ready JSON bundle into `out_dir`.
pub fn write_all_viz(out_dir: &Path, generated_at: &str, inputs: &VizInputs) -> Result<VizCounts> {
    fs::create_dir_all(out_dir).with_context(|| format!("create {:?}", out_dir))?;

    // 1) Ranked stacked bars
    let franchises = build_franchises(inputs);
    write_json(out_dir.join("viz.franchises.json"), &franchises)?;

    // 2) Per-season drill-down
    let seasons = build_seasons(inputs);
    write_json(out_dir.join("viz.seasons.json"), &seasons)?;

    // 3) Index
    let season_count = seasons.seasons.len();
    let hits = seasons.seasons.iter().filter(|s| s.sentiment.is_some()).count();
    let counts = VizCounts {
        franchises: franchises.franchises.len(),
        seasons: season_count,
        sentiment_hits: hits,
        match_rate: if season_count == 0 { 0.0 } else { hits as f64 / season_count as f64 },
    };
    let idx = json!({
        "generated_at": generated_at,
        "version": 1,
        "counts": counts,
        "config": inputs.cfg,
        "files": [
            "viz.franchises.json",
            "viz.seasons.json"
        ]
    });
    write_json(out_dir.join("viz.index.json"), &idx)?;

    Ok(counts)
}

fn write_json<P: AsRef<Path>, T: ?Sized + Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, serde_json::to_vec_pretty(value)?).with_context(|| format!("write {:?}", path))
}

/// Stable id for a franchise key.
pub fn franchise_id(franchise: &str) -> String {
    format!("{:016x}", xxh3_64(franchise.as_bytes()))
}

#[derive(Debug, Clone, Serialize, PartialEq)]
struct VSentiment {
    avg: f64,
    n: u32,
    label: SentimentLabel,
}

fn v_sentiment(entry: Option<&SentimentEntry>, eps: f64) -> Option<VSentiment> {
    entry.map(|e| VSentiment {
        avg: e.avg,
        n: e.episodes,
        label: sentiment_label(e.avg, eps),
    })
}

/* -------------------------------------------------------------------------- */
/* 1) Franchises                                                              */
/* -------------------------------------------------------------------------- */

#[derive(Serialize)]
struct VPart {
    s: u32,
    v: f64,
    sentiment: Option<VSentiment>,
}

#[derive(Serialize)]
struct VFranchise {
    id: String,
    rank: usize,
    franchise: String,
    total: f64,
    latest_share: f64,
    carry_share: f64,
    parts: Vec<VPart>,
}

#[derive(Serialize)]
struct VFranchiseBundle {
    franchises: Vec<VFranchise>,
}

fn build_franchises(inputs: &VizInputs) -> VFranchiseBundle {
    let eps = inputs.cfg.neutral_epsilon;
    let franchises = inputs
        .summaries
        .iter()
        .enumerate()
        .map(|(i, fr)| VFranchise {
            id: franchise_id(&fr.franchise),
            rank: i + 1,
            franchise: fr.franchise.clone(),
            total: fr.total,
            latest_share: fr.latest_share,
            carry_share: fr.carry_share,
            parts: fr
                .parts
                .iter()
                .map(|p| VPart {
                    s: p.season_index,
                    v: p.views,
                    sentiment: v_sentiment(inputs.sentiment.lookup(&fr.franchise, p.season_index), eps),
                })
                .collect(),
        })
        .collect();
    VFranchiseBundle { franchises }
}

/* -------------------------------------------------------------------------- */
/* 2) Season drill-down                                                       */
/* -------------------------------------------------------------------------- */

#[derive(Serialize)]
struct VEpisode {
    i: usize,
    id: u32,
    title: String,
    overview_html: String,
    score: Option<f64>,
    label: Option<SentimentLabel>,
}

#[derive(Serialize)]
struct VSeason {
    id: String,
    franchise: String,
    season: u32,
    views: f64,
    sentiment: Option<VSentiment>,
    label: String, // Positive | Neutral | Negative | Unknown
    overview_count: usize,
    episodes: Vec<VEpisode>,
}

#[derive(Serialize)]
struct VSeasonBundle {
    seasons: Vec<VSeason>,
}

fn build_seasons(inputs: &VizInputs) -> VSeasonBundle {
    let eps = inputs.cfg.neutral_epsilon;
    let mut seasons = Vec::new();

    for fr in inputs.summaries {
        let id = franchise_id(&fr.franchise);
        for p in &fr.parts {
            let sentiment = v_sentiment(inputs.sentiment.lookup(&fr.franchise, p.season_index), eps);
            let label = sentiment
                .as_ref()
                .map(|s| format!("{:?}", s.label))
                .unwrap_or_else(|| "Unknown".to_string());

            let episodes = inputs
                .episodes
                .season(&fr.franchise, p.season_index)
                .iter()
                .enumerate()
                .map(|(i, e)| VEpisode {
                    i,
                    id: episode_number(e, i),
                    title: display_title(e, i),
                    overview_html: highlight_text(&e.overview, inputs.lexicon),
                    score: e.score,
                    label: e.score.map(|s| sentiment_label(s, eps)),
                })
                .collect();

            seasons.push(VSeason {
                id: format!("{}-s{}", id, p.season_index),
                franchise: fr.franchise.clone(),
                season: p.season_index,
                views: p.views,
                sentiment,
                label,
                overview_count: inputs.episodes.overview_count(&fr.franchise, p.season_index),
                episodes,
            });
        }
    }
    VSeasonBundle { seasons }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EpisodeRecord, SeasonPart, SentimentRecord};

    fn summary(fr: &str, parts: &[(u32, f64)]) -> FranchiseSummary {
        let total: f64 = parts.iter().map(|p| p.1).sum();
        let latest = parts.last().map(|p| p.1 / total).unwrap_or(0.0);
        FranchiseSummary {
            franchise: fr.to_string(),
            total,
            parts: parts
                .iter()
                .map(|&(season_index, views)| SeasonPart { season_index, views })
                .collect(),
            latest_share: latest,
            carry_share: 1.0 - latest,
        }
    }

    #[test]
    fn writes_bundle_with_joined_sentiment_and_episodes() {
        let dir = tempfile::tempdir().unwrap();
        let summaries = vec![summary("Dark", &[(1, 10.0), (2, 30.0)]), summary("Ozark", &[(1, 5.0)])];
        let sentiment = SentimentIndex::build(&[SentimentRecord {
            franchise: "Dark".into(),
            season: Some(2.0),
            avg_score: Some(0.25),
            n_episodes: 8,
        }]);
        let episodes = EpisodeIndex::build(vec![EpisodeRecord {
            franchise: "Dark".into(),
            season: Some(2),
            episode: Some(0),
            title: String::new(),
            overview: "A great twist".into(),
            score: Some(-0.5),
        }]);
        let lexicon = Lexicon::builtin();
        let cfg = PipelineConfig::default();
        let inputs = VizInputs {
            summaries: &summaries,
            sentiment: &sentiment,
            episodes: &episodes,
            lexicon: &lexicon,
            cfg: &cfg,
        };

        let counts = write_all_viz(dir.path(), "2026-01-01T00:00:00Z", &inputs).unwrap();
        assert_eq!(counts.franchises, 2);
        assert_eq!(counts.seasons, 3);
        assert_eq!(counts.sentiment_hits, 1);

        let fr: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.path().join("viz.franchises.json")).unwrap()).unwrap();
        let dark = &fr["franchises"][0];
        assert_eq!(dark["rank"], 1);
        assert_eq!(dark["id"], franchise_id("Dark"));
        assert!(dark["parts"][0]["sentiment"].is_null());
        assert_eq!(dark["parts"][1]["sentiment"]["label"], "Positive");
        assert_eq!(dark["parts"][1]["sentiment"]["n"], 8);

        let ss: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.path().join("viz.seasons.json")).unwrap()).unwrap();
        let s2 = &ss["seasons"][1];
        assert_eq!(s2["label"], "Positive");
        assert_eq!(s2["overview_count"], 1);
        assert_eq!(s2["episodes"][0]["title"], "Ep 1");
        assert_eq!(s2["episodes"][0]["id"], 1);
        assert_eq!(s2["episodes"][0]["label"], "Negative");
        assert_eq!(
            s2["episodes"][0]["overview_html"],
            "A <span class=\"hi-pos\">great</span> twist"
        );
        assert_eq!(ss["seasons"][2]["label"], "Unknown");

        let idx: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.path().join("viz.index.json")).unwrap()).unwrap();
        assert_eq!(idx["config"]["top_n"], 200);
        assert_eq!(idx["counts"]["seasons"], 3);
    }

    #[test]
    fn franchise_ids_are_stable() {
        assert_eq!(franchise_id("Dark"), franchise_id("Dark"));
        assert_ne!(franchise_id("Dark"), franchise_id("dark"));
        assert_eq!(franchise_id("Dark").len(), 16);
    }
}
