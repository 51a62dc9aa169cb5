use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::input_types::*;
use crate::models::*;

static SEASON_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Season\s*\d+|S\s*\d+").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%B %d, %Y", "%d %B %Y"];

/// Deserialize every row of a headed CSV file. Rows that fail to decode are
/// skipped with a warning.
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let mut rows = Vec::new();
    let mut bad = 0usize;
    for (i, rec) in reader.deserialize::<T>().enumerate() {
        match rec {
            Ok(r) => rows.push(r),
            Err(e) => {
                bad += 1;
                debug!("Skipping malformed row - file={}, row={}, error={}", path.display(), i + 1, e);
            }
        }
    }
    if bad > 0 {
        warn!("Skipped {} malformed rows in {}", bad, path.display());
    }
    Ok(rows)
}

pub fn parse_release_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|d| d.date_naive()))
}

/// Grouping key for a viewing row: the simplified title, or the full title
/// with season markers stripped.
pub fn franchise_key(title: &str, simple_title: &str) -> String {
    let simple = simple_title.trim();
    if !simple.is_empty() {
        return simple.to_string();
    }
    let stripped = SEASON_TOKEN.replace_all(title, "");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

impl ViewingCsvRow {
    /// `None` when no franchise key can be derived.
    pub fn into_record(self) -> Option<RawViewingRecord> {
        let franchise = franchise_key(&self.title, &self.simple_title);
        if franchise.is_empty() {
            return None;
        }
        Some(RawViewingRecord {
            franchise,
            release_date: parse_release_date(&self.release_date),
            views: self.views.unwrap_or(0.0),
            net_season: self.net_season,
            title: self.title,
            simple_title: self.simple_title,
        })
    }
}

impl From<SentimentCsvRow> for SentimentRecord {
    fn from(r: SentimentCsvRow) -> Self {
        SentimentRecord {
            franchise: r.franchise,
            season: r.season,
            avg_score: r.avg_score,
            n_episodes: count(r.n_episodes),
        }
    }
}

impl From<EpisodeCsvRow> for EpisodeRecord {
    fn from(r: EpisodeCsvRow) -> Self {
        let title = [r.name, r.title]
            .into_iter()
            .map(|s| s.trim().to_string())
            .find(|s| !s.is_empty())
            .unwrap_or_default();
        let overview = [r.overview, r.episode_overview]
            .into_iter()
            .map(|s| s.trim().to_string())
            .find(|s| !s.is_empty())
            .unwrap_or_default();
        EpisodeRecord {
            franchise: r.franchise,
            season: whole(r.season),
            episode: whole(r.episode),
            title,
            overview,
            score: r.score.filter(|v| v.is_finite()).or(r.sentiment.filter(|v| v.is_finite())),
        }
    }
}

fn whole(v: Option<f64>) -> Option<u32> {
    v.filter(|n| n.is_finite() && *n >= 0.0 && n.fract() == 0.0 && *n <= u32::MAX as f64)
        .map(|n| n as u32)
}

fn count(v: Option<f64>) -> u32 {
    v.filter(|n| n.is_finite() && *n > 0.0)
        .map(|n| n.min(u32::MAX as f64) as u32)
        .unwrap_or(0)
}

pub fn load_viewing(path: &Path) -> Result<Vec<RawViewingRecord>> {
    let rows: Vec<ViewingCsvRow> = read_csv(path).context("loading viewing dataset")?;
    let total = rows.len();
    let records: Vec<RawViewingRecord> = rows.into_iter().filter_map(|r| r.into_record()).collect();
    info!(
        "Viewing dataset loaded - rows={}, keyed={}, file={}",
        total,
        records.len(),
        path.display()
    );
    Ok(records)
}

pub fn load_sentiment(path: &Path) -> Result<Vec<SentimentRecord>> {
    let rows: Vec<SentimentCsvRow> = read_csv(path).context("loading sentiment dataset")?;
    info!("Sentiment dataset loaded - rows={}, file={}", rows.len(), path.display());
    Ok(rows.into_iter().map(SentimentRecord::from).collect())
}

/// Optional: a missing or unreadable file yields no episodes.
pub fn load_episodes(path: Option<&Path>) -> Vec<EpisodeRecord> {
    let Some(path) = path else {
        debug!("No episode dataset given");
        return Vec::new();
    };
    match read_csv::<EpisodeCsvRow>(path) {
        Ok(rows) => {
            info!("Episode dataset loaded - rows={}, file={}", rows.len(), path.display());
            rows.into_iter().map(EpisodeRecord::from).collect()
        }
        Err(e) => {
            warn!("Episode dataset unavailable, continuing without it - {:#}", e);
            Vec::new()
        }
    }
}

/// Optional: a missing or unreadable file yields the built-in table.
pub fn load_lexicon(path: Option<&Path>) -> Lexicon {
    let Some(path) = path else {
        debug!("No lexicon given, using built-in table");
        return Lexicon::builtin();
    };
    match read_csv::<LexiconCsvRow>(path) {
        Ok(rows) => {
            let lex = Lexicon::from_pairs(rows.into_iter().map(|r| {
                let word = [r.word, r.term, r.token]
                    .into_iter()
                    .find(|w| !w.trim().is_empty())
                    .unwrap_or_default();
                let weight = [r.weight, r.score]
                    .into_iter()
                    .flatten()
                    .find(|v| v.is_finite() && *v != 0.0)
                    .unwrap_or(0.0);
                (word, weight)
            }));
            info!("Lexicon loaded - words={}, file={}", lex.len(), path.display());
            lex
        }
        Err(e) => {
            warn!("Lexicon unavailable, using built-in table - {:#}", e);
            Lexicon::builtin()
        }
    }
}
