use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::models::{NormalizedRow, RawViewingRecord};

static WRESTLING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(^raw:|\bwwe\b|\bsmackdown\b|\bnxt\b|\bwrestlemania\b|\broyal\s*rumble\b|\bpayback\b|\bbacklash\b|\bfastlane\b|\bcrown\s*jewel\b|\belimination\s*chamber\b|\bsummerslam\b|\bsurvivor\s*series\b)",
    )
    .unwrap()
});

static NON_CANONICAL: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"behind\s+the",
        r"making\s+of",
        r"\bfeaturette\b",
        r"\bspecial(s)?\b",
        r"\bbonus\b",
        r"\bafter\s*show\b",
        r"\breunion\b",
        r"\brecap\b",
        r"\bpreview\b",
        r"\bteaser\b",
        r"\btrailer\b",
        r"\bclip(s)?\b",
        r"\bblooper(s)?\b",
        r"\bouttake(s)?\b",
        r"\bshorts?\b",
        r"\ball[-\s]?stars?\b",
        r"\bjunior\b",
        r"\bkids\b",
        r"\bspin[-\s]?off\b",
        r"\bdocu(mentary)?\b",
        r"\bhighlight(s)?\b",
        r":?\s*the\s*challenge\b",
        r"\bmaking\s*film\b",
        r"\bdirector'?s\s*cut\b",
        r"\bextended\s*cut\b",
        r"\bedited\s*version\b",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){}", p)).unwrap())
    .collect()
});

static SEASON_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(season\s*\d+|\bS\s*\d+\b)").unwrap());

pub fn is_wrestling(text: &str) -> bool {
    WRESTLING.is_match(text)
}

pub fn is_non_canonical(text: &str) -> bool {
    NON_CANONICAL.iter().any(|rx| rx.is_match(text))
}

pub fn looks_season_like(text: &str) -> bool {
    SEASON_LIKE.is_match(text)
}

pub fn has_valid_season(net_season: Option<f64>, max_sane: f64) -> bool {
    matches!(net_season, Some(n) if n.is_finite() && (1.0..=max_sane).contains(&n))
}

/// A row counts as season content through either a usable season number or
/// a "season N" / "S N" mention in one of its titles.
pub fn qualifies_as_season(row: &RawViewingRecord, max_sane: f64) -> bool {
    let by_number = has_valid_season(row.net_season, max_sane);
    let by_title = looks_season_like(&row.title) || looks_season_like(&row.simple_title);
    by_number || by_title
}

pub fn is_core_season_content(row: &RawViewingRecord, cfg: &PipelineConfig) -> bool {
    let texts = [row.title.as_str(), row.simple_title.as_str()];
    if texts.iter().any(|t| is_wrestling(t)) {
        return false;
    }
    if texts.iter().any(|t| is_non_canonical(t)) {
        return false;
    }
    if !qualifies_as_season(row, cfg.max_sane_season) {
        return false;
    }
    !matches!(row.net_season, Some(n) if n.is_finite() && n > cfg.max_sane_season)
}

/// Positive-view, in-scope rows; everything else is dropped silently.
pub fn base_rows(records: &[RawViewingRecord], cfg: &PipelineConfig) -> Vec<NormalizedRow> {
    let mut zero_views = 0usize;
    let mut out_of_scope = 0usize;
    let mut out = Vec::with_capacity(records.len());

    for r in records {
        if !(r.views.is_finite() && r.views > 0.0) {
            zero_views += 1;
            continue;
        }
        if !is_core_season_content(r, cfg) {
            out_of_scope += 1;
            continue;
        }
        out.push(NormalizedRow {
            franchise: r.franchise.clone(),
            title: r.title.clone(),
            simple_title: r.simple_title.clone(),
            views: r.views,
            release_date: r.release_date,
            net_season: r.net_season.filter(|n| n.is_finite()),
        });
    }

    debug!(
        "Row filter - kept={}, zero_views={}, out_of_scope={}",
        out.len(), zero_views, out_of_scope
    );
    out
}
