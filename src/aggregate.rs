use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::models::{FranchiseSummary, NormalizedRow, SeasonAssignment, SeasonPart};
use crate::season::{assign_season_index, group_by_franchise};

/// Per-franchise season parts, totals and latest-season share, ranked by
/// total viewing and cut to `cfg.top_n`.
pub fn summarize(rows: &[NormalizedRow], cfg: &PipelineConfig) -> Vec<FranchiseSummary> {
    let reindexed = assign_season_index(rows, cfg.max_sane_season);
    let groups = group_by_franchise(&reindexed, |a| a.row.franchise.as_str());

    let too_long: HashSet<&str> = groups
        .iter()
        .filter(|(_, v)| {
            v.iter().map(|a| a.season_index).collect::<BTreeSet<_>>().len()
                > cfg.long_runner_threshold
        })
        .map(|(fr, _)| *fr)
        .collect();
    if !too_long.is_empty() {
        debug!("Long-runner exclusion - franchises={:?}", too_long);
    }

    let mut out: Vec<FranchiseSummary> = groups
        .iter()
        .filter(|(fr, _)| !too_long.contains(*fr))
        .filter_map(|(fr, v)| summarize_franchise(fr, v))
        .collect();

    // stable: equal totals keep first-appearance order
    out.sort_by(|a, b| b.total.total_cmp(&a.total));
    let ranked = out.len();
    out.truncate(cfg.top_n);

    info!(
        "Aggregation completed - franchises={}, long_runners={}, kept_top={}",
        ranked,
        too_long.len(),
        out.len()
    );
    out
}

fn summarize_franchise(franchise: &str, rows: &[&SeasonAssignment]) -> Option<FranchiseSummary> {
    let mut by_season: BTreeMap<u32, f64> = BTreeMap::new();
    for a in rows {
        *by_season.entry(a.season_index).or_insert(0.0) += a.row.views;
    }
    let parts: Vec<SeasonPart> = by_season
        .into_iter()
        .map(|(season_index, views)| SeasonPart { season_index, views })
        .collect();

    let total: f64 = parts.iter().map(|p| p.views).sum();
    if !(total.is_finite() && total > 0.0) {
        return None;
    }
    let latest_share = parts.last().map(|p| p.views / total).unwrap_or(0.0);

    Some(FranchiseSummary {
        franchise: franchise.to_string(),
        total,
        parts,
        latest_share,
        carry_share: 1.0 - latest_share,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fr: &str, season: f64, views: f64) -> NormalizedRow {
        NormalizedRow {
            franchise: fr.to_string(),
            title: format!("{}: Season {}", fr, season),
            simple_title: fr.to_string(),
            views,
            release_date: None,
            net_season: Some(season),
        }
    }

    #[test]
    fn parts_sum_to_total_and_latest_share_matches() {
        let rows = vec![
            row("A", 1.0, 100.0),
            row("A", 2.0, 300.0),
            row("A", 2.0, 100.0),
        ];
        let out = summarize(&rows, &PipelineConfig::default());
        assert_eq!(out.len(), 1);
        let a = &out[0];
        assert_eq!(a.total, 500.0);
        assert_eq!(a.parts.iter().map(|p| p.views).sum::<f64>(), a.total);
        assert_eq!(a.parts.len(), 2);
        assert_eq!(a.parts[1].season_index, 2);
        assert!((a.latest_share - 0.8).abs() < 1e-12);
        assert!((a.carry_share - 0.2).abs() < 1e-12);
    }

    #[test]
    fn long_runner_is_dropped_entirely() {
        let mut rows: Vec<NormalizedRow> = (1..=30).map(|s| row("Soap", s as f64, 10.0)).collect();
        rows.push(row("Drama", 1.0, 5.0));
        let out = summarize(&rows, &PipelineConfig::default());
        assert!(out.iter().all(|f| f.franchise != "Soap"));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn exactly_threshold_seasons_survives() {
        let rows: Vec<NormalizedRow> = (1..=25).map(|s| row("Edge", s as f64, 1.0)).collect();
        let out = summarize(&rows, &PipelineConfig::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].parts.len(), 25);
    }

    #[test]
    fn ranks_descending_and_truncates() {
        let rows = vec![row("Small", 1.0, 500_000.0), row("Big", 1.0, 1_000_000.0)];
        let cfg = PipelineConfig::default();
        let out = summarize(&rows, &cfg);
        assert_eq!(out[0].franchise, "Big");
        assert_eq!(out[1].franchise, "Small");

        let cfg = PipelineConfig { top_n: 1, ..cfg };
        let out = summarize(&rows, &cfg);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].franchise, "Big");
    }

    #[test]
    fn equal_totals_keep_input_order() {
        let rows = vec![row("First", 1.0, 10.0), row("Second", 1.0, 10.0)];
        let out = summarize(&rows, &PipelineConfig::default());
        assert_eq!(out[0].franchise, "First");
        assert_eq!(out[1].franchise, "Second");
    }

    #[test]
    fn idempotent_over_identical_input() {
        let rows = vec![
            row("A", 1.0, 3.0),
            row("B", 2.0, 7.0),
            row("A", 4.0, 9.0),
            row("C", 1.0, 7.0),
        ];
        let cfg = PipelineConfig::default();
        assert_eq!(summarize(&rows, &cfg), summarize(&rows, &cfg));
    }
}
