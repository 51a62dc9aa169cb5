use indexmap::IndexMap;
use itertools::Itertools;
use tracing::debug;

use crate::filter::has_valid_season;
use crate::models::{NormalizedRow, SeasonAssignment};

/// Groups rows by franchise key, keeping first-appearance order of groups and
/// input order within each group.
pub fn group_by_franchise<'a, T, F>(items: &'a [T], key: F) -> IndexMap<&'a str, Vec<&'a T>>
where
    F: Fn(&'a T) -> &'a str,
{
    let mut groups: IndexMap<&str, Vec<&T>> = IndexMap::new();
    for it in items {
        groups.entry(key(it)).or_default().push(it);
    }
    groups
}

/// Dense 1-based season indices per franchise.
///
/// When every raw season number in a group is usable the distinct numbers are
/// ranked (gaps compress, equal numbers share an index). Otherwise dated rows
/// come first in release-date order, undated rows follow by title, and rows
/// are numbered by position.
pub fn assign_season_index(rows: &[NormalizedRow], max_sane: f64) -> Vec<SeasonAssignment> {
    let groups = group_by_franchise(rows, |r| r.franchise.as_str());
    let mut out = Vec::with_capacity(rows.len());
    let mut fallback_groups = 0usize;

    for (franchise, arr) in groups {
        let sane = arr.iter().all(|r| has_valid_season(r.net_season, max_sane));

        if sane {
            let ranks: Vec<f64> = arr
                .iter()
                .filter_map(|r| r.net_season)
                .sorted_by(|a, b| a.total_cmp(b))
                .dedup()
                .collect();
            for r in arr {
                let Some(n) = r.net_season else { continue };
                let idx = ranks.iter().position(|&s| s == n).unwrap_or(0) + 1;
                out.push(SeasonAssignment {
                    row: r.clone(),
                    season_index: idx as u32,
                });
            }
        } else {
            fallback_groups += 1;
            debug!("Season fallback ordering - franchise={}, rows={}", franchise, arr.len());
            let ordered: Vec<&NormalizedRow> = arr
                .into_iter()
                .sorted_by(|a, b| {
                    (a.release_date.is_none(), a.release_date, &a.title).cmp(&(
                        b.release_date.is_none(),
                        b.release_date,
                        &b.title,
                    ))
                })
                .collect();
            for (i, r) in ordered.into_iter().enumerate() {
                out.push(SeasonAssignment {
                    row: r.clone(),
                    season_index: i as u32 + 1,
                });
            }
        }
    }

    debug!(
        "Season reindex - rows={}, fallback_groups={}",
        out.len(), fallback_groups
    );
    out
}
