use std::collections::HashMap;
use tracing::{debug, info};

use crate::keys::{key_variants, norm_key};
use crate::models::{FranchiseSummary, SentimentEntry, SentimentLabel, SentimentRecord};

fn join_key(variant: &str, season: u32) -> String {
    format!("{}__{}", variant, season)
}

/// Integral, positive-or-zero season numbers only; anything else can never be
/// looked up.
fn season_number(season: Option<f64>) -> Option<u32> {
    match season {
        Some(s) if s.is_finite() && s >= 0.0 && s.fract() == 0.0 && s <= u32::MAX as f64 => {
            Some(s as u32)
        }
        _ => None,
    }
}

/// Read-only `variant__season` table built once from the sentiment dataset.
#[derive(Debug, Clone, Default)]
pub struct SentimentIndex {
    table: HashMap<String, SentimentEntry>,
}

impl SentimentIndex {
    /// Every key variant of a record's franchise is inserted; the first record
    /// to claim a key keeps it.
    pub fn build(records: &[SentimentRecord]) -> Self {
        let mut table = HashMap::new();
        let mut skipped = 0usize;

        for r in records {
            let Some(avg) = r.avg_score.filter(|v| v.is_finite()) else {
                skipped += 1;
                continue;
            };
            let Some(season) = season_number(r.season) else {
                skipped += 1;
                continue;
            };
            let entry = SentimentEntry { avg, episodes: r.n_episodes };
            for v in key_variants(&r.franchise) {
                table.entry(join_key(&v, season)).or_insert(entry);
            }
        }

        debug!(
            "Sentiment index built - records={}, keys={}, skipped={}",
            records.len(),
            table.len(),
            skipped
        );
        Self { table }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Base key only. A miss is not an error.
    pub fn lookup(&self, franchise: &str, season: u32) -> Option<&SentimentEntry> {
        self.table.get(&join_key(&norm_key(franchise), season))
    }

    /// Share of (franchise, season) parts that found a sentiment entry.
    pub fn match_rate(&self, summaries: &[FranchiseSummary]) -> (usize, usize, f64) {
        let mut found = 0usize;
        let mut total = 0usize;
        for fr in summaries {
            for p in &fr.parts {
                total += 1;
                if self.lookup(&fr.franchise, p.season_index).is_some() {
                    found += 1;
                }
            }
        }
        let rate = if total == 0 { 0.0 } else { found as f64 / total as f64 };
        info!(
            "Sentiment join - matched={}/{} ({:.1}%)",
            found,
            total,
            rate * 100.0
        );
        (found, total, rate)
    }
}

pub fn sentiment_label(v: f64, eps: f64) -> SentimentLabel {
    if v >= eps {
        SentimentLabel::Positive
    } else if v <= -eps {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeasonPart;

    fn rec(fr: &str, season: f64, avg: f64, n: u32) -> SentimentRecord {
        SentimentRecord {
            franchise: fr.to_string(),
            season: Some(season),
            avg_score: Some(avg),
            n_episodes: n,
        }
    }

    #[test]
    fn differently_formatted_names_meet() {
        let idx = SentimentIndex::build(&[rec("The Office (US)", 2.0, 0.12, 22)]);
        let hit = idx.lookup("Office, The", 2).expect("should match");
        assert_eq!(hit.avg, 0.12);
        assert_eq!(hit.episodes, 22);
        assert!(idx.lookup("Office, The", 3).is_none());
    }

    #[test]
    fn longer_names_do_not_borrow_a_shorter_franchise() {
        let idx = SentimentIndex::build(&[
            rec("The Witcher", 1.0, -0.4, 8),
            rec("The 100", 1.0, 0.5, 13),
        ]);
        assert!(idx.lookup("The Witcher: Blood Origin", 1).is_none());
        assert!(idx.lookup("The 1000", 1).is_none());
        assert_eq!(idx.lookup("Witcher, The", 1).map(|e| e.avg), Some(-0.4));
        assert_eq!(idx.lookup("The 100", 1).map(|e| e.avg), Some(0.5));
    }

    #[test]
    fn base_key_lookup() {
        let idx = SentimentIndex::build(&[rec("Stranger Things", 4.0, -0.2, 9)]);
        assert_eq!(idx.lookup("stranger things", 4).map(|e| e.episodes), Some(9));
        assert_eq!(idx.lookup("Stranger-Things!", 4).map(|e| e.episodes), Some(9));
    }

    #[test]
    fn first_writer_wins_on_shared_variant() {
        let idx = SentimentIndex::build(&[
            rec("Cosmos: A Spacetime Odyssey", 1.0, 0.5, 13),
            rec("Cosmos: Possible Worlds", 1.0, -0.5, 13),
        ]);
        // both reduce to "cosmos"; the earlier row owns it
        assert_eq!(idx.lookup("Cosmos", 1).map(|e| e.avg), Some(0.5));
        assert_eq!(idx.lookup("Cosmos: Possible Worlds", 1).map(|e| e.avg), Some(-0.5));
    }

    #[test]
    fn non_finite_average_and_bad_season_are_skipped() {
        let idx = SentimentIndex::build(&[
            SentimentRecord {
                franchise: "Dark".into(),
                season: Some(1.0),
                avg_score: Some(f64::NAN),
                n_episodes: 10,
            },
            SentimentRecord {
                franchise: "Dark".into(),
                season: Some(1.0),
                avg_score: None,
                n_episodes: 10,
            },
            SentimentRecord {
                franchise: "Dark".into(),
                season: Some(1.5),
                avg_score: Some(0.1),
                n_episodes: 10,
            },
        ]);
        assert!(idx.is_empty());
        assert!(idx.lookup("Dark", 1).is_none());
    }

    #[test]
    fn labels_use_epsilon_band() {
        assert_eq!(sentiment_label(0.03, 0.03), SentimentLabel::Positive);
        assert_eq!(sentiment_label(0.029, 0.03), SentimentLabel::Neutral);
        assert_eq!(sentiment_label(-0.03, 0.03), SentimentLabel::Negative);
        assert_eq!(sentiment_label(0.0, 0.03), SentimentLabel::Neutral);
    }

    #[test]
    fn match_rate_counts_parts() {
        let idx = SentimentIndex::build(&[rec("Ozark", 1.0, 0.1, 10)]);
        let summaries = vec![FranchiseSummary {
            franchise: "Ozark".into(),
            total: 3.0,
            parts: vec![
                SeasonPart { season_index: 1, views: 1.0 },
                SeasonPart { season_index: 2, views: 2.0 },
            ],
            latest_share: 2.0 / 3.0,
            carry_share: 1.0 / 3.0,
        }];
        let (found, total, rate) = idx.match_rate(&summaries);
        assert_eq!((found, total), (1, 2));
        assert!((rate - 0.5).abs() < 1e-12);
    }
}
