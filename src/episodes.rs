use std::collections::HashMap;
use tracing::debug;

use crate::keys::norm_key;
use crate::models::EpisodeRecord;

/// Episode rows keyed by (base franchise key, season), input order kept.
#[derive(Debug, Clone, Default)]
pub struct EpisodeIndex {
    by_season: HashMap<(String, u32), Vec<EpisodeRecord>>,
}

impl EpisodeIndex {
    pub fn build(records: Vec<EpisodeRecord>) -> Self {
        let mut by_season: HashMap<(String, u32), Vec<EpisodeRecord>> = HashMap::new();
        let mut unkeyed = 0usize;
        for r in records {
            let key = norm_key(&r.franchise);
            match r.season {
                Some(s) if !key.is_empty() => by_season.entry((key, s)).or_default().push(r),
                _ => unkeyed += 1,
            }
        }
        debug!("Episode index built - seasons={}, unkeyed={}", by_season.len(), unkeyed);
        Self { by_season }
    }

    pub fn season(&self, franchise: &str, season: u32) -> &[EpisodeRecord] {
        self.by_season
            .get(&(norm_key(franchise), season))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Episodes in the season that carry an overview.
    pub fn overview_count(&self, franchise: &str, season: u32) -> usize {
        self.season(franchise, season)
            .iter()
            .filter(|e| !e.overview.is_empty())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.by_season.is_empty()
    }
}

/// Episode number, or the 1-based row position when missing or zero.
pub fn episode_number(ep: &EpisodeRecord, position: usize) -> u32 {
    ep.episode.filter(|&n| n > 0).unwrap_or(position as u32 + 1)
}

/// Title shown for an episode: its own, else "Ep <number or position>".
pub fn display_title(ep: &EpisodeRecord, position: usize) -> String {
    if !ep.title.is_empty() {
        return ep.title.clone();
    }
    format!("Ep {}", episode_number(ep, position))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ep(fr: &str, season: Option<u32>, n: Option<u32>, title: &str, overview: &str) -> EpisodeRecord {
        EpisodeRecord {
            franchise: fr.to_string(),
            season,
            episode: n,
            title: title.to_string(),
            overview: overview.to_string(),
            score: None,
        }
    }

    #[test]
    fn groups_by_base_key_and_season() {
        let idx = EpisodeIndex::build(vec![
            ep("Dark", Some(1), Some(1), "Secrets", "a"),
            ep("DARK!", Some(1), Some(2), "Lies", ""),
            ep("Dark", Some(2), Some(1), "Beginnings", "b"),
            ep("Dark", None, None, "Orphan", "c"),
        ]);
        let s1 = idx.season("dark", 1);
        assert_eq!(s1.len(), 2);
        assert_eq!(s1[1].title, "Lies");
        assert_eq!(idx.overview_count("Dark", 1), 1);
        assert_eq!(idx.season("Dark", 2).len(), 1);
        assert!(idx.season("Dark", 3).is_empty());
    }

    #[test]
    fn display_title_falls_back_to_number() {
        assert_eq!(display_title(&ep("X", Some(1), Some(7), "", ""), 0), "Ep 7");
        assert_eq!(display_title(&ep("X", Some(1), None, "", ""), 2), "Ep 3");
        assert_eq!(display_title(&ep("X", Some(1), None, "Pilot", ""), 0), "Pilot");
    }

    #[test]
    fn episode_zero_uses_position() {
        let zero = ep("X", Some(1), Some(0), "", "");
        assert_eq!(episode_number(&zero, 4), 5);
        assert_eq!(display_title(&zero, 4), "Ep 5");
        assert_eq!(episode_number(&ep("X", Some(1), Some(3), "", ""), 4), 3);
    }
}
