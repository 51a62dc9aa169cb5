use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One title/season row of the viewing dataset, validated at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawViewingRecord {
    pub franchise: String, // display key, used for grouping
    pub title: String,
    pub simple_title: String,
    pub views: f64,
    pub release_date: Option<NaiveDate>,
    pub net_season: Option<f64>, // may be non-finite
}

/// A viewing row that passed the scope filter. `views > 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRow {
    pub franchise: String,
    pub title: String,
    pub simple_title: String,
    pub views: f64,
    pub release_date: Option<NaiveDate>,
    pub net_season: Option<f64>, // finite or None
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonAssignment {
    pub row: NormalizedRow,
    pub season_index: u32, // dense, 1-based within the franchise
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonPart {
    pub season_index: u32,
    pub views: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FranchiseSummary {
    pub franchise: String,
    pub total: f64,
    pub parts: Vec<SeasonPart>, // ascending by season_index
    pub latest_share: f64,
    pub carry_share: f64,
}

/// Validated row of the sentiment dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub franchise: String,
    pub season: Option<f64>,
    pub avg_score: Option<f64>,
    pub n_episodes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentEntry {
    pub avg: f64,
    pub episodes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub franchise: String,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub title: String,
    pub overview: String,
    pub score: Option<f64>, // finite only
}

/// Word weights used to highlight episode overviews.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lexicon {
    weights: std::collections::HashMap<String, f64>,
}

impl Lexicon {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let weights = pairs
            .into_iter()
            .map(|(w, s)| (w.as_ref().trim().to_lowercase(), s))
            .filter(|(w, _)| !w.is_empty())
            .collect();
        Self { weights }
    }

    /// Small built-in table for when no lexicon file is available.
    pub fn builtin() -> Self {
        Self::from_pairs([
            ("good", 2.0),
            ("great", 3.0),
            ("excellent", 4.0),
            ("love", 3.0),
            ("fun", 2.0),
            ("bad", -2.0),
            ("terrible", -4.0),
            ("murder", -3.0),
            ("kill", -3.0),
            ("hate", -3.0),
        ])
    }

    pub fn weight(&self, word: &str) -> f64 {
        self.weights.get(&word.to_lowercase()).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}
