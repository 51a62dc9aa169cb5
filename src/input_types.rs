use serde::{Deserialize, Serialize};

// CSV row shapes. Numeric cells are lenient: anything unparsable is None.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewingCsvRow {
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Simple_Title", default)]
    pub simple_title: String,
    #[serde(rename = "Views", default, deserialize_with = "csv::invalid_option")]
    pub views: Option<f64>,
    #[serde(rename = "Release Date", default)]
    pub release_date: String, // "2023-07-14", "7/14/2023", ...
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub net_season: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentCsvRow {
    #[serde(default)]
    pub franchise: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub season: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub avg_score: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub n_episodes: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeCsvRow {
    #[serde(default)]
    pub franchise: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub season: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub episode: Option<f64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub episode_overview: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub sentiment: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconCsvRow {
    #[serde(default)]
    pub word: String,
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub token: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub score: Option<f64>,
}
