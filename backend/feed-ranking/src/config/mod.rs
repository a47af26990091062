use crate::models::FeedWeights;
use serde::Deserialize;

/// Runtime configuration, read from `FEED_`-prefixed environment variables.
///
/// Algorithm constants are not configured here; they live next to the code
/// that uses them (`ScoringConfig`, `SimilarityWeights`, `MergeConfig`,
/// `ProjectMatchWeights`).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_feed_limit")]
    pub feed_limit: usize,
    #[serde(default = "default_similar_limit")]
    pub similar_limit: usize,
    #[serde(default = "default_project_limit")]
    pub project_limit: usize,
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
    /// Upper bound applied to any caller-supplied feed limit.
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
    #[serde(default = "default_weight_friends")]
    pub weight_friends: f64,
    #[serde(default = "default_weight_groups")]
    pub weight_groups: f64,
    #[serde(default = "default_weight_semantic")]
    pub weight_semantic: f64,
    /// JSON snapshot consumed by the `feed-ranking` binary.
    #[serde(default)]
    pub snapshot_path: Option<String>,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_feed_limit() -> usize {
    20
}

fn default_similar_limit() -> usize {
    10
}

fn default_project_limit() -> usize {
    5
}

fn default_search_limit() -> usize {
    10
}

fn default_max_limit() -> usize {
    100
}

fn default_weight_friends() -> f64 {
    0.4
}

fn default_weight_groups() -> f64 {
    0.3
}

fn default_weight_semantic() -> f64 {
    0.3
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::prefixed("FEED_").from_env::<Config>()
    }

    /// Source weights used when a feed request does not carry its own.
    pub fn default_weights(&self) -> FeedWeights {
        FeedWeights {
            friends: self.weight_friends,
            groups: self.weight_groups,
            semantic: self.weight_semantic,
        }
    }
}
