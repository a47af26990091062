// ============================================
// Feed Merger
// ============================================
//
// friend ++ group ++ semantic
//   -> dedupe by post id (first occurrence wins)
//   -> final = popularity * (1 + source_weight) [* 1.2 if < 24h old]
//   -> sort desc -> [offset, offset + limit)
//
// First-wins dedup means a friend copy of a post masks a group copy even if
// the group copy would have scored higher. Callers see that ordering today,
// so it stays until ranking is deliberately changed.

use crate::models::{FeedSource, FeedWeights, ScoredPost};
use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

/// Constants of the final-score formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeConfig {
    /// Multiplier on `weights.groups` for group-sourced posts.
    pub group_damping: f64,
    /// Multiplier on `weights.semantic` for semantic-sourced posts.
    pub semantic_damping: f64,
    pub recency_boost: f64,
    pub recency_window: Duration,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            group_damping: 0.8,
            semantic_damping: 0.6,
            recency_boost: 1.2,
            recency_window: Duration::hours(24),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FeedMerger {
    config: MergeConfig,
}

impl FeedMerger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MergeConfig) -> Self {
        Self { config }
    }

    /// Merge the three source lists into one ranked page.
    ///
    /// Ties on `final_score` go to the newer post, then the smaller id.
    #[allow(clippy::too_many_arguments)]
    pub fn merge(
        &self,
        friend: Vec<ScoredPost>,
        group: Vec<ScoredPost>,
        semantic: Vec<ScoredPost>,
        weights: &FeedWeights,
        limit: usize,
        offset: usize,
        now: DateTime<Utc>,
    ) -> Vec<ScoredPost> {
        let input_count = friend.len() + group.len() + semantic.len();

        let mut seen: HashSet<String> = HashSet::new();
        let mut merged: Vec<ScoredPost> = friend
            .into_iter()
            .chain(group)
            .chain(semantic)
            .filter(|candidate| seen.insert(candidate.post.id.clone()))
            .map(|mut candidate| {
                candidate.final_score = self.final_score(&candidate, weights, now);
                candidate
            })
            .collect();

        let unique_count = merged.len();
        merged.sort_by(compare_ranked);

        let page: Vec<ScoredPost> = merged.into_iter().skip(offset).take(limit).collect();

        debug!(
            input_count = input_count,
            unique_count = unique_count,
            output_count = page.len(),
            "Feed merge completed"
        );

        page
    }

    pub fn source_weight(&self, source: FeedSource, weights: &FeedWeights) -> f64 {
        match source {
            FeedSource::Friend => weights.friends,
            FeedSource::Group => weights.groups * self.config.group_damping,
            FeedSource::Semantic => weights.semantic * self.config.semantic_damping,
        }
    }

    pub fn final_score(
        &self,
        candidate: &ScoredPost,
        weights: &FeedWeights,
        now: DateTime<Utc>,
    ) -> f64 {
        let mut score =
            candidate.popularity_score * (1.0 + self.source_weight(candidate.source, weights));

        if now - candidate.post.created_at < self.config.recency_window {
            score *= self.config.recency_boost;
        }

        score
    }
}

fn compare_ranked(a: &ScoredPost, b: &ScoredPost) -> Ordering {
    b.final_score
        .partial_cmp(&a.final_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.post.created_at.cmp(&a.post.created_at))
        .then_with(|| a.post.id.cmp(&b.post.id))
}
