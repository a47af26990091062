// ============================================
// Popularity Scorer (hot score)
// ============================================
//
// Reddit-style hot ranking:
//   s     = upvotes - downvotes
//   order = log10(|s| + 1)
//   hot   = order - age_seconds / 45000
//
// The magnitude term ignores the sign of `s`, so a post at -9 has the same
// order as one at +9. That asymmetry is kept as-is.

use crate::models::Post;
use chrono::{DateTime, Utc};

/// Tunables for the hot score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringConfig {
    /// Seconds of age that cost one order of magnitude of net votes.
    pub decay_seconds: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            decay_seconds: 45_000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PopularityScorer {
    config: ScoringConfig,
}

impl PopularityScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn score(
        &self,
        upvotes: u32,
        downvotes: u32,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> f64 {
        let net = i64::from(upvotes) - i64::from(downvotes);
        let order = ((net.abs() + 1) as f64).log10();
        let age_seconds = (now - created_at).num_milliseconds() as f64 / 1000.0;

        order - age_seconds / self.config.decay_seconds
    }

    pub fn score_post(&self, post: &Post, now: DateTime<Utc>) -> f64 {
        self.score(post.upvotes, post.downvotes, post.created_at, now)
    }
}

/// Hot score with the default decay.
pub fn hot_score(
    upvotes: u32,
    downvotes: u32,
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> f64 {
    PopularityScorer::new().score(upvotes, downvotes, created_at, now)
}
