mod friend_recall;
mod group_recall;
mod semantic_recall;

use crate::models::{AgentProfile, FeedSource, FeedWeights, RecallStats, ScoredPost};
use crate::services::popularity::PopularityScorer;
use crate::store::{self, FeedRepository};
use crate::utils::Clock;
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

pub use friend_recall::FriendRecallStrategy;
pub use group_recall::GroupRecallStrategy;
pub use semantic_recall::SemanticRecallStrategy;

/// One relationship axis of the feed (friends, groups, shared interests).
#[async_trait]
pub trait RecallStrategy: Send + Sync {
    async fn recall(&self, agent: &AgentProfile, limit: usize) -> store::Result<Vec<ScoredPost>>;
    fn source(&self) -> FeedSource;
}

/// Recalled candidates, kept apart per source.
#[derive(Debug, Clone, Default)]
pub struct RecallBatch {
    pub friend: Vec<ScoredPost>,
    pub group: Vec<ScoredPost>,
    pub semantic: Vec<ScoredPost>,
}

impl RecallBatch {
    fn slot(&mut self, source: FeedSource) -> &mut Vec<ScoredPost> {
        match source {
            FeedSource::Friend => &mut self.friend,
            FeedSource::Group => &mut self.group,
            FeedSource::Semantic => &mut self.semantic,
        }
    }

    pub fn total(&self) -> usize {
        self.friend.len() + self.group.len() + self.semantic.len()
    }
}

/// How many items to ask a source for: `round(limit * weight)`, never negative.
pub fn source_budget(limit: usize, weight: f64) -> usize {
    let budget = (limit as f64 * weight).round();
    if budget.is_finite() && budget > 0.0 {
        budget as usize
    } else {
        0
    }
}

/// Recall layer: runs every source strategy for one agent.
pub struct RecallLayer {
    strategies: Vec<Box<dyn RecallStrategy>>,
}

impl RecallLayer {
    pub fn new(
        repo: Arc<dyn FeedRepository>,
        clock: Arc<dyn Clock>,
        scorer: PopularityScorer,
    ) -> Self {
        let strategies: Vec<Box<dyn RecallStrategy>> = vec![
            Box::new(FriendRecallStrategy::new(repo.clone(), clock.clone(), scorer)),
            Box::new(GroupRecallStrategy::new(repo.clone(), clock.clone(), scorer)),
            Box::new(SemanticRecallStrategy::new(repo, clock, scorer)),
        ];

        Self { strategies }
    }

    pub fn with_strategies(strategies: Vec<Box<dyn RecallStrategy>>) -> Self {
        Self { strategies }
    }

    /// Recall from all sources concurrently, each sized by its weight.
    ///
    /// A failing source is logged and contributes nothing.
    pub async fn recall_candidates(
        &self,
        agent: &AgentProfile,
        weights: &FeedWeights,
        limit: usize,
    ) -> (RecallBatch, RecallStats) {
        let fetches = self.strategies.iter().map(|strategy| {
            let budget = source_budget(limit, weights.for_source(strategy.source()));
            async move { (strategy.source(), Self::fetch(strategy.as_ref(), agent, budget).await) }
        });

        let mut batch = RecallBatch::default();
        for (source, candidates) in join_all(fetches).await {
            batch.slot(source).extend(candidates);
        }

        let stats = RecallStats {
            friend_count: batch.friend.len(),
            group_count: batch.group.len(),
            semantic_count: batch.semantic.len(),
            total_candidates: batch.total(),
            final_count: 0,
        };

        info!(
            "Recall completed: agent_id={}, friend={}, group={}, semantic={}, total={}",
            agent.id,
            stats.friend_count,
            stats.group_count,
            stats.semantic_count,
            stats.total_candidates
        );

        (batch, stats)
    }

    /// Recall from a single source, in that source's own order.
    pub async fn recall_source(
        &self,
        source: FeedSource,
        agent: &AgentProfile,
        limit: usize,
    ) -> Vec<ScoredPost> {
        let mut candidates = Vec::new();
        for strategy in self.strategies.iter().filter(|s| s.source() == source) {
            candidates.extend(Self::fetch(strategy.as_ref(), agent, limit).await);
        }
        candidates
    }

    async fn fetch(
        strategy: &dyn RecallStrategy,
        agent: &AgentProfile,
        limit: usize,
    ) -> Vec<ScoredPost> {
        if limit == 0 {
            return Vec::new();
        }

        match strategy.recall(agent, limit).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(
                    "Recall strategy {} failed for agent {}: {}",
                    strategy.source().as_str(),
                    agent.id,
                    e
                );
                Vec::new()
            }
        }
    }
}
