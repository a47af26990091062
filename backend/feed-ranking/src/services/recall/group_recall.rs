use super::RecallStrategy;
use crate::models::{AgentProfile, FeedSource, ScoredPost};
use crate::services::popularity::PopularityScorer;
use crate::store::{self, FeedRepository};
use crate::utils::Clock;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Group Recall Strategy - newest posts by members of the agent's groups
pub struct GroupRecallStrategy {
    repo: Arc<dyn FeedRepository>,
    clock: Arc<dyn Clock>,
    scorer: PopularityScorer,
}

impl GroupRecallStrategy {
    pub fn new(
        repo: Arc<dyn FeedRepository>,
        clock: Arc<dyn Clock>,
        scorer: PopularityScorer,
    ) -> Self {
        Self {
            repo,
            clock,
            scorer,
        }
    }
}

#[async_trait]
impl RecallStrategy for GroupRecallStrategy {
    async fn recall(&self, agent: &AgentProfile, limit: usize) -> store::Result<Vec<ScoredPost>> {
        let group_ids = self.repo.group_ids(&agent.id).await?;

        if group_ids.is_empty() {
            debug!("Agent {} is in no groups, group recall returns empty", agent.id);
            return Ok(Vec::new());
        }

        let rows = self.repo.recent_posts_in_groups(&group_ids, limit).await?;
        let now = self.clock.now();

        Ok(rows
            .into_iter()
            .map(|row| {
                let popularity = self.scorer.score_post(&row.post, now);
                ScoredPost::new(row.post, FeedSource::Group, popularity).with_group(row.group_name)
            })
            .collect())
    }

    fn source(&self) -> FeedSource {
        FeedSource::Group
    }
}
