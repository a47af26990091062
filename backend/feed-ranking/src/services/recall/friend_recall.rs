use super::RecallStrategy;
use crate::models::{AgentProfile, FeedSource, ScoredPost};
use crate::services::popularity::PopularityScorer;
use crate::store::{self, FeedRepository};
use crate::utils::Clock;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Friend Recall Strategy - newest posts by confirmed friends
pub struct FriendRecallStrategy {
    repo: Arc<dyn FeedRepository>,
    clock: Arc<dyn Clock>,
    scorer: PopularityScorer,
}

impl FriendRecallStrategy {
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
impl RecallStrategy for FriendRecallStrategy {
    async fn recall(&self, agent: &AgentProfile, limit: usize) -> store::Result<Vec<ScoredPost>> {
        let friend_ids = self.repo.friend_ids(&agent.id).await?;

        if friend_ids.is_empty() {
            debug!("Agent {} has no friends, friend recall returns empty", agent.id);
            return Ok(Vec::new());
        }

        let posts = self.repo.recent_posts_by_authors(&friend_ids, limit).await?;
        let now = self.clock.now();

        Ok(posts
            .into_iter()
            .map(|post| {
                let popularity = self.scorer.score_post(&post, now);
                ScoredPost::new(post, FeedSource::Friend, popularity)
            })
            .collect())
    }

    fn source(&self) -> FeedSource {
        FeedSource::Friend
    }
}
