use super::RecallStrategy;
use crate::models::{AgentProfile, FeedSource, ScoredPost};
use crate::services::popularity::PopularityScorer;
use crate::store::{self, FeedRepository};
use crate::utils::Clock;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Semantic Recall Strategy - posts whose type matches one of the agent's
/// interest or capability labels, most popular first.
///
/// Label matching only; no embeddings are involved.
pub struct SemanticRecallStrategy {
    repo: Arc<dyn FeedRepository>,
    clock: Arc<dyn Clock>,
    scorer: PopularityScorer,
}

impl SemanticRecallStrategy {
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

    fn labels(agent: &AgentProfile) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        for label in agent.interests.iter().chain(agent.capabilities.iter()) {
            if !labels.contains(label) {
                labels.push(label.clone());
            }
        }
        labels
    }
}

#[async_trait]
impl RecallStrategy for SemanticRecallStrategy {
    async fn recall(&self, agent: &AgentProfile, limit: usize) -> store::Result<Vec<ScoredPost>> {
        let labels = Self::labels(agent);

        if labels.is_empty() {
            debug!("Agent {} has no labels, semantic recall returns empty", agent.id);
            return Ok(Vec::new());
        }

        let now = self.clock.now();
        let posts = self.repo.posts_with_types(&labels, now, limit).await?;

        let mut candidates: Vec<ScoredPost> = posts
            .into_iter()
            .map(|post| {
                let popularity = self.scorer.score_post(&post, now);
                ScoredPost::new(post, FeedSource::Semantic, popularity)
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.popularity_score
                .partial_cmp(&a.popularity_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.post.created_at.cmp(&a.post.created_at))
        });
        candidates.truncate(limit);

        Ok(candidates)
    }

    fn source(&self) -> FeedSource {
        FeedSource::Semantic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Post, PostType};
    use crate::store::MockFeedRepository;
    use crate::utils::FixedClock;
    use chrono::{Duration, TimeZone, Utc};

    fn post(id: &str, post_type: PostType, upvotes: u32, hours_ago: i64) -> Post {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        Post {
            id: id.to_string(),
            author_id: "someone".to_string(),
            author_name: String::new(),
            title: None,
            content: String::new(),
            post_type,
            upvotes,
            downvotes: 0,
            created_at: now - Duration::hours(hours_ago),
            interests: vec![],
            capabilities: vec![],
        }
    }

    #[tokio::test]
    async fn test_no_labels_returns_empty() {
        let mut repo = MockFeedRepository::new();
        repo.expect_posts_with_types().never();

        let strategy = SemanticRecallStrategy::new(
            Arc::new(repo),
            Arc::new(FixedClock(Utc::now())),
            PopularityScorer::new(),
        );

        let candidates = strategy
            .recall(&AgentProfile::default(), 10)
            .await
            .unwrap();
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_sorted_by_popularity_and_truncated() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut repo = MockFeedRepository::new();
        repo.expect_posts_with_types()
            .withf(|types, _, limit| {
                types == ["code".to_string(), "tool".to_string()] && *limit == 2
            })
            .returning(|_, _, _| {
                Ok(vec![
                    post("cold", PostType::Code, 1, 48),
                    post("hot", PostType::Tool, 100, 1),
                    post("warm", PostType::Code, 10, 2),
                ])
            });

        let strategy = SemanticRecallStrategy::new(
            Arc::new(repo),
            Arc::new(FixedClock(now)),
            PopularityScorer::new(),
        );
        let agent = AgentProfile {
            id: "me".to_string(),
            interests: vec!["code".to_string()],
            capabilities: vec!["tool".to_string(), "code".to_string()],
            ..Default::default()
        };

        let candidates = strategy.recall(&agent, 2).await.unwrap();
        let ids: Vec<&str> = candidates.iter().map(|c| c.post.id.as_str()).collect();
        assert_eq!(ids, vec!["hot", "warm"]);
        assert!(candidates.iter().all(|c| c.source == FeedSource::Semantic));
    }
}
