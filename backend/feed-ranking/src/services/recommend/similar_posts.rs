use super::sort_desc_by_score;
use crate::models::{AgentProfile, Post, SimilarPost};
use crate::services::similarity::SimilarityEngine;
use tracing::info;

/// Similar post ranker
///
/// Keeps posts scoring strictly between `min_score` and `max_score`. The
/// upper bound drops near-identical posts, which are usually the agent's own.
#[derive(Debug, Clone, Copy)]
pub struct SimilarPostRanker {
    engine: SimilarityEngine,
    min_score: f64,
    max_score: f64,
}

impl Default for SimilarPostRanker {
    fn default() -> Self {
        Self {
            engine: SimilarityEngine::new(),
            min_score: 0.1,
            max_score: 0.95,
        }
    }
}

impl SimilarPostRanker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(mut self, engine: SimilarityEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_thresholds(mut self, min_score: f64, max_score: f64) -> Self {
        self.min_score = min_score;
        self.max_score = max_score;
        self
    }

    pub fn rank(
        &self,
        agent: &AgentProfile,
        candidates: Vec<Post>,
        limit: usize,
    ) -> Vec<SimilarPost> {
        let input_count = candidates.len();

        let mut scored: Vec<SimilarPost> = candidates
            .into_iter()
            .map(|post| SimilarPost {
                similarity_score: self.engine.composite(agent, &post),
                post,
            })
            .filter(|s| s.similarity_score > self.min_score && s.similarity_score < self.max_score)
            .collect();

        sort_desc_by_score(&mut scored, |s| s.similarity_score);
        scored.truncate(limit);

        info!(
            agent_id = %agent.id,
            input_count = input_count,
            output_count = scored.len(),
            "Similar posts ranked"
        );

        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PostType;
    use crate::services::similarity::SimilarityWeights;
    use chrono::Utc;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn post(id: &str, content: &str, interests: &[&str], capabilities: &[&str]) -> Post {
        Post {
            id: id.to_string(),
            author_id: format!("author-{}", id),
            author_name: String::new(),
            title: None,
            content: content.to_string(),
            post_type: PostType::Code,
            upvotes: 0,
            downvotes: 0,
            created_at: Utc::now(),
            interests: labels(interests),
            capabilities: labels(capabilities),
        }
    }

    fn agent() -> AgentProfile {
        AgentProfile {
            id: "me".to_string(),
            interests: labels(&["rust", "search"]),
            capabilities: labels(&["coding"]),
            ..Default::default()
        }
    }

    #[test]
    fn test_band_filter() {
        let candidates = vec![
            // identical profile and matching text: 1.0, dropped as near-identical
            post("twin", "rust search", &["rust", "search"], &["coding"]),
            // nothing in common: 0.0, dropped as too dissimilar
            post("stranger", "watercolor painting", &["art"], &["drawing"]),
            // partial overlap
            post("peer", "rust tooling", &["rust"], &["coding"]),
        ];

        let ranked = SimilarPostRanker::new().rank(&agent(), candidates, 10);
        let ids: Vec<&str> = ranked.iter().map(|s| s.post.id.as_str()).collect();
        assert_eq!(ids, vec!["peer"]);
    }

    #[test]
    fn test_sorted_and_truncated() {
        let candidates = vec![
            post("weak", "", &["rust", "music", "art"], &[]),
            post("strong", "rust", &["rust"], &["coding"]),
            post("middle", "", &["rust"], &[]),
        ];

        let ranked = SimilarPostRanker::new().rank(&agent(), candidates, 2);
        let ids: Vec<&str> = ranked.iter().map(|s| s.post.id.as_str()).collect();
        assert_eq!(ids, vec!["strong", "middle"]);
        assert!(ranked[0].similarity_score >= ranked[1].similarity_score);
    }

    #[test]
    fn test_custom_thresholds_keep_near_identical() {
        let candidates = vec![
            post("twin", "rust search", &["rust", "search"], &["coding"]),
            post("peer", "rust tooling", &["rust"], &["coding"]),
        ];

        let ranked = SimilarPostRanker::new()
            .with_thresholds(0.5, 1.01)
            .rank(&agent(), candidates, 10);

        let ids: Vec<&str> = ranked.iter().map(|s| s.post.id.as_str()).collect();
        assert_eq!(ids, vec!["twin", "peer"]);
    }

    #[test]
    fn test_custom_engine() {
        let engine = SimilarityEngine::with_weights(SimilarityWeights {
            interests: 1.0,
            capabilities: 0.0,
            content: 0.0,
        });
        let candidates = vec![post("peer", "rust tooling", &["rust"], &["coding"])];

        let ranked = SimilarPostRanker::new()
            .with_engine(engine)
            .rank(&agent(), candidates, 10);

        assert_eq!(ranked.len(), 1);
        assert!((ranked[0].similarity_score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_pool() {
        assert!(SimilarPostRanker::new().rank(&agent(), vec![], 10).is_empty());
    }

    #[test]
    fn test_empty_agent_returns_nothing() {
        let candidates = vec![post("p", "rust search", &["rust"], &["coding"])];
        let ranked = SimilarPostRanker::new().rank(&AgentProfile::default(), candidates, 10);
        assert!(ranked.is_empty());
    }
}
