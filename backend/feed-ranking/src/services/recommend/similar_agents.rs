use super::sort_desc_by_score;
use crate::models::{AgentProfile, SimilarAgent};
use crate::services::similarity::SimilarityEngine;
use tracing::info;

/// Similar agent ranker
///
/// Agents carry no text, so the content component always scores 0 and the
/// best attainable score is the sum of the label weights.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarAgentRanker {
    engine: SimilarityEngine,
}

impl SimilarAgentRanker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(engine: SimilarityEngine) -> Self {
        Self { engine }
    }

    pub fn rank(
        &self,
        agent: &AgentProfile,
        candidates: Vec<AgentProfile>,
        limit: usize,
    ) -> Vec<SimilarAgent> {
        let mut scored: Vec<SimilarAgent> = candidates
            .into_iter()
            .filter(|other| other.id != agent.id)
            .map(|other| SimilarAgent {
                similarity_score: self.engine.composite(agent, &other),
                agent: other,
            })
            .collect();

        sort_desc_by_score(&mut scored, |s| s.similarity_score);
        scored.truncate(limit);

        info!(agent_id = %agent.id, output_count = scored.len(), "Similar agents ranked");

        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::similarity::SimilarityWeights;

    fn profile(id: &str, interests: &[&str], capabilities: &[&str]) -> AgentProfile {
        AgentProfile {
            id: id.to_string(),
            name: id.to_uppercase(),
            bio: None,
            interests: interests.iter().map(|s| s.to_string()).collect(),
            capabilities: capabilities.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_excludes_self() {
        let me = profile("me", &["rust"], &["coding"]);
        let ranked = SimilarAgentRanker::new().rank(
            &me,
            vec![me.clone(), profile("other", &["rust"], &[])],
            10,
        );

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].agent.id, "other");
    }

    #[test]
    fn test_identical_labels_score_without_content_component() {
        let me = profile("me", &["rust"], &["coding"]);
        let ranked =
            SimilarAgentRanker::new().rank(&me, vec![profile("twin", &["rust"], &["coding"])], 10);

        // 0.4 + 0.3, nothing from content
        assert!((ranked[0].similarity_score - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_zero_scores_are_kept_and_order_is_stable() {
        let me = profile("me", &["rust"], &["coding"]);
        let ranked = SimilarAgentRanker::new().rank(
            &me,
            vec![
                profile("a", &["art"], &[]),
                profile("b", &["rust"], &[]),
                profile("c", &["music"], &[]),
            ],
            10,
        );

        let ids: Vec<&str> = ranked.iter().map(|s| s.agent.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(ranked[1].similarity_score, 0.0);
    }

    #[test]
    fn test_custom_engine() {
        let engine = SimilarityEngine::with_weights(SimilarityWeights {
            interests: 0.0,
            capabilities: 1.0,
            content: 0.0,
        });
        let me = profile("me", &["rust"], &["coding"]);
        let ranked = SimilarAgentRanker::with_engine(engine)
            .rank(&me, vec![profile("twin", &["art"], &["coding"])], 10);

        assert_eq!(ranked[0].similarity_score, 1.0);
    }

    #[test]
    fn test_limit() {
        let me = profile("me", &["rust"], &[]);
        let pool: Vec<AgentProfile> = (0..20)
            .map(|i| profile(&format!("agent-{}", i), &["rust"], &[]))
            .collect();

        assert_eq!(SimilarAgentRanker::new().rank(&me, pool, 10).len(), 10);
    }
}
