/// Recommendation Module
///
/// Top-K rankers over a caller-supplied candidate pool.
///
/// # Rankers
/// - **Similar posts**: composite similarity, band-pass filtered
/// - **Similar agents**: composite similarity, self excluded
/// - **Projects**: additive integer skill match plus a last-seat bonus
///
/// Similarity scores live in [0, 1]; project match scores are unbounded
/// integers. The two are never sorted together.
mod project_matcher;
mod similar_agents;
mod similar_posts;

pub use project_matcher::{ProjectMatchWeights, ProjectMatcher};
pub use similar_agents::SimilarAgentRanker;
pub use similar_posts::SimilarPostRanker;

use crate::models::{AgentProfile, Post, Project, ProjectMatch, SimilarAgent, SimilarPost};

/// Posts most similar to `agent`. An absent agent scores everything 0.
pub fn similar_posts(
    agent: Option<&AgentProfile>,
    candidates: Vec<Post>,
    limit: usize,
) -> Vec<SimilarPost> {
    let fallback = AgentProfile::default();
    SimilarPostRanker::new().rank(agent.unwrap_or(&fallback), candidates, limit)
}

/// Agents most similar to `agent`, never including `agent` itself.
pub fn similar_agents(
    agent: Option<&AgentProfile>,
    candidates: Vec<AgentProfile>,
    limit: usize,
) -> Vec<SimilarAgent> {
    let fallback = AgentProfile::default();
    SimilarAgentRanker::new().rank(agent.unwrap_or(&fallback), candidates, limit)
}

/// Open projects best matching the agent's skills.
pub fn recommend_projects(
    agent: Option<&AgentProfile>,
    projects: Vec<Project>,
    limit: usize,
) -> Vec<ProjectMatch> {
    let fallback = AgentProfile::default();
    ProjectMatcher::new().rank(agent.unwrap_or(&fallback), projects, limit)
}

/// Stable descending sort on an f64 key; NaN compares equal.
pub(crate) fn sort_desc_by_score<T>(items: &mut [T], score: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| {
        score(b)
            .partial_cmp(&score(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
