// ============================================
// Similarity Engine
// ============================================
//
// composite(agent, candidate) =
//     0.4 * jaccard(interests)
//   + 0.3 * jaccard(capabilities)
//   + 0.3 * cosine(agent interest words, vectorize(candidate text))
//
// A component with missing input scores 0; its weight is not handed to the
// other components, so sparse candidates top out below 1.0.

use crate::models::{AgentProfile, Post, Project};
use crate::services::text::{vectorize, TermVector};
use std::collections::HashSet;

/// Anything an agent can be compared against.
///
/// Every accessor defaults to "absent", which scores 0 for that component.
pub trait SimilarityProfile {
    fn interests(&self) -> &[String] {
        &[]
    }

    fn capabilities(&self) -> &[String] {
        &[]
    }

    fn text(&self) -> Option<&str> {
        None
    }
}

impl SimilarityProfile for Post {
    fn interests(&self) -> &[String] {
        &self.interests
    }

    fn capabilities(&self) -> &[String] {
        &self.capabilities
    }

    fn text(&self) -> Option<&str> {
        Some(&self.content)
    }
}

impl SimilarityProfile for AgentProfile {
    fn interests(&self) -> &[String] {
        &self.interests
    }

    fn capabilities(&self) -> &[String] {
        &self.capabilities
    }
}

impl SimilarityProfile for Project {
    fn capabilities(&self) -> &[String] {
        &self.required_skills
    }

    fn text(&self) -> Option<&str> {
        Some(&self.description)
    }
}

/// Component weights of the composite score. Should sum to at most 1.0 to
/// keep results in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityWeights {
    pub interests: f64,
    pub capabilities: f64,
    pub content: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            interests: 0.4,
            capabilities: 0.3,
            content: 0.3,
        }
    }
}

/// Cosine similarity of two sparse vectors.
///
/// 0.0 when either vector is empty, has zero norm, or they share no term.
pub fn cosine(a: &TermVector, b: &TermVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    let dot: f64 = small
        .iter()
        .filter_map(|(term, weight)| large.get(term).map(|other| weight * other))
        .sum();

    if dot == 0.0 {
        return 0.0;
    }

    let norm_a = a.values().map(|w| w * w).sum::<f64>().sqrt();
    let norm_b = b.values().map(|w| w * w).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
    }
}

/// Jaccard index of two label sets. Duplicates are ignored; 0/0 is 0.
pub fn jaccard(a: &[String], b: &[String]) -> f64 {
    let set_a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let set_b: HashSet<&str> = b.iter().map(String::as_str).collect();

    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }

    let intersection = set_a.intersection(&set_b).count();
    intersection as f64 / union as f64
}

/// Each interest split into lowercase words, every word weighted 1.0.
pub fn interest_vector(interests: &[String]) -> TermVector {
    interests
        .iter()
        .flat_map(|interest| {
            interest
                .to_lowercase()
                .split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .map(|word| (word, 1.0))
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityEngine {
    weights: SimilarityWeights,
}

impl SimilarityEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: SimilarityWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> SimilarityWeights {
        self.weights
    }

    pub fn composite<C>(&self, agent: &AgentProfile, candidate: &C) -> f64
    where
        C: SimilarityProfile + ?Sized,
    {
        let interests = jaccard(&agent.interests, candidate.interests());
        let capabilities = jaccard(&agent.capabilities, candidate.capabilities());
        let content = candidate
            .text()
            .map(|text| cosine(&interest_vector(&agent.interests), &vectorize(text)))
            .unwrap_or(0.0);

        let score = self.weights.interests * interests
            + self.weights.capabilities * capabilities
            + self.weights.content * content;

        score.clamp(0.0, 1.0)
    }
}

/// Composite similarity with the default weights.
pub fn composite_similarity<C>(agent: &AgentProfile, candidate: &C) -> f64
where
    C: SimilarityProfile + ?Sized,
{
    SimilarityEngine::new().composite(agent, candidate)
}
