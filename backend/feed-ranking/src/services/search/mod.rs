//! Semantic Search
//!
//! Free-text query against post bodies. The query is a flat bag of words
//! (each weight 1.0); post bodies go through the regular vectorizer; the
//! score is their cosine.

use crate::models::{Post, PostType, SearchHit};
use crate::services::similarity::cosine;
use crate::services::text::{vectorize, TermVector};
use tracing::info;

#[derive(Debug, Clone, Copy)]
pub struct SemanticSearch {
    /// Hits must score strictly above this.
    min_score: f64,
}

impl Default for SemanticSearch {
    fn default() -> Self {
        Self { min_score: 0.05 }
    }
}

impl SemanticSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_score(min_score: f64) -> Self {
        Self { min_score }
    }

    /// Query words are lowercased and whitespace-split; only words longer
    /// than two characters are kept. Stop words and punctuation are not
    /// stripped, unlike post bodies.
    pub fn query_vector(query: &str) -> TermVector {
        query
            .to_lowercase()
            .split_whitespace()
            .filter(|word| word.chars().count() > 2)
            .map(|word| (word.to_string(), 1.0))
            .collect()
    }

    pub fn search(
        &self,
        query: &str,
        candidates: Vec<Post>,
        type_filter: Option<PostType>,
        limit: usize,
    ) -> Vec<SearchHit> {
        let query_vector = Self::query_vector(query);
        if query_vector.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<SearchHit> = candidates
            .into_iter()
            .filter(|post| type_filter.map_or(true, |t| post.post_type == t))
            .filter_map(|post| {
                let score = cosine(&query_vector, &vectorize(&post.content));
                (score > self.min_score).then_some(SearchHit {
                    post,
                    similarity_score: score,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.similarity_score
                .partial_cmp(&a.similarity_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(limit);

        info!(query = %query, hit_count = hits.len(), "Semantic search completed");

        hits
    }
}

pub fn semantic_search(
    query: &str,
    candidates: Vec<Post>,
    type_filter: Option<PostType>,
    limit: usize,
) -> Vec<SearchHit> {
    SemanticSearch::new().search(query, candidates, type_filter, limit)
}
