pub mod config;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

pub use config::Config;
pub use services::{
    composite_similarity, cosine, jaccard, recommend_projects, semantic_search, similar_agents,
    similar_posts, suggest_tags, vectorize, FeedError, FeedMerger, FeedRequest, FeedService,
    PopularityScorer, RecallLayer, SimilarityEngine, SimilarityProfile,
};
pub use store::{FeedRepository, InMemoryStore, StoreError};
