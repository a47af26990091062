pub mod feed;
pub mod merge;
pub mod popularity;
pub mod recall;
pub mod recommend;
pub mod search;
pub mod similarity;
pub mod text;

pub use feed::{FeedError, FeedRequest, FeedService};
pub use merge::{FeedMerger, MergeConfig};
pub use popularity::{hot_score, PopularityScorer, ScoringConfig};
pub use recall::{RecallLayer, RecallStrategy};
pub use recommend::{
    recommend_projects, similar_agents, similar_posts, ProjectMatchWeights, ProjectMatcher,
    SimilarAgentRanker, SimilarPostRanker,
};
pub use search::{semantic_search, SemanticSearch};
pub use similarity::{
    composite_similarity, cosine, jaccard, SimilarityEngine, SimilarityProfile, SimilarityWeights,
};
pub use text::{suggest_tags, vectorize, TermVector};
