// ============================================
// Feed Service
// ============================================
//
// agent_id -> profile lookup -> RecallLayer (friend | group | semantic)
//          -> FeedMerger -> FeedEntry page
//
// Unknown agents get an empty feed. A failing profile lookup is an error;
// a failing source is not (the recall layer drops it with a warning).

use crate::config::Config;
use crate::models::{AgentProfile, FeedEntry, FeedMeta, FeedPage, FeedSource, FeedWeights};
use crate::services::merge::FeedMerger;
use crate::services::popularity::PopularityScorer;
use crate::services::recall::RecallLayer;
use crate::store::{FeedRepository, StoreError};
use crate::utils::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Caller parameters of a merged feed request.
///
/// `weights` is the raw JSON the caller sent, if any. Anything that does not
/// parse as a weights object falls back to the service defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedRequest {
    pub limit: usize,
    pub offset: usize,
    pub weights: Option<String>,
}

impl Default for FeedRequest {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
            weights: None,
        }
    }
}

impl FeedRequest {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self {
            limit,
            offset,
            weights: None,
        }
    }

    pub fn with_weights(mut self, raw: impl Into<String>) -> Self {
        self.weights = Some(raw.into());
        self
    }
}

pub struct FeedService {
    repo: Arc<dyn FeedRepository>,
    recall: RecallLayer,
    merger: FeedMerger,
    clock: Arc<dyn Clock>,
    default_weights: FeedWeights,
    max_limit: usize,
}

impl FeedService {
    pub fn new(repo: Arc<dyn FeedRepository>, clock: Arc<dyn Clock>) -> Self {
        let recall = RecallLayer::new(repo.clone(), clock.clone(), PopularityScorer::new());

        Self {
            repo,
            recall,
            merger: FeedMerger::new(),
            clock,
            default_weights: FeedWeights::default(),
            max_limit: 100,
        }
    }

    pub fn from_config(
        repo: Arc<dyn FeedRepository>,
        clock: Arc<dyn Clock>,
        config: &Config,
    ) -> Self {
        Self::new(repo, clock)
            .with_default_weights(config.default_weights())
            .with_max_limit(config.max_limit)
    }

    pub fn with_default_weights(mut self, weights: FeedWeights) -> Self {
        self.default_weights = weights;
        self
    }

    pub fn with_max_limit(mut self, max_limit: usize) -> Self {
        self.max_limit = max_limit;
        self
    }

    pub fn with_merger(mut self, merger: FeedMerger) -> Self {
        self.merger = merger;
        self
    }

    /// Personalized feed blended from all three sources.
    pub async fn generate_feed(
        &self,
        agent_id: &str,
        request: &FeedRequest,
    ) -> Result<Vec<FeedEntry>, FeedError> {
        let weights = self.effective_weights(request);
        self.build_feed(agent_id, request, &weights).await
    }

    /// [`generate_feed`](Self::generate_feed) plus paging metadata.
    ///
    /// `meta.total` is the size of the returned page, not of the full
    /// candidate set.
    pub async fn generate_feed_page(
        &self,
        agent_id: &str,
        request: &FeedRequest,
    ) -> Result<FeedPage, FeedError> {
        let weights = self.effective_weights(request);
        let feed = self.build_feed(agent_id, request, &weights).await?;

        Ok(FeedPage {
            meta: FeedMeta {
                total: feed.len(),
                limit: self.clamp_limit(request.limit),
                offset: request.offset,
                weights,
            },
            feed,
        })
    }

    pub async fn friends_feed(
        &self,
        agent_id: &str,
        limit: usize,
    ) -> Result<Vec<FeedEntry>, FeedError> {
        self.single_source_feed(FeedSource::Friend, agent_id, limit).await
    }

    pub async fn groups_feed(
        &self,
        agent_id: &str,
        limit: usize,
    ) -> Result<Vec<FeedEntry>, FeedError> {
        self.single_source_feed(FeedSource::Group, agent_id, limit).await
    }

    pub async fn discover_feed(
        &self,
        agent_id: &str,
        limit: usize,
    ) -> Result<Vec<FeedEntry>, FeedError> {
        self.single_source_feed(FeedSource::Semantic, agent_id, limit).await
    }

    async fn build_feed(
        &self,
        agent_id: &str,
        request: &FeedRequest,
        weights: &FeedWeights,
    ) -> Result<Vec<FeedEntry>, FeedError> {
        let limit = self.clamp_limit(request.limit);

        let Some(agent) = self.profile(agent_id).await? else {
            return Ok(Vec::new());
        };

        let (batch, mut stats) = self.recall.recall_candidates(&agent, weights, limit).await;

        let ranked = self.merger.merge(
            batch.friend,
            batch.group,
            batch.semantic,
            weights,
            limit,
            request.offset,
            self.clock.now(),
        );
        stats.final_count = ranked.len();

        info!(
            agent_id = %agent_id,
            friend = stats.friend_count,
            group = stats.group_count,
            semantic = stats.semantic_count,
            total_candidates = stats.total_candidates,
            final_count = stats.final_count,
            "Feed generated"
        );

        Ok(ranked.into_iter().map(FeedEntry::from).collect())
    }

    async fn single_source_feed(
        &self,
        source: FeedSource,
        agent_id: &str,
        limit: usize,
    ) -> Result<Vec<FeedEntry>, FeedError> {
        let limit = self.clamp_limit(limit);

        let Some(agent) = self.profile(agent_id).await? else {
            return Ok(Vec::new());
        };

        let candidates = self.recall.recall_source(source, &agent, limit).await;

        debug!(
            agent_id = %agent_id,
            source = source.as_str(),
            count = candidates.len(),
            "Single-source feed generated"
        );

        Ok(candidates.into_iter().map(FeedEntry::from).collect())
    }

    async fn profile(&self, agent_id: &str) -> Result<Option<AgentProfile>, FeedError> {
        let profile = self.repo.agent_profile(agent_id).await?;
        if profile.is_none() {
            debug!("Unknown agent {}, returning empty feed", agent_id);
        }
        Ok(profile)
    }

    fn effective_weights(&self, request: &FeedRequest) -> FeedWeights {
        FeedWeights::parse_or(request.weights.as_deref(), self.default_weights)
    }

    fn clamp_limit(&self, limit: usize) -> usize {
        limit.min(self.max_limit)
    }
}
