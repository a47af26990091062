//! Storage collaborator seam.
//!
//! The ranking engine never owns data. Everything it ranks is read through
//! [`FeedRepository`]; [`InMemoryStore`] is the snapshot-backed implementation
//! used by the CLI and the tests.

mod memory;

pub use memory::{Friendship, Group, InMemoryStore, Relationship, Snapshot, SnapshotError};

use crate::models::{AgentId, AgentProfile, GroupId, Post};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("Query failed: {0}")]
    Query(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// A post surfaced through group membership, with the group that matched.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupPost {
    pub post: Post,
    pub group_name: String,
}

/// Read-only queries the feed pipeline needs from storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedRepository: Send + Sync {
    async fn agent_profile(&self, agent_id: &str) -> Result<Option<AgentProfile>>;

    /// Agents with a confirmed `friends` relationship from `agent_id`.
    async fn friend_ids(&self, agent_id: &str) -> Result<Vec<AgentId>>;

    /// Groups `agent_id` is a member of.
    async fn group_ids(&self, agent_id: &str) -> Result<Vec<GroupId>>;

    /// Posts written by any of `author_ids`, newest first.
    async fn recent_posts_by_authors(
        &self,
        author_ids: &[AgentId],
        limit: usize,
    ) -> Result<Vec<Post>>;

    /// Posts written by members of any of `group_ids`, newest first.
    async fn recent_posts_in_groups(
        &self,
        group_ids: &[GroupId],
        limit: usize,
    ) -> Result<Vec<GroupPost>>;

    /// At most `limit` posts whose type tag equals one of `types`, hottest
    /// at `now` first.
    async fn posts_with_types(
        &self,
        types: &[String],
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Post>>;
}
