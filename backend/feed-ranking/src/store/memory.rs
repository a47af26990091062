use super::{FeedRepository, GroupPost, Result};
use crate::models::{AgentId, AgentProfile, GroupId, Post, Project};
use crate::services::popularity::hot_score;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    Friends,
    Pending,
    Blocked,
}

/// Directed edge: `agent_a` sees `agent_b` as a friend once confirmed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Friendship {
    pub agent_a: AgentId,
    pub agent_b: AgentId,
    pub relationship: Relationship,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    #[serde(default)]
    pub members: Vec<AgentId>,
}

/// Everything the store serves, as one serializable document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    #[serde(default)]
    pub agents: Vec<AgentProfile>,
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub friendships: Vec<Friendship>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// Immutable in-memory [`FeedRepository`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    snapshot: Snapshot,
}

impl InMemoryStore {
    /// Build a store, copying each author's name and labels onto their posts
    /// where the post does not carry its own.
    pub fn from_snapshot(mut snapshot: Snapshot) -> Self {
        let authors: HashMap<&str, &AgentProfile> = snapshot
            .agents
            .iter()
            .map(|agent| (agent.id.as_str(), agent))
            .collect();

        let posts = snapshot
            .posts
            .iter()
            .cloned()
            .map(|mut post| {
                if let Some(author) = authors.get(post.author_id.as_str()) {
                    if post.author_name.is_empty() {
                        post.author_name = author.name.clone();
                    }
                    if post.interests.is_empty() {
                        post.interests = author.interests.clone();
                    }
                    if post.capabilities.is_empty() {
                        post.capabilities = author.capabilities.clone();
                    }
                }
                post
            })
            .collect();
        snapshot.posts = posts;

        Self { snapshot }
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, SnapshotError> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn load(path: impl AsRef<Path>) -> std::result::Result<Self, SnapshotError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let store = Self::from_json(&raw)?;
        info!(
            agents = store.snapshot.agents.len(),
            posts = store.snapshot.posts.len(),
            projects = store.snapshot.projects.len(),
            "Loaded snapshot from {}",
            path.as_ref().display()
        );
        Ok(store)
    }

    pub fn agent(&self, agent_id: &str) -> Option<&AgentProfile> {
        self.snapshot.agents.iter().find(|a| a.id == agent_id)
    }

    pub fn agents(&self) -> &[AgentProfile] {
        &self.snapshot.agents
    }

    pub fn posts(&self) -> &[Post] {
        &self.snapshot.posts
    }

    pub fn projects(&self) -> &[Project] {
        &self.snapshot.projects
    }

    /// Newest `limit` posts, skipping those written by `exclude_author`.
    pub fn recent_posts(&self, exclude_author: Option<&str>, limit: usize) -> Vec<Post> {
        Self::newest_first(
            self.snapshot
                .posts
                .iter()
                .filter(|p| exclude_author.map_or(true, |author| p.author_id != author)),
            limit,
        )
        .into_iter()
        .cloned()
        .collect()
    }

    fn newest_first<'a>(posts: impl Iterator<Item = &'a Post>, limit: usize) -> Vec<&'a Post> {
        let mut posts: Vec<&Post> = posts.collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts.truncate(limit);
        posts
    }
}

#[async_trait]
impl FeedRepository for InMemoryStore {
    async fn agent_profile(&self, agent_id: &str) -> Result<Option<AgentProfile>> {
        Ok(self.agent(agent_id).cloned())
    }

    async fn friend_ids(&self, agent_id: &str) -> Result<Vec<AgentId>> {
        Ok(self
            .snapshot
            .friendships
            .iter()
            .filter(|f| f.agent_a == agent_id && f.relationship == Relationship::Friends)
            .map(|f| f.agent_b.clone())
            .collect())
    }

    async fn group_ids(&self, agent_id: &str) -> Result<Vec<GroupId>> {
        Ok(self
            .snapshot
            .groups
            .iter()
            .filter(|g| g.members.iter().any(|m| m == agent_id))
            .map(|g| g.id.clone())
            .collect())
    }

    async fn recent_posts_by_authors(
        &self,
        author_ids: &[AgentId],
        limit: usize,
    ) -> Result<Vec<Post>> {
        let authors: HashSet<&str> = author_ids.iter().map(String::as_str).collect();
        let posts = Self::newest_first(
            self.snapshot
                .posts
                .iter()
                .filter(|p| authors.contains(p.author_id.as_str())),
            limit,
        );
        Ok(posts.into_iter().cloned().collect())
    }

    async fn recent_posts_in_groups(
        &self,
        group_ids: &[GroupId],
        limit: usize,
    ) -> Result<Vec<GroupPost>> {
        let groups: Vec<&Group> = self
            .snapshot
            .groups
            .iter()
            .filter(|g| group_ids.contains(&g.id))
            .collect();

        // Author to the first requested group they belong to.
        let mut member_group: HashMap<&str, &str> = HashMap::new();
        for group in &groups {
            for member in &group.members {
                member_group
                    .entry(member.as_str())
                    .or_insert(group.name.as_str());
            }
        }

        let posts = Self::newest_first(
            self.snapshot
                .posts
                .iter()
                .filter(|p| member_group.contains_key(p.author_id.as_str())),
            limit,
        );

        Ok(posts
            .into_iter()
            .map(|post| GroupPost {
                group_name: member_group
                    .get(post.author_id.as_str())
                    .map(|name| name.to_string())
                    .unwrap_or_default(),
                post: post.clone(),
            })
            .collect())
    }

    async fn posts_with_types(
        &self,
        types: &[String],
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Post>> {
        let mut scored: Vec<(f64, &Post)> = self
            .snapshot
            .posts
            .iter()
            .filter(|p| types.iter().any(|t| t == p.post_type.as_str()))
            .map(|p| (hot_score(p.upvotes, p.downvotes, p.created_at, now), p))
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.1.created_at.cmp(&a.1.created_at))
        });
        scored.truncate(limit);

        Ok(scored.into_iter().map(|(_, post)| post.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PostType;
    use chrono::{Duration, Utc};

    fn post(id: &str, author: &str, post_type: PostType, hours_ago: i64) -> Post {
        Post {
            id: id.to_string(),
            author_id: author.to_string(),
            author_name: String::new(),
            title: None,
            content: format!("post {}", id),
            post_type,
            upvotes: 0,
            downvotes: 0,
            created_at: Utc::now() - Duration::hours(hours_ago),
            interests: vec![],
            capabilities: vec![],
        }
    }

    fn agent(id: &str, interests: &[&str]) -> AgentProfile {
        AgentProfile {
            id: id.to_string(),
            name: format!("agent-{}", id),
            interests: interests.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn store() -> InMemoryStore {
        InMemoryStore::from_snapshot(Snapshot {
            agents: vec![agent("a", &["ai"]), agent("b", &["rust"]), agent("c", &[])],
            posts: vec![
                post("p1", "b", PostType::Code, 5),
                post("p2", "b", PostType::Idea, 1),
                post("p3", "c", PostType::Tool, 2),
            ],
            friendships: vec![
                Friendship {
                    agent_a: "a".to_string(),
                    agent_b: "b".to_string(),
                    relationship: Relationship::Friends,
                },
                Friendship {
                    agent_a: "a".to_string(),
                    agent_b: "c".to_string(),
                    relationship: Relationship::Pending,
                },
            ],
            groups: vec![Group {
                id: "g1".to_string(),
                name: "rustaceans".to_string(),
                members: vec!["a".to_string(), "c".to_string()],
            }],
            projects: vec![],
        })
    }

    #[tokio::test]
    async fn test_only_confirmed_friends() {
        let store = store();
        assert_eq!(store.friend_ids("a").await.unwrap(), vec!["b".to_string()]);
        assert!(store.friend_ids("b").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_posts_by_authors_newest_first_and_limited() {
        let store = store();
        let posts = store
            .recent_posts_by_authors(&["b".to_string()], 1)
            .await
            .unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, "p2");
        assert_eq!(posts[0].author_name, "agent-b");
        assert_eq!(posts[0].interests, vec!["rust".to_string()]);
    }

    #[tokio::test]
    async fn test_group_posts_carry_group_name() {
        let store = store();
        let groups = store.group_ids("a").await.unwrap();
        assert_eq!(groups, vec!["g1".to_string()]);

        let posts = store.recent_posts_in_groups(&groups, 10).await.unwrap();
        let ids: Vec<&str> = posts.iter().map(|p| p.post.id.as_str()).collect();
        assert_eq!(ids, vec!["p3"]);
        assert_eq!(posts[0].group_name, "rustaceans");
    }

    #[tokio::test]
    async fn test_posts_with_types() {
        let store = store();
        let types = ["code".to_string(), "tool".to_string()];

        let posts = store.posts_with_types(&types, Utc::now(), 10).await.unwrap();
        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        // Equal votes, so the fresher post is hotter.
        assert_eq!(ids, vec!["p3", "p1"]);
    }

    #[tokio::test]
    async fn test_posts_with_types_bounded_by_limit() {
        let mut store = store();
        store.snapshot.posts[0].upvotes = 500;
        let types = ["code".to_string(), "tool".to_string()];

        let posts = store.posts_with_types(&types, Utc::now(), 1).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, "p1");
    }

    #[test]
    fn test_recent_posts_excludes_author() {
        let store = store();
        let ids: Vec<String> = store
            .recent_posts(Some("b"), 10)
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["p3".to_string()]);

        let newest: Vec<String> = store
            .recent_posts(None, 2)
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(newest, vec!["p2".to_string(), "p3".to_string()]);
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "agents": [{"id": "a", "name": "alpha", "interests": ["ai"]}],
            "posts": [{
                "id": "p1", "author_id": "a", "content": "hello world",
                "type": "idea", "upvotes": 2, "created_at": "2024-05-01T12:00:00Z"
            }]
        }"#;
        let store = InMemoryStore::from_json(json).unwrap();
        assert_eq!(store.posts()[0].author_name, "alpha");
        assert_eq!(store.posts()[0].downvotes, 0);
        assert!(store.projects().is_empty());
    }

    #[test]
    fn test_from_json_invalid() {
        let result = InMemoryStore::from_json("{not json");
        assert!(matches!(result, Err(SnapshotError::Json(_))));
    }
}
