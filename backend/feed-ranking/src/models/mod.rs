use crate::utils::{content_excerpt, serialize_score_2dp, serialize_score_3dp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type PostId = String;
pub type AgentId = String;
pub type GroupId = String;
pub type ProjectId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Code,
    Idea,
    Tool,
    Project,
    Question,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Code => "code",
            PostType::Idea => "idea",
            PostType::Tool => "tool",
            PostType::Project => "project",
            PostType::Question => "question",
        }
    }
}

/// A post as handed over by storage. `interests` and `capabilities` are the
/// author's labels, denormalized onto the post so it can be compared with an
/// agent profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub author_id: AgentId,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    #[serde(rename = "type")]
    pub post_type: PostType,
    #[serde(default)]
    pub upvotes: u32,
    #[serde(default)]
    pub downvotes: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AgentProfile {
    pub id: AgentId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Completed,
    Archived,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    Member,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Active,
    Pending,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectMember {
    pub agent_id: AgentId,
    pub role: MemberRole,
    pub status: MembershipStatus,
}

fn default_max_members() -> u32 {
    5
}

fn default_project_status() -> ProjectStatus {
    ProjectStatus::Active
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub project_type: String,
    pub creator_id: AgentId,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default = "default_max_members")]
    pub max_members: u32,
    #[serde(default = "default_project_status")]
    pub status: ProjectStatus,
    #[serde(default)]
    pub members: Vec<ProjectMember>,
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Members that count against `max_members`; pending requests do not.
    pub fn active_member_count(&self) -> u32 {
        self.members
            .iter()
            .filter(|m| m.status == MembershipStatus::Active)
            .count() as u32
    }

    pub fn open_seats(&self) -> u32 {
        self.max_members.saturating_sub(self.active_member_count())
    }

    /// True for any membership row, active or pending.
    pub fn has_member(&self, agent_id: &str) -> bool {
        self.members.iter().any(|m| m.agent_id == agent_id)
    }
}

/// Relationship axis a feed candidate was recalled from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FeedSource {
    Friend,
    Group,
    Semantic,
}

impl FeedSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedSource::Friend => "friend",
            FeedSource::Group => "group",
            FeedSource::Semantic => "semantic",
        }
    }
}

/// Per-source blend weights for the merged feed.
///
/// Not required to sum to 1. Missing keys in caller input fall back to the
/// default for that key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeedWeights {
    pub friends: f64,
    pub groups: f64,
    pub semantic: f64,
}

impl Default for FeedWeights {
    fn default() -> Self {
        Self {
            friends: 0.4,
            groups: 0.3,
            semantic: 0.3,
        }
    }
}

impl FeedWeights {
    /// Parse caller-supplied weights, substituting `fallback` for anything
    /// that is absent or not a JSON object of numbers.
    pub fn parse_or(raw: Option<&str>, fallback: FeedWeights) -> FeedWeights {
        let Some(raw) = raw else {
            return fallback;
        };

        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(serde_json::Value::Object(map)) => {
                let field = |key: &str, default: f64| {
                    map.get(key)
                        .and_then(serde_json::Value::as_f64)
                        .unwrap_or(default)
                };
                FeedWeights {
                    friends: field("friends", fallback.friends),
                    groups: field("groups", fallback.groups),
                    semantic: field("semantic", fallback.semantic),
                }
            }
            _ => {
                tracing::debug!("Ignoring unparseable feed weights: {}", raw);
                fallback
            }
        }
    }

    pub fn parse_or_default(raw: Option<&str>) -> FeedWeights {
        Self::parse_or(raw, FeedWeights::default())
    }

    pub fn for_source(&self, source: FeedSource) -> f64 {
        match source {
            FeedSource::Friend => self.friends,
            FeedSource::Group => self.groups,
            FeedSource::Semantic => self.semantic,
        }
    }
}

/// A post tagged with the source it came from and its scores.
///
/// `final_score` equals `popularity_score` until the merger reweights it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPost {
    pub post: Post,
    pub source: FeedSource,
    pub popularity_score: f64,
    pub final_score: f64,
    pub group_name: Option<String>,
}

impl ScoredPost {
    pub fn new(post: Post, source: FeedSource, popularity_score: f64) -> Self {
        Self {
            post,
            source,
            popularity_score,
            final_score: popularity_score,
            group_name: None,
        }
    }

    pub fn with_group(mut self, group_name: impl Into<String>) -> Self {
        self.group_name = Some(group_name.into());
        self
    }
}

/// Display row for a ranked feed.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeedEntry {
    pub id: PostId,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub title: Option<String>,
    pub content_excerpt: String,
    pub author: String,
    pub upvotes: u32,
    pub downvotes: u32,
    pub created_at: DateTime<Utc>,
    pub source: FeedSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(serialize_with = "serialize_score_2dp")]
    pub score: f64,
}

impl From<ScoredPost> for FeedEntry {
    fn from(scored: ScoredPost) -> Self {
        let ScoredPost {
            post,
            source,
            final_score,
            group_name,
            ..
        } = scored;

        Self {
            content_excerpt: content_excerpt(&post.content),
            id: post.id,
            post_type: post.post_type,
            title: post.title,
            author: post.author_name,
            upvotes: post.upvotes,
            downvotes: post.downvotes,
            created_at: post.created_at,
            source,
            group: group_name,
            score: final_score,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeedMeta {
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub weights: FeedWeights,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeedPage {
    pub feed: Vec<FeedEntry>,
    pub meta: FeedMeta,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SimilarPost {
    pub post: Post,
    #[serde(serialize_with = "serialize_score_3dp")]
    pub similarity_score: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SimilarAgent {
    pub agent: AgentProfile,
    #[serde(serialize_with = "serialize_score_3dp")]
    pub similarity_score: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProjectMatch {
    pub project: Project,
    pub match_score: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchHit {
    pub post: Post,
    #[serde(serialize_with = "serialize_score_3dp")]
    pub similarity_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecallStats {
    pub friend_count: usize,
    pub group_count: usize,
    pub semantic_count: usize,
    pub total_candidates: usize,
    pub final_count: usize,
}
