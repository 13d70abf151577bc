use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_MAX_DEPTH;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Summary as embedded in nodes. The handle is only carried in feed context.
    pub fn summary(&self, with_handle: bool) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            username: with_handle.then(|| self.username.clone()),
        }
    }
}

/// A user with their follow graph and their posts, newest first.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub followers: Vec<UserSummary>,
    pub following: Vec<UserSummary>,
    pub posts: Vec<Post>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: String,
    pub user_id: String,
    pub post_id: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Follow {
    pub id: String,
    pub follower_id: String,
    pub followee_id: String,
}

/// A post with its aggregates and its depth-bounded replies.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostNode {
    #[serde(flatten)]
    pub post: Post,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<UserSummary>,
    pub like_count: u64,
    pub reply_count: u64,
    pub liking_users: Vec<UserSummary>,
    pub replies: Vec<PostNode>,
    /// Set when stored replies exist that were not expanded.
    pub truncated: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeedRequest {
    pub user_id: String,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl FeedRequest {
    pub fn new(user_id: impl Into<String>) -> Self {
        FeedRequest {
            user_id: user_id.into(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}
