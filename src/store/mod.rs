//! Storage port consumed by the thread engine, plus the write side used by
//! the collaborators that create posts, likes and follows.

use std::collections::HashSet;

use crate::common::errors::Result;
use crate::models::models::{Follow, Like, Post, User, UserSummary};

pub mod kv;
pub mod lists;
pub mod memory;

pub use kv::KvStore;
pub use memory::MemoryStore;

/// Keyed lookups and filtered scans over users, posts, likes and follows.
///
/// Ordered results follow the contract on each method, but callers that need
/// a total order re-sort with [`crate::thread::ordering`].
pub trait Storage {
    fn get_post(&self, post_id: &str) -> Result<Option<Post>>;

    fn get_user(&self, user_id: &str) -> Result<Option<User>>;

    fn get_user_summary(&self, user_id: &str, with_handle: bool) -> Result<Option<UserSummary>> {
        Ok(self.get_user(user_id)?.map(|u| u.summary(with_handle)))
    }

    fn list_users(&self) -> Result<Vec<User>>;

    /// Direct children, creation time ascending.
    fn list_children(&self, post_id: &str) -> Result<Vec<Post>>;

    /// Root posts, creation time descending. `None` means every author.
    fn list_root_posts(&self, authors: Option<&HashSet<String>>) -> Result<Vec<Post>>;

    /// Every post by one author, roots and replies, creation time descending.
    fn list_user_posts(&self, user_id: &str) -> Result<Vec<Post>>;

    fn count_likes(&self, post_id: &str) -> Result<u64>;

    /// Users who liked the post, in storage order.
    fn list_liking_users(&self, post_id: &str, with_handle: bool) -> Result<Vec<UserSummary>>;

    fn count_direct_children(&self, post_id: &str) -> Result<u64>;

    fn list_followees(&self, user_id: &str) -> Result<HashSet<String>>;

    fn list_followers(&self, user_id: &str) -> Result<HashSet<String>>;

    fn list_follows(&self) -> Result<Vec<Follow>>;
}

/// Mutations. Implementations take `&self` and synchronize internally.
pub trait StorageMut: Storage {
    fn insert_user(&self, user: &User) -> Result<()>;

    /// Fails with `NotFound` when the user does not exist.
    fn update_user(&self, user: &User) -> Result<()>;

    /// Removes the user, the likes they gave and their follows in both
    /// directions. Their posts are left to the caller.
    fn remove_user(&self, user_id: &str) -> Result<()>;

    fn insert_post(&self, post: &Post) -> Result<()>;

    fn update_post(&self, post: &Post) -> Result<()>;

    /// Removes one post and its likes. Children are left to the caller.
    fn remove_post(&self, post_id: &str) -> Result<()>;

    /// Returns false when the (user, post) pair already has a like.
    fn insert_like(&self, like: &Like) -> Result<bool>;

    fn remove_like(&self, user_id: &str, post_id: &str) -> Result<bool>;

    /// Returns false when the follow already exists.
    fn insert_follow(&self, follow: &Follow) -> Result<bool>;

    fn remove_follow(&self, follower_id: &str, followee_id: &str) -> Result<bool>;
}
