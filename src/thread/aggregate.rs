use crate::common::errors::Result;
use crate::models::models::{Post, UserSummary};
use crate::store::Storage;

/// Per-node metadata, independent of how deep the tree is expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregates {
    pub like_count: u64,
    pub reply_count: u64,
    pub liking_users: Vec<UserSummary>,
}

/// Reads like and reply counts plus the liking users of `post`.
///
/// `with_handle` selects the feed-context summaries, which carry the account
/// handle next to id and name.
pub fn attach<S>(store: &S, post: &Post, with_handle: bool) -> Result<Aggregates>
where
    S: Storage + ?Sized,
{
    Ok(Aggregates {
        like_count: store.count_likes(&post.id)?,
        reply_count: store.count_direct_children(&post.id)?,
        liking_users: store.list_liking_users(&post.id, with_handle)?,
    })
}
