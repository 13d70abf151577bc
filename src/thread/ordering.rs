//! Sort rules shared by every tree level and by the timeline and feed.
//!
//! Both orders are total: equal timestamps fall back to the post id.

use std::cmp::Ordering;

use crate::models::models::Post;

/// Replies read chronologically: oldest first.
pub fn reply_order(a: &Post, b: &Post) -> Ordering {
    a.created_at
        .cmp(&b.created_at)
        .then_with(|| a.id.cmp(&b.id))
}

/// Root posts read newest first.
pub fn root_order(a: &Post, b: &Post) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| a.id.cmp(&b.id))
}

pub fn sort_replies(posts: &mut [Post]) {
    posts.sort_by(reply_order);
}

pub fn sort_roots(posts: &mut [Post]) {
    posts.sort_by(root_order);
}
