use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::common::errors::{Error, Result};
use crate::config::Limits;
use crate::models::models::{Post, PostNode};
use crate::store::Storage;
use crate::thread::aggregate::attach;
use crate::thread::ordering::sort_replies;

/// Node and wall-clock allowance shared by everything one request builds.
#[derive(Debug)]
pub(crate) struct Budget {
    remaining: usize,
    started: Instant,
    timeout: Option<Duration>,
    exhausted: bool,
}

impl Budget {
    pub(crate) fn new(limits: &Limits) -> Self {
        Budget {
            remaining: limits.max_nodes,
            started: Instant::now(),
            timeout: limits.timeout,
            exhausted: false,
        }
    }

    fn check_deadline(&self) -> Result<()> {
        match self.timeout {
            Some(timeout) if self.started.elapsed() >= timeout => {
                Err(Error::DeadlineExceeded(timeout.as_millis()))
            }
            _ => Ok(()),
        }
    }

    fn charge(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    /// True once no node may be expanded below the current one.
    fn is_spent(&mut self) -> bool {
        if self.remaining == 0 && !self.exhausted {
            self.exhausted = true;
            warn!("node budget exhausted, remaining replies left unexpanded");
        }
        self.remaining == 0
    }
}

/// Builds depth-bounded reply trees.
///
/// One builder serves one request: the node budget and deadline are spent
/// across every tree it builds.
pub struct TreeBuilder<'s, S: ?Sized> {
    store: &'s S,
    max_depth: usize,
    with_handle: bool,
    budget: Budget,
}

impl<'s, S> TreeBuilder<'s, S>
where
    S: Storage + ?Sized,
{
    /// `max_depth` is clamped to the configured ceiling.
    pub fn new(store: &'s S, limits: &Limits, max_depth: usize, with_handle: bool) -> Self {
        if max_depth > limits.max_depth_ceiling {
            debug!(
                requested = max_depth,
                ceiling = limits.max_depth_ceiling,
                "clamping max depth"
            );
        }
        TreeBuilder {
            store,
            max_depth: max_depth.min(limits.max_depth_ceiling),
            with_handle,
            budget: Budget::new(limits),
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Expands `post` sitting at `depth`. A node at the depth bound is a leaf
    /// whatever storage holds below it.
    pub fn build(&mut self, post: Post, depth: usize) -> Result<PostNode> {
        self.budget.check_deadline()?;
        self.budget.charge();

        let aggregates = attach(self.store, &post, self.with_handle)?;
        let author = self.store.get_user_summary(&post.user_id, true)?;

        let mut node = PostNode {
            post,
            author,
            like_count: aggregates.like_count,
            reply_count: aggregates.reply_count,
            liking_users: aggregates.liking_users,
            replies: Vec::new(),
            truncated: false,
        };

        if node.reply_count == 0 {
            return Ok(node);
        }
        if depth >= self.max_depth {
            node.truncated = true;
            return Ok(node);
        }

        let mut children = self.store.list_children(&node.post.id)?;
        sort_replies(&mut children);

        for child in children {
            if self.budget.is_spent() {
                node.truncated = true;
                break;
            }
            node.replies.push(self.build(child, depth + 1)?);
        }

        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::models::User;
    use crate::store::{MemoryStore, StorageMut};
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};

    fn user(store: &MemoryStore, id: &str) {
        store
            .insert_user(&User {
                id: id.to_string(),
                name: format!("{} name", id),
                username: id.to_string(),
                profile_image: None,
                created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            })
            .unwrap();
    }

    fn post(store: &MemoryStore, id: &str, parent: Option<&str>, minute: i64) -> Post {
        let post = Post {
            id: id.to_string(),
            user_id: "alice".to_string(),
            content: id.to_string(),
            parent_id: parent.map(str::to_string),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                + ChronoDuration::minutes(minute),
            updated_at: None,
        };
        store.insert_post(&post).unwrap();
        post
    }

    /// root -> d1 -> d2 -> d3 -> d4 -> d5
    fn chain(store: &MemoryStore) -> Post {
        user(store, "alice");
        let root = post(store, "root", None, 0);
        let mut parent = "root".to_string();
        for depth in 1..=5 {
            let id = format!("d{}", depth);
            post(store, &id, Some(&parent), depth);
            parent = id;
        }
        root
    }

    fn depth_of(node: &PostNode) -> usize {
        node.replies.iter().map(|r| 1 + depth_of(r)).max().unwrap_or(0)
    }

    #[test]
    fn test_max_depth_zero_is_leaf_with_true_count() {
        let store = MemoryStore::new();
        user(&store, "alice");
        let root = post(&store, "root", None, 0);
        post(&store, "a", Some("root"), 1);
        post(&store, "b", Some("root"), 2);

        let node = TreeBuilder::new(&store, &Limits::default(), 0, false)
            .build(root, 0)
            .unwrap();

        assert!(node.replies.is_empty());
        assert_eq!(node.reply_count, 2);
        assert!(node.truncated);
    }

    #[test]
    fn test_depth_bound_keeps_counts_on_leaves() {
        let store = MemoryStore::new();
        let root = chain(&store);

        let node = TreeBuilder::new(&store, &Limits::default(), 2, false)
            .build(root, 0)
            .unwrap();

        assert_eq!(depth_of(&node), 2);
        let leaf = &node.replies[0].replies[0];
        assert_eq!(leaf.post.id, "d2");
        assert!(leaf.replies.is_empty());
        assert_eq!(leaf.reply_count, 1);
        assert!(leaf.truncated);
        assert!(!node.truncated);
    }

    #[test]
    fn test_full_expansion_has_empty_replies_at_bottom() {
        let store = MemoryStore::new();
        let root = chain(&store);

        let node = TreeBuilder::new(&store, &Limits::default(), 50, false)
            .build(root, 0)
            .unwrap();

        assert_eq!(depth_of(&node), 5);
        let mut cursor = &node;
        while let Some(next) = cursor.replies.first() {
            cursor = next;
        }
        assert_eq!(cursor.post.id, "d5");
        assert_eq!(cursor.reply_count, 0);
        assert!(cursor.replies.is_empty());
        assert!(!cursor.truncated);
    }

    #[test]
    fn test_requested_depth_is_clamped_to_ceiling() {
        let store = MemoryStore::new();
        let root = chain(&store);
        let limits = Limits {
            max_depth_ceiling: 1,
            ..Limits::default()
        };

        let mut builder = TreeBuilder::new(&store, &limits, 50, false);
        assert_eq!(builder.max_depth(), 1);
        let node = builder.build(root, 0).unwrap();
        assert_eq!(depth_of(&node), 1);
        assert!(node.replies[0].truncated);
    }

    #[test]
    fn test_node_budget_truncates_wide_fanout() {
        let store = MemoryStore::new();
        user(&store, "alice");
        let root = post(&store, "root", None, 0);
        for i in 0..10 {
            post(&store, &format!("r{}", i), Some("root"), i + 1);
        }
        let limits = Limits {
            max_nodes: 4,
            ..Limits::default()
        };

        let node = TreeBuilder::new(&store, &limits, 50, false)
            .build(root, 0)
            .unwrap();

        assert_eq!(node.replies.len(), 3);
        assert_eq!(node.reply_count, 10);
        assert!(node.truncated);
        let ids: Vec<&str> = node.replies.iter().map(|r| r.post.id.as_str()).collect();
        assert_eq!(ids, vec!["r0", "r1", "r2"]);
    }

    #[test]
    fn test_expired_deadline_aborts() {
        let store = MemoryStore::new();
        let root = chain(&store);
        let limits = Limits {
            timeout: Some(Duration::ZERO),
            ..Limits::default()
        };

        let err = TreeBuilder::new(&store, &limits, 50, false)
            .build(root, 0)
            .unwrap_err();
        assert!(matches!(err, Error::DeadlineExceeded(0)));
    }
}
