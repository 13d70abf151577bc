//! Thread assembly: reply trees, per-node aggregates and root listings.

pub mod aggregate;
pub mod builder;
pub mod ordering;

use tracing::debug;

use crate::common::errors::{Error, Result};
use crate::config::Limits;
use crate::feed::{self, RootFilter};
use crate::models::models::{FeedRequest, Post, PostNode};
use crate::store::Storage;
use self::builder::TreeBuilder;

/// Read-only entry point over a storage backend.
///
/// Every call is independent: limits apply per call and nothing is cached.
pub struct Threads<'s, S: ?Sized> {
    store: &'s S,
    limits: Limits,
}

impl<'s, S> Threads<'s, S>
where
    S: Storage + ?Sized,
{
    pub fn new(store: &'s S, limits: Limits) -> Self {
        Threads { store, limits }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Expands an already fetched post that sits at `depth`.
    pub fn build_tree(&self, post: Post, depth: usize, max_depth: usize) -> Result<PostNode> {
        TreeBuilder::new(self.store, &self.limits, max_depth, false).build(post, depth)
    }

    pub fn get_thread(&self, post_id: &str, max_depth: usize) -> Result<PostNode> {
        let post = self
            .store
            .get_post(post_id)?
            .ok_or_else(|| Error::NotFound(format!("post {}", post_id)))?;
        debug!(post_id, max_depth, "building thread");
        self.build_tree(post, 0, max_depth)
    }

    pub fn get_timeline(&self, max_depth: usize) -> Result<Vec<PostNode>> {
        let mut builder = TreeBuilder::new(self.store, &self.limits, max_depth, false);
        feed::compose(&mut builder, self.store, &RootFilter::All)
    }

    /// Root posts by the user and their followees, newest first.
    pub fn compose_feed(&self, user_id: &str, max_depth: usize) -> Result<Vec<PostNode>> {
        let authors = feed::inclusion_set(self.store, user_id)?;
        debug!(user_id, authors = authors.len(), "building feed");

        let mut builder = TreeBuilder::new(self.store, &self.limits, max_depth, true);
        feed::compose(&mut builder, self.store, &RootFilter::Authors(authors))
    }

    pub fn get_feed(&self, request: &FeedRequest) -> Result<Vec<PostNode>> {
        self.compose_feed(&request.user_id, request.max_depth)
    }
}
