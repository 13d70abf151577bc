use std::collections::HashSet;

use tracing::debug;

use crate::common::errors::Result;
use crate::models::models::PostNode;
use crate::store::Storage;
use crate::thread::builder::TreeBuilder;
use crate::thread::ordering::sort_roots;

/// Which root posts a listing starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootFilter {
    /// Every root post: the global timeline.
    All,
    /// Root posts written by one of these authors.
    Authors(HashSet<String>),
}

impl RootFilter {
    fn authors(&self) -> Option<&HashSet<String>> {
        match self {
            RootFilter::All => None,
            RootFilter::Authors(set) => Some(set),
        }
    }
}

/// The user plus everyone they follow. Existence of `user_id` is not checked.
pub fn inclusion_set<S>(store: &S, user_id: &str) -> Result<HashSet<String>>
where
    S: Storage + ?Sized,
{
    let mut authors = store.list_followees(user_id)?;
    authors.insert(user_id.to_string());
    Ok(authors)
}

/// Fetches the filtered root posts newest first and expands each one.
pub fn compose<S>(
    builder: &mut TreeBuilder<'_, S>,
    store: &S,
    filter: &RootFilter,
) -> Result<Vec<PostNode>>
where
    S: Storage + ?Sized,
{
    let mut roots = store.list_root_posts(filter.authors())?;
    sort_roots(&mut roots);
    debug!(roots = roots.len(), max_depth = builder.max_depth(), "composing root listing");

    roots
        .into_iter()
        .map(|root| builder.build(root, 0))
        .collect()
}
