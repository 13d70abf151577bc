//! List edits behind the key-value layout. Each function works on the
//! decoded value of one key and reports whether the caller has to write it
//! back.

use crate::models::models::{Follow, Like};

/// Puts `id` at the front. Lists written this way read newest first.
pub fn prepend_id(ids: &mut Vec<String>, id: &str) -> bool {
    if ids.iter().any(|existing| existing == id) {
        return false;
    }
    ids.insert(0, id.to_string());
    true
}

/// Appends `id` unless it is already present.
pub fn push_id(ids: &mut Vec<String>, id: &str) -> bool {
    if ids.iter().any(|existing| existing == id) {
        return false;
    }
    ids.push(id.to_string());
    true
}

pub fn remove_id(ids: &mut Vec<String>, id: &str) -> bool {
    let before = ids.len();
    ids.retain(|existing| existing != id);
    ids.len() != before
}

/// At most one like per user on a post's list.
pub fn insert_like(likes: &mut Vec<Like>, like: &Like) -> bool {
    if likes.iter().any(|l| l.user_id == like.user_id) {
        return false;
    }
    likes.push(like.clone());
    true
}

pub fn remove_like(likes: &mut Vec<Like>, user_id: &str) -> bool {
    let before = likes.len();
    likes.retain(|l| l.user_id != user_id);
    likes.len() != before
}

/// At most one follow per followee on a follower's list.
pub fn insert_follow(follows: &mut Vec<Follow>, follow: &Follow) -> bool {
    if follows.iter().any(|f| f.followee_id == follow.followee_id) {
        return false;
    }
    follows.push(follow.clone());
    true
}

pub fn remove_follow(follows: &mut Vec<Follow>, followee_id: &str) -> bool {
    let before = follows.len();
    follows.retain(|f| f.followee_id != followee_id);
    follows.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn like(user_id: &str) -> Like {
        Like {
            id: format!("like-{}", user_id),
            user_id: user_id.to_string(),
            post_id: "p".to_string(),
        }
    }

    fn follow(followee_id: &str) -> Follow {
        Follow {
            id: format!("follow-{}", followee_id),
            follower_id: "u".to_string(),
            followee_id: followee_id.to_string(),
        }
    }

    #[test]
    fn test_prepend_keeps_newest_first() {
        let mut roots = Vec::new();
        assert!(prepend_id(&mut roots, "old"));
        assert!(prepend_id(&mut roots, "new"));
        assert!(!prepend_id(&mut roots, "old"));
        assert_eq!(roots, ids(&["new", "old"]));
    }

    #[test]
    fn test_push_keeps_insertion_order() {
        let mut replies = ids(&["a"]);
        assert!(push_id(&mut replies, "b"));
        assert!(!push_id(&mut replies, "a"));
        assert_eq!(replies, ids(&["a", "b"]));
    }

    #[test]
    fn test_remove_child_from_parent_list() {
        let mut replies = ids(&["a", "b", "c"]);
        assert!(remove_id(&mut replies, "b"));
        assert!(!remove_id(&mut replies, "b"));
        assert_eq!(replies, ids(&["a", "c"]));
    }

    #[test]
    fn test_like_once_per_user() {
        let mut likes = Vec::new();
        assert!(insert_like(&mut likes, &like("bob")));
        assert!(!insert_like(&mut likes, &like("bob")));
        assert!(insert_like(&mut likes, &like("ann")));
        assert_eq!(likes.len(), 2);

        assert!(remove_like(&mut likes, "bob"));
        assert!(!remove_like(&mut likes, "bob"));
        assert_eq!(likes, vec![like("ann")]);
    }

    #[test]
    fn test_follow_once_per_followee() {
        let mut follows = Vec::new();
        assert!(insert_follow(&mut follows, &follow("v")));
        assert!(!insert_follow(&mut follows, &follow("v")));
        assert!(remove_follow(&mut follows, "v"));
        assert!(!remove_follow(&mut follows, "v"));
        assert!(follows.is_empty());
    }
}
