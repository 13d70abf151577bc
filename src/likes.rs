use spin_sdk::http::{Request, Response};
use tracing::info;

use crate::common::errors::{Error, Result};
use crate::common::helpers::{body_json, id_field, new_id, respond};
use crate::models::models::Like;
use crate::store::StorageMut;

/// Records a like. Liking the same post twice is a no-op that returns false.
pub fn like_post<S>(store: &S, user_id: &str, post_id: &str) -> Result<bool>
where
    S: StorageMut + ?Sized,
{
    if store.get_post(post_id)?.is_none() {
        return Err(Error::NotFound(format!("post {}", post_id)));
    }
    if store.get_user(user_id)?.is_none() {
        return Err(Error::NotFound(format!("user {}", user_id)));
    }

    let created = store.insert_like(&Like {
        id: new_id(),
        user_id: user_id.to_string(),
        post_id: post_id.to_string(),
    })?;
    if created {
        info!(user_id, post_id, "post liked");
    }
    Ok(created)
}

pub fn unlike_post<S>(store: &S, user_id: &str, post_id: &str) -> Result<bool>
where
    S: StorageMut + ?Sized,
{
    store.remove_like(user_id, post_id)
}

// === HTTP Handlers ===

fn like_target(req: &Request) -> Result<(String, String)> {
    let value = body_json(req)?;
    Ok((id_field(&value, "user_id")?, id_field(&value, "post_id")?))
}

pub fn handle_like<S>(store: &S, req: Request) -> anyhow::Result<Response>
where
    S: StorageMut + ?Sized,
{
    let result = like_target(&req)
        .and_then(|(user_id, post_id)| like_post(store, &user_id, &post_id))
        .map(|created| serde_json::json!({ "status": "liked", "created": created }));
    respond(200, result)
}

pub fn handle_unlike<S>(store: &S, req: Request) -> anyhow::Result<Response>
where
    S: StorageMut + ?Sized,
{
    let result = like_target(&req)
        .and_then(|(user_id, post_id)| unlike_post(store, &user_id, &post_id))
        .map(|removed| serde_json::json!({ "status": "unliked", "removed": removed }));
    respond(200, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::helpers::now;
    use crate::models::models::{Post, User};
    use crate::store::{MemoryStore, Storage};

    fn seed(store: &MemoryStore) -> (String, String) {
        let user = User {
            id: new_id(),
            name: "Bob".to_string(),
            username: "bob".to_string(),
            profile_image: None,
            created_at: now(),
        };
        let post = Post {
            id: new_id(),
            user_id: user.id.clone(),
            content: "hi".to_string(),
            parent_id: None,
            created_at: now(),
            updated_at: None,
        };
        store.insert_user(&user).unwrap();
        store.insert_post(&post).unwrap();
        (user.id, post.id)
    }

    #[test]
    fn test_duplicate_like_does_not_inflate_count() {
        let store = MemoryStore::new();
        let (bob, post) = seed(&store);

        assert!(like_post(&store, &bob, &post).unwrap());
        assert!(!like_post(&store, &bob, &post).unwrap());

        assert_eq!(store.count_likes(&post).unwrap(), 1);
        assert_eq!(store.list_liking_users(&post, false).unwrap().len(), 1);
    }

    #[test]
    fn test_unlike_removes_once() {
        let store = MemoryStore::new();
        let (bob, post) = seed(&store);
        like_post(&store, &bob, &post).unwrap();

        assert!(unlike_post(&store, &bob, &post).unwrap());
        assert!(!unlike_post(&store, &bob, &post).unwrap());
        assert_eq!(store.count_likes(&post).unwrap(), 0);
    }

    #[test]
    fn test_like_missing_post() {
        let store = MemoryStore::new();
        let (bob, _) = seed(&store);
        assert!(matches!(
            like_post(&store, &bob, &new_id()),
            Err(Error::NotFound(_))
        ));
    }
}
