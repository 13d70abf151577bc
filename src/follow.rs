use spin_sdk::http::{Request, Response};
use tracing::info;

use crate::common::errors::{Error, Result};
use crate::common::helpers::{body_json, id_field, new_id, respond};
use crate::common::query_params::path_id;
use crate::models::models::Follow;
use crate::store::{Storage, StorageMut};

pub fn follow_user<S>(store: &S, follower_id: &str, followee_id: &str) -> Result<bool>
where
    S: StorageMut + ?Sized,
{
    if follower_id == followee_id {
        return Err(Error::BadRequest("Invalid target user".to_string()));
    }
    if store.get_user(followee_id)?.is_none() {
        return Err(Error::NotFound(format!("user {}", followee_id)));
    }

    let created = store.insert_follow(&Follow {
        id: new_id(),
        follower_id: follower_id.to_string(),
        followee_id: followee_id.to_string(),
    })?;
    if created {
        info!(follower_id, followee_id, "user followed");
    }
    Ok(created)
}

pub fn unfollow_user<S>(store: &S, follower_id: &str, followee_id: &str) -> Result<bool>
where
    S: StorageMut + ?Sized,
{
    store.remove_follow(follower_id, followee_id)
}

/// Followee ids, sorted for a stable response.
pub fn get_followings<S>(store: &S, user_id: &str) -> Result<Vec<String>>
where
    S: Storage + ?Sized,
{
    let mut followings: Vec<String> = store.list_followees(user_id)?.into_iter().collect();
    followings.sort();
    Ok(followings)
}

/// Every follow edge, ordered by follower then followee.
pub fn get_follows<S>(store: &S) -> Result<Vec<Follow>>
where
    S: Storage + ?Sized,
{
    let mut follows = store.list_follows()?;
    follows.sort_by(|a, b| {
        a.follower_id
            .cmp(&b.follower_id)
            .then_with(|| a.followee_id.cmp(&b.followee_id))
    });
    Ok(follows)
}

// === HTTP Handlers ===

fn follow_target(req: &Request) -> Result<(String, String)> {
    let value = body_json(req)?;
    Ok((id_field(&value, "user_id")?, id_field(&value, "target_user_id")?))
}

pub fn handle_follow<S>(store: &S, req: Request) -> anyhow::Result<Response>
where
    S: StorageMut + ?Sized,
{
    let result = follow_target(&req)
        .and_then(|(user_id, target)| follow_user(store, &user_id, &target))
        .map(|created| serde_json::json!({ "status": "followed", "created": created }));
    respond(200, result)
}

pub fn handle_unfollow<S>(store: &S, req: Request) -> anyhow::Result<Response>
where
    S: StorageMut + ?Sized,
{
    let result = follow_target(&req)
        .and_then(|(user_id, target)| unfollow_user(store, &user_id, &target))
        .map(|removed| serde_json::json!({ "status": "unfollowed", "removed": removed }));
    respond(200, result)
}

pub fn get_followings_list<S>(store: &S, path: &str) -> anyhow::Result<Response>
where
    S: Storage + ?Sized,
{
    let result = path_id(path, "/followings/").and_then(|user_id| get_followings(store, user_id));
    respond(200, result)
}

pub fn get_follows_list<S>(store: &S) -> anyhow::Result<Response>
where
    S: Storage + ?Sized,
{
    respond(200, get_follows(store))
}
