use std::collections::HashSet;

use ammonia::Builder;
use spin_sdk::http::{Request, Response};
use tracing::info;

use crate::common::errors::{Error, Result};
use crate::common::helpers::{body_json, new_id, now, respond};
use crate::common::query_params::path_id;
use crate::config::MAX_NAME_LENGTH;
use crate::models::models::{User, UserProfile, UserSummary};
use crate::posts::delete_post;
use crate::store::{Storage, StorageMut};

fn sanitize_text(text: &str) -> String {
    // Plain text only: every tag is stripped
    Builder::default()
        .tags(HashSet::new())
        .clean(text)
        .to_string()
}

fn clean_field(value: &str, field: &str) -> Result<String> {
    let value = sanitize_text(value.trim());
    if value.is_empty() || value.chars().count() > MAX_NAME_LENGTH {
        return Err(Error::BadRequest(format!(
            "{} must be 1-{} characters",
            field, MAX_NAME_LENGTH
        )));
    }
    Ok(value)
}

pub fn create_user<S>(
    store: &S,
    name: &str,
    username: &str,
    profile_image: Option<&str>,
) -> Result<User>
where
    S: StorageMut + ?Sized,
{
    let user = User {
        id: new_id(),
        name: clean_field(name, "name")?,
        username: clean_field(username, "username")?,
        profile_image: profile_image.map(str::to_string),
        created_at: now(),
    };
    store.insert_user(&user)?;

    info!(user_id = %user.id, username = %user.username, "user created");
    Ok(user)
}

pub fn get_user<S>(store: &S, user_id: &str) -> Result<User>
where
    S: Storage + ?Sized,
{
    store
        .get_user(user_id)?
        .ok_or_else(|| Error::NotFound(format!("user {}", user_id)))
}

/// Every user, oldest account first.
pub fn list_users<S>(store: &S) -> Result<Vec<User>>
where
    S: Storage + ?Sized,
{
    let mut users = store.list_users()?;
    users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    Ok(users)
}

/// Applies the given fields; `None` leaves a field as it is.
pub fn update_user<S>(
    store: &S,
    user_id: &str,
    name: Option<&str>,
    username: Option<&str>,
    profile_image: Option<&str>,
) -> Result<User>
where
    S: StorageMut + ?Sized,
{
    let mut user = get_user(store, user_id)?;
    if let Some(name) = name {
        user.name = clean_field(name, "name")?;
    }
    if let Some(username) = username {
        user.username = clean_field(username, "username")?;
    }
    if let Some(profile_image) = profile_image {
        user.profile_image = Some(profile_image.to_string());
    }
    store.update_user(&user)?;

    info!(user_id, "user updated");
    Ok(user)
}

/// Deletes a user with everything they wrote, liked or followed. Each of
/// their posts goes with its reply subtree. Returns how many posts were
/// removed.
pub fn delete_user<S>(store: &S, user_id: &str) -> Result<usize>
where
    S: StorageMut + ?Sized,
{
    get_user(store, user_id)?;

    let mut removed = 0;
    for post in store.list_user_posts(user_id)? {
        // Already gone when it sat under another of their posts
        if store.get_post(&post.id)?.is_some() {
            removed += delete_post(store, &post.id)?;
        }
    }
    store.remove_user(user_id)?;

    info!(user_id, posts = removed, "user deleted");
    Ok(removed)
}

fn summaries<S>(store: &S, ids: HashSet<String>) -> Result<Vec<UserSummary>>
where
    S: Storage + ?Sized,
{
    let mut users = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(summary) = store.get_user_summary(&id, true)? {
            users.push(summary);
        }
    }
    users.sort_by(|a, b| a.username.cmp(&b.username).then_with(|| a.id.cmp(&b.id)));
    Ok(users)
}

pub fn get_profile<S>(store: &S, user_id: &str) -> Result<UserProfile>
where
    S: Storage + ?Sized,
{
    let user = get_user(store, user_id)?;
    Ok(UserProfile {
        followers: summaries(store, store.list_followers(user_id)?)?,
        following: summaries(store, store.list_followees(user_id)?)?,
        posts: store.list_user_posts(user_id)?,
        user,
    })
}

// === HTTP Handlers ===

pub fn handle_create_user<S>(store: &S, req: Request) -> anyhow::Result<Response>
where
    S: StorageMut + ?Sized,
{
    let result = body_json(&req).and_then(|value| {
        create_user(
            store,
            value["name"].as_str().unwrap_or_default(),
            value["username"].as_str().unwrap_or_default(),
            value["profile_image"].as_str(),
        )
    });
    respond(201, result)
}

pub fn get_users_list<S>(store: &S) -> anyhow::Result<Response>
where
    S: Storage + ?Sized,
{
    respond(200, list_users(store))
}

pub fn get_user_details<S>(store: &S, path: &str) -> anyhow::Result<Response>
where
    S: Storage + ?Sized,
{
    let result = path_id(path, "/users/").and_then(|user_id| get_profile(store, user_id));
    respond(200, result)
}

pub fn handle_update_user<S>(store: &S, req: Request) -> anyhow::Result<Response>
where
    S: StorageMut + ?Sized,
{
    let result = path_id(req.path(), "/users/").and_then(|user_id| {
        let value = body_json(&req)?;
        update_user(
            store,
            user_id,
            value["name"].as_str(),
            value["username"].as_str(),
            value["profile_image"].as_str(),
        )
    });
    respond(200, result)
}

pub fn handle_delete_user<S>(store: &S, req: Request) -> anyhow::Result<Response>
where
    S: StorageMut + ?Sized,
{
    let result = path_id(req.path(), "/users/")
        .and_then(|user_id| delete_user(store, user_id))
        .map(|removed| serde_json::json!({ "status": "deleted", "postsRemoved": removed }));
    respond(200, result)
}
