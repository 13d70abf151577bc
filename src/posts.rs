use std::sync::OnceLock;

use ammonia::Builder;
use html_escape::encode_double_quoted_attribute;
use regex::Regex;
use spin_sdk::http::{Request, Response};
use tracing::info;

use crate::common::errors::{Error, Result};
use crate::common::helpers::{body_json, id_field, new_id, now, respond};
use crate::common::query_params::path_id;
use crate::config::MAX_POST_LENGTH;
use crate::models::models::Post;
use crate::store::StorageMut;

fn url_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"https?://[^\s<]+").expect("Regex should compile"))
}

/// Strips unsafe markup and turns bare URLs into links.
fn filter_post_content(content: &str) -> String {
    let clean = Builder::default()
        .link_rel(Some("noopener noreferrer"))
        .clean(content)
        .to_string();

    url_regex()
        .replace_all(&clean, |caps: &regex::Captures| {
            let url = &caps[0];
            let escaped_url = encode_double_quoted_attribute(url);
            format!(r#"<a href="{}" target="_blank">{}</a>"#, escaped_url, url)
        })
        .to_string()
}

/// Validates raw content and returns its stored form. The length limit
/// holds for both, so expanded links cannot push a post past it.
fn prepare_content(content: &str) -> Result<String> {
    if content.trim().is_empty() || content.chars().count() > MAX_POST_LENGTH {
        return Err(Error::BadRequest("Invalid content".to_string()));
    }
    let filtered = filter_post_content(content);
    if filtered.chars().count() > MAX_POST_LENGTH {
        return Err(Error::BadRequest("Content too long once links are expanded".to_string()));
    }
    Ok(filtered)
}

/// Creates a root post, or a reply when `parent_id` is set. A reply to a
/// post that does not exist is rejected before anything is written.
pub fn create_post<S>(
    store: &S,
    user_id: &str,
    content: &str,
    parent_id: Option<&str>,
) -> Result<Post>
where
    S: StorageMut + ?Sized,
{
    let content = prepare_content(content)?;

    if let Some(parent_id) = parent_id {
        if store.get_post(parent_id)?.is_none() {
            return Err(Error::InvalidParent(parent_id.to_string()));
        }
    }
    if store.get_user(user_id)?.is_none() {
        return Err(Error::NotFound(format!("user {}", user_id)));
    }

    let post = Post {
        id: new_id(),
        user_id: user_id.to_string(),
        content,
        parent_id: parent_id.map(str::to_string),
        created_at: now(),
        updated_at: None,
    };
    store.insert_post(&post)?;

    info!(post_id = %post.id, user_id, reply = post.parent_id.is_some(), "post created");
    Ok(post)
}

pub fn edit_post<S>(store: &S, post_id: &str, content: &str) -> Result<Post>
where
    S: StorageMut + ?Sized,
{
    let filtered = prepare_content(content)?;

    let mut post = store
        .get_post(post_id)?
        .ok_or_else(|| Error::NotFound(format!("post {}", post_id)))?;

    // Skip the write when nothing changed
    if post.content == filtered {
        return Ok(post);
    }

    post.content = filtered;
    post.updated_at = Some(now());
    store.update_post(&post)?;
    Ok(post)
}

/// Deletes a post together with its whole reply subtree. Returns how many
/// posts were removed.
pub fn delete_post<S>(store: &S, post_id: &str) -> Result<usize>
where
    S: StorageMut + ?Sized,
{
    if store.get_post(post_id)?.is_none() {
        return Err(Error::NotFound(format!("post {}", post_id)));
    }

    // Collect the subtree first so children are removed before parents.
    let mut order = vec![post_id.to_string()];
    let mut cursor = 0;
    while cursor < order.len() {
        let children = store.list_children(&order[cursor])?;
        order.extend(children.into_iter().map(|c| c.id));
        cursor += 1;
    }

    for id in order.iter().rev() {
        store.remove_post(id)?;
    }

    info!(post_id, removed = order.len(), "post deleted");
    Ok(order.len())
}

// === HTTP Handlers ===

pub fn handle_create_post<S>(store: &S, req: Request) -> anyhow::Result<Response>
where
    S: StorageMut + ?Sized,
{
    let result = body_json(&req).and_then(|value| {
        let user_id = id_field(&value, "user_id")?;
        let content = value["content"].as_str().unwrap_or_default();
        let parent_id = match value.get("parent_id") {
            None | Some(serde_json::Value::Null) => None,
            Some(_) => Some(id_field(&value, "parent_id")?),
        };
        create_post(store, &user_id, content, parent_id.as_deref())
    });
    respond(201, result)
}

pub fn handle_edit_post<S>(store: &S, req: Request) -> anyhow::Result<Response>
where
    S: StorageMut + ?Sized,
{
    let result = path_id(req.path(), "/posts/").and_then(|post_id| {
        let value = body_json(&req)?;
        let content = value["content"].as_str().unwrap_or_default();
        edit_post(store, post_id, content)
    });
    respond(200, result)
}

pub fn handle_delete_post<S>(store: &S, req: Request) -> anyhow::Result<Response>
where
    S: StorageMut + ?Sized,
{
    let result = path_id(req.path(), "/posts/")
        .and_then(|post_id| delete_post(store, post_id))
        .map(|removed| serde_json::json!({ "removed": removed }));
    respond(200, result)
}
