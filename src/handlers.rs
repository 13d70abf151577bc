use spin_sdk::http::{Request, Response};

use crate::common::helpers::{not_found, respond};
use crate::common::query_params::{get_max_depth, parse_query_params, path_id};
use crate::config::Limits;
use crate::follow::{get_followings_list, get_follows_list, handle_follow, handle_unfollow};
use crate::likes::{handle_like, handle_unlike};
use crate::models::models::FeedRequest;
use crate::posts::{handle_create_post, handle_delete_post, handle_edit_post};
use crate::store::{Storage, StorageMut};
use crate::thread::Threads;
use crate::users::{
    get_user_details, get_users_list, handle_create_user, handle_delete_user, handle_update_user,
};

pub fn get_thread<S>(store: &S, limits: Limits, req: &Request) -> anyhow::Result<Response>
where
    S: Storage + ?Sized,
{
    let params = parse_query_params(&req.uri());
    let result = path_id(req.path(), "/threads/").and_then(|post_id| {
        let max_depth = get_max_depth(&params)?;
        Threads::new(store, limits).get_thread(post_id, max_depth)
    });
    respond(200, result)
}

pub fn get_timeline<S>(store: &S, limits: Limits, req: &Request) -> anyhow::Result<Response>
where
    S: Storage + ?Sized,
{
    let params = parse_query_params(&req.uri());
    let result = get_max_depth(&params)
        .and_then(|max_depth| Threads::new(store, limits).get_timeline(max_depth));
    respond(200, result)
}

pub fn get_feed<S>(store: &S, limits: Limits, req: &Request) -> anyhow::Result<Response>
where
    S: Storage + ?Sized,
{
    let params = parse_query_params(&req.uri());
    let result = path_id(req.path(), "/feed/").and_then(|user_id| {
        let request = FeedRequest::new(user_id).with_max_depth(get_max_depth(&params)?);
        Threads::new(store, limits).get_feed(&request)
    });
    respond(200, result)
}

/// Routes one request against `store`. Shared by the Spin component and the
/// native server.
pub fn dispatch<S>(store: &S, limits: Limits, req: Request) -> anyhow::Result<Response>
where
    S: StorageMut + ?Sized,
{
    let path = req.path().to_string();
    let method = req.method().to_string();

    match (method.as_str(), path.as_str()) {
        ("GET", "/timeline") => get_timeline(store, limits, &req),
        ("GET", p) if p.starts_with("/threads/") => get_thread(store, limits, &req),
        ("GET", p) if p.starts_with("/feed/") => get_feed(store, limits, &req),
        ("GET", "/users") => get_users_list(store),
        ("POST", "/users") => handle_create_user(store, req),
        ("GET", p) if p.starts_with("/users/") => get_user_details(store, p),
        ("PUT", p) if p.starts_with("/users/") => handle_update_user(store, req),
        ("DELETE", p) if p.starts_with("/users/") => handle_delete_user(store, req),
        ("POST", "/posts") => handle_create_post(store, req),
        ("PUT", p) if p.starts_with("/posts/") => handle_edit_post(store, req),
        ("DELETE", p) if p.starts_with("/posts/") => handle_delete_post(store, req),
        ("POST", "/likes") => handle_like(store, req),
        ("DELETE", "/likes") => handle_unlike(store, req),
        ("POST", "/follow") => handle_follow(store, req),
        ("POST", "/unfollow") => handle_unfollow(store, req),
        ("GET", "/follows") => get_follows_list(store),
        ("GET", p) if p.starts_with("/followings/") => get_followings_list(store, p),
        _ => not_found(),
    }
}
