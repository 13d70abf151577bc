//! Runs against a live server, then `cargo test --test http_api -- --ignored`.
//!
//! Native server over memory: `BORD_BIND_ADDR=127.0.0.1:3000 cargo run --bin main`.
//! Spin component over the key-value store: `spin build --up`, listening on
//! 127.0.0.1:3000 as well. Set `BORD_BASE_URL` to target another address.

use serde_json::json;
use std::time::Instant;

fn base_url() -> String {
    std::env::var("BORD_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string())
}

async fn create_user(client: &reqwest::Client, username: &str) -> String {
    let resp = client
        .post(&format!("{}/users", base_url()))
        .json(&json!({ "name": username, "username": username }))
        .send()
        .await
        .expect("Failed to create user");
    assert_eq!(resp.status(), 201);
    let user = resp.json::<serde_json::Value>().await.unwrap();
    user["id"].as_str().unwrap().to_string()
}

async fn create_post(
    client: &reqwest::Client,
    user_id: &str,
    content: &str,
    parent_id: Option<&str>,
) -> reqwest::Response {
    client
        .post(&format!("{}/posts", base_url()))
        .json(&json!({ "user_id": user_id, "content": content, "parent_id": parent_id }))
        .send()
        .await
        .expect("Failed to create post")
}

fn short_name(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().to_string()[0..8])
}

#[ignore]
#[tokio::test]
async fn test_thread_and_feed_flow() {
    let client = reqwest::Client::new();
    let u = create_user(&client, &short_name("u")).await;
    let v = create_user(&client, &short_name("v")).await;

    // v writes a root post with two replies
    let root = create_post(&client, &v, "root post", None).await;
    assert_eq!(root.status(), 201);
    let root_id = root.json::<serde_json::Value>().await.unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();
    for content in ["first reply", "second reply"] {
        let resp = create_post(&client, &u, content, Some(&root_id)).await;
        assert_eq!(resp.status(), 201);
    }

    let thread = client
        .get(&format!("{}/threads/{}?max_depth=1", base_url(), root_id))
        .send()
        .await
        .expect("Failed to get thread")
        .json::<serde_json::Value>()
        .await
        .unwrap();
    assert_eq!(thread["replyCount"], 2);
    assert_eq!(thread["replies"][0]["content"], "first reply");
    assert_eq!(thread["replies"][1]["content"], "second reply");

    // u sees v's post only while following
    let follow = client
        .post(&format!("{}/follow", base_url()))
        .json(&json!({ "user_id": u, "target_user_id": v }))
        .send()
        .await
        .expect("Failed to follow");
    assert_eq!(follow.status(), 200);

    let feed = client
        .get(&format!("{}/feed/{}", base_url(), u))
        .send()
        .await
        .unwrap()
        .json::<Vec<serde_json::Value>>()
        .await
        .unwrap();
    assert!(feed.iter().any(|node| node["id"] == root_id.as_str()));

    client
        .post(&format!("{}/unfollow", base_url()))
        .json(&json!({ "user_id": u, "target_user_id": v }))
        .send()
        .await
        .expect("Failed to unfollow");

    let feed = client
        .get(&format!("{}/feed/{}", base_url(), u))
        .send()
        .await
        .unwrap()
        .json::<Vec<serde_json::Value>>()
        .await
        .unwrap();
    assert!(feed.iter().all(|node| node["id"] != root_id.as_str()));
}

#[ignore]
#[tokio::test]
async fn test_reply_to_missing_parent_rejected() {
    let client = reqwest::Client::new();
    let u = create_user(&client, &short_name("orphan")).await;
    let missing = uuid::Uuid::new_v4().to_string();

    let resp = create_post(&client, &u, "reply into the void", Some(&missing)).await;
    assert_eq!(resp.status(), 422);
}

#[ignore]
#[tokio::test]
async fn test_missing_thread_is_404() {
    let client = reqwest::Client::new();
    let resp = client
        .get(&format!("{}/threads/{}", base_url(), uuid::Uuid::new_v4()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[ignore]
#[tokio::test]
async fn test_delete_user_cleans_up() {
    let client = reqwest::Client::new();
    let u = create_user(&client, &short_name("u")).await;
    let v = create_user(&client, &short_name("v")).await;

    let root = create_post(&client, &u, "root post", None).await;
    let root_id = root.json::<serde_json::Value>().await.unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();
    let reply = create_post(&client, &v, "reply from v", Some(&root_id)).await;
    assert_eq!(reply.status(), 201);

    for (path, body) in [
        ("likes", json!({ "user_id": v, "post_id": root_id })),
        ("follow", json!({ "user_id": v, "target_user_id": u })),
    ] {
        let resp = client
            .post(&format!("{}/{}", base_url(), path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let value = resp.json::<serde_json::Value>().await.unwrap();
        assert_eq!(value["created"], true);
    }

    let profile = client
        .get(&format!("{}/users/{}", base_url(), u))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();
    assert_eq!(profile["followers"][0]["id"], v.as_str());

    let resp = client
        .delete(&format!("{}/users/{}", base_url(), v))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let thread = client
        .get(&format!("{}/threads/{}", base_url(), root_id))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();
    assert_eq!(thread["replyCount"], 0);
    assert_eq!(thread["likeCount"], 0);

    let profile = client
        .get(&format!("{}/users/{}", base_url(), u))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();
    assert_eq!(profile["followers"], json!([]));
}

const WIDE_REPLIES: usize = 200;

#[ignore]
#[tokio::test(flavor = "multi_thread")]
async fn perf_wide_thread() {
    let client = reqwest::Client::new();
    let u = create_user(&client, &short_name("perf")).await;

    let root = create_post(&client, &u, "wide root", None).await;
    let root_id = root.json::<serde_json::Value>().await.unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let start = Instant::now();
    for i in 0..WIDE_REPLIES {
        let resp = create_post(&client, &u, &format!("reply {}", i), Some(&root_id)).await;
        assert_eq!(resp.status(), 201);
    }
    println!(
        "created {} replies in {:.2}s",
        WIDE_REPLIES,
        start.elapsed().as_secs_f64()
    );

    let start = Instant::now();
    let thread = client
        .get(&format!("{}/threads/{}", base_url(), root_id))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();
    println!("thread fetched in {:.2}ms", start.elapsed().as_secs_f64() * 1000.0);

    assert_eq!(thread["replyCount"], WIDE_REPLIES as u64);
}
