use std::time::Duration;

// === Limits ===
pub const DEFAULT_MAX_DEPTH: usize = 50;
pub const MAX_POST_LENGTH: usize = 5000;
pub const MAX_NAME_LENGTH: usize = 50;

const DEFAULT_MAX_DEPTH_CEILING: usize = 50;
const DEFAULT_MAX_NODES: usize = 10_000;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 2_000;

// === KV layout ===
pub const USERS_LIST_KEY: &str = "users_list";
pub const ROOTS_KEY: &str = "roots";

pub fn user_key(user_id: &str) -> String {
    format!("user:{}", user_id)
}

pub fn post_key(post_id: &str) -> String {
    format!("post:{}", post_id)
}

pub fn replies_key(post_id: &str) -> String {
    format!("replies:{}", post_id)
}

pub fn likes_key(post_id: &str) -> String {
    format!("likes:{}", post_id)
}

pub fn followings_key(user_id: &str) -> String {
    format!("followings:{}", user_id)
}

pub fn followers_key(user_id: &str) -> String {
    format!("followers:{}", user_id)
}

pub fn user_posts_key(user_id: &str) -> String {
    format!("user_posts:{}", user_id)
}

pub fn user_likes_key(user_id: &str) -> String {
    format!("user_likes:{}", user_id)
}

// === Env ===
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

pub fn max_depth_ceiling() -> usize {
    env_or("BORD_MAX_DEPTH_CEILING", DEFAULT_MAX_DEPTH_CEILING)
}

pub fn max_nodes() -> usize {
    env_or("BORD_MAX_NODES", DEFAULT_MAX_NODES)
}

pub fn request_timeout() -> Duration {
    Duration::from_millis(env_or("BORD_REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT_MS))
}

pub fn bind_addr() -> String {
    std::env::var("BORD_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:80".to_string())
}

/// Per-request bounds on tree expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Requested depths above this are clamped down to it.
    pub max_depth_ceiling: usize,
    /// Total nodes a single request may materialize.
    pub max_nodes: usize,
    /// Wall-clock budget; `None` disables the deadline.
    pub timeout: Option<Duration>,
}

impl Limits {
    pub fn from_env() -> Self {
        Limits {
            max_depth_ceiling: max_depth_ceiling(),
            max_nodes: max_nodes(),
            timeout: Some(request_timeout()),
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_depth_ceiling: DEFAULT_MAX_DEPTH_CEILING,
            max_nodes: DEFAULT_MAX_NODES,
            timeout: Some(Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS)),
        }
    }
}
