//! Thread assembly and feed composition for Bord.
//!
//! [`thread::Threads`] builds depth-bounded reply trees and root listings over
//! any [`store::Storage`]. The Spin component below serves them over HTTP
//! from the key-value store; `src/bin/main.rs` serves the same routes natively
//! from memory.

#[cfg(target_arch = "wasm32")]
use spin_sdk::http::{IntoResponse, Request};
#[cfg(target_arch = "wasm32")]
use spin_sdk::http_component;
#[cfg(target_arch = "wasm32")]
use tracing::warn;

pub mod common;
pub mod config;
pub mod feed;
pub mod follow;
pub mod handlers;
pub mod likes;
pub mod models;
pub mod posts;
pub mod store;
pub mod thread;
pub mod users;

pub use crate::common::errors::{Error, Result};
pub use crate::config::Limits;
pub use crate::models::models::{FeedRequest, Post, PostNode, User, UserProfile, UserSummary};
pub use crate::store::{KvStore, MemoryStore, Storage, StorageMut};
pub use crate::thread::Threads;

// === Component entrypoint ===
#[cfg(target_arch = "wasm32")]
#[http_component]
fn handle(req: Request) -> anyhow::Result<impl IntoResponse> {
    let store = KvStore::open_default()?;

    if let Err(err) = crate::common::db::init_demo_data(&store) {
        warn!(error = %err, "demo data not initialized");
    }

    handlers::dispatch(&store, Limits::from_env(), req)
}
