//! Flock - friend-tracking logic for a small Twitter bot
//!
//! This crate provides platform-independent bot functionality including:
//! - Domain models (Friend, UserId)
//! - Twitter API clients (v1.1 user context, v2 app context)
//! - Storage trait abstractions over SQLite and in-memory backends
//! - Idempotent friend-list sync
//!
//! This crate has zero CLI dependencies; the `preen` binary wires it up.

pub mod config;
pub mod models;
pub mod storage;
pub mod sync;
pub mod twitter;

pub use config::Settings;
pub use models::{Friend, UserId};
pub use storage::{FriendStore, InMemoryFriendStore, SqliteFriendStore};
pub use sync::{SyncStats, sync_friends};
pub use twitter::{
    MalformedRecord, ResultType, SearchClient, UserClient, api::RawUser, normalize_user,
};
