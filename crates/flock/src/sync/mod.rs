//! Friend-list sync
//!
//! Provides the idempotent pull-transform-upsert loop that can be safely
//! re-run after any failure.

mod friends;

pub use friends::{SyncStats, sync_friends};
