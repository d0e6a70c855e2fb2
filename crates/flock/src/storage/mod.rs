//! Storage traits and implementations
//!
//! This module defines the storage abstraction for Friend records. The
//! trait-based design allows swapping between the SQLite backend and an
//! in-memory implementation for tests.

mod memory;
mod sqlite;
mod traits;

pub use memory::InMemoryFriendStore;
pub use sqlite::SqliteFriendStore;
pub use traits::FriendStore;
