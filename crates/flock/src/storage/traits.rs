//! Storage trait definitions

use crate::models::{Friend, UserId};
use anyhow::Result;

/// Durable cache of Friend records
///
/// Implementations must preserve `date_added` across upserts: it is a
/// store-side default applied only at the first insert of a `user_id`,
/// and it is the retention clock for `removal_candidates`.
pub trait FriendStore: Send + Sync {
    /// Insert or update a batch of friends in a single transaction.
    ///
    /// On `user_id` conflict every mutable field is overwritten;
    /// `date_added` keeps its first-insert value. A record carrying an
    /// explicit `date_added` has it honored at first insert only.
    fn upsert_friends(&self, friends: &[Friend]) -> Result<()>;

    /// Update only the `following`/`friends` columns for one row.
    ///
    /// Returns whether a row was touched; an unknown `user_id` is a
    /// silent no-op, not an error.
    fn update_relationship(&self, user_id: &UserId, following: bool, follows_back: bool)
    -> Result<bool>;

    /// Friends eligible for removal: not flagged `dont_remove` and tracked
    /// for at least `num_days` days (boundary inclusive).
    fn removal_candidates(&self, num_days: u32) -> Result<Vec<Friend>>;

    /// Every stored friend, in no particular order
    fn all_friends(&self) -> Result<Vec<Friend>>;

    /// Get a friend by ID
    fn get_friend(&self, user_id: &UserId) -> Result<Option<Friend>>;

    /// Delete a friend row; returns whether it existed
    fn delete_friend(&self, user_id: &UserId) -> Result<bool>;

    /// Count stored friends
    fn count_friends(&self) -> Result<usize>;
}
