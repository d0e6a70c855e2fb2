//! In-memory storage implementation
//!
//! Mirrors the SQLite store's semantics exactly, including `date_added`
//! preservation, so the sync driver can be tested without a database file.

use anyhow::Result;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

use super::traits::FriendStore;
use crate::models::{Friend, UserId};

/// In-memory implementation of FriendStore
pub struct InMemoryFriendStore {
    friends: RwLock<HashMap<i64, Friend>>,
}

impl InMemoryFriendStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self {
            friends: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryFriendStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FriendStore for InMemoryFriendStore {
    fn upsert_friends(&self, friends: &[Friend]) -> Result<()> {
        let mut map = self.friends.write().unwrap();

        for friend in friends {
            let date_added = match map.get(&friend.user_id.as_i64()) {
                // Existing row keeps its first-insert timestamp
                Some(existing) => existing.date_added,
                None => Some(friend.date_added.unwrap_or_else(Utc::now)),
            };

            map.insert(
                friend.user_id.as_i64(),
                Friend {
                    date_added,
                    ..friend.clone()
                },
            );
        }

        Ok(())
    }

    fn update_relationship(
        &self,
        user_id: &UserId,
        following: bool,
        follows_back: bool,
    ) -> Result<bool> {
        let mut map = self.friends.write().unwrap();

        match map.get_mut(&user_id.as_i64()) {
            Some(friend) => {
                friend.following = following;
                friend.friends = Some(follows_back);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn removal_candidates(&self, num_days: u32) -> Result<Vec<Friend>> {
        let map = self.friends.read().unwrap();
        let cutoff = Utc::now() - Duration::days(num_days as i64);

        Ok(map
            .values()
            .filter(|f| !f.dont_remove.unwrap_or(false))
            .filter(|f| f.date_added.is_some_and(|added| added <= cutoff))
            .cloned()
            .collect())
    }

    fn all_friends(&self) -> Result<Vec<Friend>> {
        let map = self.friends.read().unwrap();
        Ok(map.values().cloned().collect())
    }

    fn get_friend(&self, user_id: &UserId) -> Result<Option<Friend>> {
        let map = self.friends.read().unwrap();
        Ok(map.get(&user_id.as_i64()).cloned())
    }

    fn delete_friend(&self, user_id: &UserId) -> Result<bool> {
        let mut map = self.friends.write().unwrap();
        Ok(map.remove(&user_id.as_i64()).is_some())
    }

    fn count_friends(&self) -> Result<usize> {
        let map = self.friends.read().unwrap();
        Ok(map.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aged_friend(id: i64, days_old: i64, dont_remove: Option<bool>) -> Friend {
        Friend::builder(UserId::new(id))
            .screen_name(format!("user{}", id))
            .following(true)
            .dont_remove(dont_remove)
            .date_added(Some(Utc::now() - Duration::days(days_old)))
            .build()
    }

    #[test]
    fn test_upsert_preserves_date_added() {
        let store = InMemoryFriendStore::new();
        let original = aged_friend(42, 50, None);
        store.upsert_friends(&[original.clone()]).unwrap();
        let first_added = store
            .get_friend(&UserId::new(42))
            .unwrap()
            .unwrap()
            .date_added;

        let updated = Friend {
            followers_count: 777,
            date_added: None,
            ..original
        };
        store.upsert_friends(&[updated]).unwrap();

        let stored = store.get_friend(&UserId::new(42)).unwrap().unwrap();
        assert_eq!(stored.followers_count, 777);
        assert_eq!(stored.date_added, first_added);
    }

    #[test]
    fn test_candidates_match_sqlite_semantics() {
        let store = InMemoryFriendStore::new();
        store
            .upsert_friends(&[
                aged_friend(1, 29, None),
                aged_friend(2, 31, None),
                aged_friend(3, 100, Some(true)),
            ])
            .unwrap();

        let candidates = store.removal_candidates(30).unwrap();
        let ids: Vec<i64> = candidates.iter().map(|f| f.user_id.as_i64()).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_relationship_update_unknown_is_noop() {
        let store = InMemoryFriendStore::new();
        assert!(!store.update_relationship(&UserId::new(1), true, false).unwrap());

        store.upsert_friends(&[aged_friend(1, 0, None)]).unwrap();
        assert!(store.update_relationship(&UserId::new(1), false, true).unwrap());
        let stored = store.get_friend(&UserId::new(1)).unwrap().unwrap();
        assert!(!stored.following);
        assert_eq!(stored.friends, Some(true));
    }
}
