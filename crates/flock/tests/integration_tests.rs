//! Integration tests for the flock crate
//!
//! These tests verify the complete flow from page sequences through the
//! stores, against both backends.

use anyhow::anyhow;
use chrono::{Duration, Utc};
use flock::models::{Friend, UserId};
use flock::storage::{FriendStore, InMemoryFriendStore, SqliteFriendStore};
use flock::sync_friends;
use flock::twitter::api::RawUser;
use tempfile::TempDir;

/// Helper to create raw users the way friends/list returns them
fn raw_user(id: i64) -> RawUser {
    RawUser {
        id: Some(id),
        screen_name: Some(format!("user{}", id)),
        name: Some(format!("User {}", id)),
        url: None,
        verified: Some(false),
        location: None,
        friends_count: Some(100),
        followers_count: Some(200),
        created_at: Some("Mon Jan 06 15:04:05 +0000 2020".to_string()),
        following: Some(true),
    }
}

/// Helper to create a stored friend with a backdated retention clock
fn aged_friend(id: i64, days_old: i64, dont_remove: Option<bool>) -> Friend {
    Friend::builder(UserId::new(id))
        .screen_name(format!("user{}", id))
        .name(format!("User {}", id))
        .following(true)
        .dont_remove(dont_remove)
        .date_added(Some(Utc::now() - Duration::days(days_old)))
        .build()
}

/// Both backends must satisfy the same store semantics
fn each_store(test: impl Fn(&dyn FriendStore)) {
    let memory = InMemoryFriendStore::new();
    test(&memory);

    let sqlite = SqliteFriendStore::open_in_memory().unwrap();
    test(&sqlite);
}

#[test]
fn test_two_page_sync_populates_store() {
    each_store(|store| {
        let pages = vec![
            Ok(vec![raw_user(1), raw_user(2), raw_user(3)]),
            Ok(vec![raw_user(4), raw_user(5)]),
        ];

        let stats = sync_friends(pages, store).unwrap();
        assert_eq!(stats.pages, 2);
        assert_eq!(stats.records, 5);

        let friends = store.all_friends().unwrap();
        assert_eq!(friends.len(), 5);
        for friend in friends {
            assert!(friend.following);
        }
    });
}

#[test]
fn test_resync_updates_counter_keeps_retention_clock() {
    each_store(|store| {
        sync_friends(vec![Ok(vec![raw_user(42)])], store).unwrap();
        let first = store.get_friend(&UserId::new(42)).unwrap().unwrap();

        let mut updated = raw_user(42);
        updated.followers_count = Some(9999);
        sync_friends(vec![Ok(vec![updated])], store).unwrap();

        let second = store.get_friend(&UserId::new(42)).unwrap().unwrap();
        assert_eq!(store.count_friends().unwrap(), 1);
        assert_eq!(second.followers_count, 9999);
        assert_eq!(second.date_added, first.date_added);
    });
}

#[test]
fn test_failed_page_leaves_committed_pages() {
    each_store(|store| {
        let pages = vec![
            Ok(vec![raw_user(1), raw_user(2)]),
            Err(anyhow!("502 from upstream")),
        ];

        assert!(sync_friends(pages, store).is_err());
        assert_eq!(store.count_friends().unwrap(), 2);
    });
}

#[test]
fn test_relationship_update_after_sync() {
    each_store(|store| {
        sync_friends(vec![Ok(vec![raw_user(7)])], store).unwrap();

        // Probe says: we still follow, and they follow back
        assert!(store.update_relationship(&UserId::new(7), true, true).unwrap());
        let friend = store.get_friend(&UserId::new(7)).unwrap().unwrap();
        assert_eq!(friend.friends, Some(true));

        // Unknown account is a silent no-op
        assert!(!store.update_relationship(&UserId::new(888), true, true).unwrap());
    });
}

#[test]
fn test_dont_remove_is_never_a_candidate() {
    each_store(|store| {
        store.upsert_friends(&[aged_friend(1, 100, Some(true))]).unwrap();

        for num_days in [1, 7, 30, 99, 100] {
            assert!(
                store.removal_candidates(num_days).unwrap().is_empty(),
                "num_days = {}",
                num_days
            );
        }
    });
}

#[test]
fn test_candidate_boundary_and_prune_flow() {
    each_store(|store| {
        store
            .upsert_friends(&[
                aged_friend(1, 29, None),
                aged_friend(2, 31, None),
                aged_friend(3, 31, Some(true)),
            ])
            .unwrap();

        let candidates = store.removal_candidates(30).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].user_id, UserId::new(2));

        // The prune workflow deletes each candidate after unfollowing
        for friend in &candidates {
            assert!(store.delete_friend(&friend.user_id).unwrap());
        }

        assert_eq!(store.count_friends().unwrap(), 2);
        assert!(store.removal_candidates(30).unwrap().is_empty());
    });
}

#[test]
fn test_sqlite_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("friends.test.sqlite");

    {
        let store = SqliteFriendStore::new(&db_path).unwrap();
        sync_friends(vec![Ok(vec![raw_user(1), raw_user(2)])], &store).unwrap();
    }

    let store = SqliteFriendStore::new(&db_path).unwrap();
    assert_eq!(store.count_friends().unwrap(), 2);

    let friend = store.get_friend(&UserId::new(1)).unwrap().unwrap();
    assert_eq!(friend.screen_name, "user1");
    assert!(friend.date_added.is_some());
}
