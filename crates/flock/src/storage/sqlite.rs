//! SQLite-backed friend storage

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use rusqlite_migration::{M, Migrations};

use super::traits::FriendStore;
use crate::models::{Friend, UserId};

/// Storage layout of `date_added`, matching SQLite's `datetime('now')`
/// output so string comparison against it stays correct
const DATE_ADDED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Database migrations
///
/// Each migration is applied in order. The user_version pragma tracks which
/// migrations have been applied, so opening an existing database is a no-op.
fn migrations() -> Migrations<'static> {
    Migrations::new(vec![
        // Migration 1: Initial schema
        M::up(
            r#"
            -- One row per remote account ever observed
            CREATE TABLE friends (
                user_id INTEGER NOT NULL PRIMARY KEY,
                screen_name TEXT,
                name TEXT,
                url TEXT,
                verified INTEGER,
                location TEXT,
                friends_count INTEGER,
                followers_count INTEGER,
                created_at TEXT,
                following INTEGER,
                friends INTEGER,
                dont_remove INTEGER,
                added_by_bot INTEGER,
                date_added TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        ),
    ])
}

/// SQLite-backed friend store
///
/// At most one sync process is assumed to hold the connection; the Mutex
/// exists for interior mutability and the `Send + Sync` trait bound, not
/// for multi-writer coordination.
pub struct SqliteFriendStore {
    conn: Mutex<Connection>,
}

impl SqliteFriendStore {
    /// Open (or create) the database at `db_path` and apply migrations
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path.as_ref())
            .with_context(|| format!("Failed to open database at {:?}", db_path.as_ref()))?;
        Self::init(conn)
    }

    /// Open a throwaway in-memory database (tests)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::init(conn)
    }

    fn init(mut conn: Connection) -> Result<Self> {
        // WAL survives a crash mid-run with at most the uncommitted page
        // lost; NORMAL syncs at critical moments only, which WAL makes safe.
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            "#,
        )?;

        migrations()
            .to_latest(&mut conn)
            .context("Failed to run database migrations")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Build a Friend from a row selected with [`Self::SELECT_COLUMNS`]
    fn load_friend(row: &Row<'_>) -> rusqlite::Result<Friend> {
        let created_at: Option<String> = row.get(8)?;
        let created_at = created_at.and_then(|s| {
            chrono::DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        });

        let date_added: String = row.get(13)?;
        let date_added = NaiveDateTime::parse_from_str(&date_added, DATE_ADDED_FORMAT)
            .map(|dt| dt.and_utc())
            .ok();

        Ok(Friend {
            user_id: UserId::new(row.get(0)?),
            screen_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            url: row.get(3)?,
            verified: row.get::<_, Option<bool>>(4)?.unwrap_or(false),
            location: row.get(5)?,
            friends_count: row.get::<_, Option<i64>>(6)?.unwrap_or(0),
            followers_count: row.get::<_, Option<i64>>(7)?.unwrap_or(0),
            created_at,
            following: row.get::<_, Option<bool>>(9)?.unwrap_or(false),
            friends: row.get(10)?,
            dont_remove: row.get(11)?,
            added_by_bot: row.get(12)?,
            date_added,
        })
    }

    const SELECT_COLUMNS: &'static str = "user_id, screen_name, name, url, verified, location, \
         friends_count, followers_count, created_at, following, friends, \
         dont_remove, added_by_bot, date_added";
}

impl FriendStore for SqliteFriendStore {
    fn upsert_friends(&self, friends: &[Friend]) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        {
            // ON CONFLICT DO UPDATE instead of INSERT OR REPLACE: REPLACE
            // deletes the old row first, which would reset date_added.
            // An explicit date_added is honored at first insert only;
            // the conflict branch never touches it.
            let mut stmt = tx.prepare(
                "INSERT INTO friends
                 (user_id, screen_name, name, url, verified, location,
                  friends_count, followers_count, created_at, following,
                  friends, dont_remove, added_by_bot, date_added)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
                         COALESCE(?, datetime('now')))
                 ON CONFLICT(user_id) DO UPDATE SET
                    screen_name = excluded.screen_name,
                    name = excluded.name,
                    url = excluded.url,
                    verified = excluded.verified,
                    location = excluded.location,
                    friends_count = excluded.friends_count,
                    followers_count = excluded.followers_count,
                    created_at = excluded.created_at,
                    following = excluded.following,
                    friends = excluded.friends,
                    dont_remove = excluded.dont_remove,
                    added_by_bot = excluded.added_by_bot",
            )?;

            for friend in friends {
                stmt.execute(params![
                    friend.user_id.as_i64(),
                    friend.screen_name,
                    friend.name,
                    friend.url,
                    friend.verified,
                    friend.location,
                    friend.friends_count,
                    friend.followers_count,
                    friend.created_at.map(|dt| dt.to_rfc3339()),
                    friend.following,
                    friend.friends,
                    friend.dont_remove,
                    friend.added_by_bot,
                    friend
                        .date_added
                        .map(|dt| dt.format(DATE_ADDED_FORMAT).to_string()),
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn update_relationship(
        &self,
        user_id: &UserId,
        following: bool,
        follows_back: bool,
    ) -> Result<bool> {
        let conn = self.conn.lock().unwrap();

        let rows = conn.execute(
            "UPDATE friends SET following = ?2, friends = ?3 WHERE user_id = ?1",
            params![user_id.as_i64(), following, follows_back],
        )?;

        Ok(rows > 0)
    }

    fn removal_candidates(&self, num_days: u32) -> Result<Vec<Friend>> {
        let conn = self.conn.lock().unwrap();

        // NULL dont_remove means "not exempt"; the age comparison is
        // inclusive at the boundary.
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM friends
             WHERE (dont_remove IS NULL OR dont_remove = 0)
             AND date_added <= datetime('now', '-' || ?1 || ' days')",
            Self::SELECT_COLUMNS
        ))?;

        let friends = stmt
            .query_map([num_days], Self::load_friend)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(friends)
    }

    fn all_friends(&self) -> Result<Vec<Friend>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(&format!("SELECT {} FROM friends", Self::SELECT_COLUMNS))?;

        let friends = stmt
            .query_map([], Self::load_friend)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(friends)
    }

    fn get_friend(&self, user_id: &UserId) -> Result<Option<Friend>> {
        let conn = self.conn.lock().unwrap();

        let friend = conn
            .query_row(
                &format!(
                    "SELECT {} FROM friends WHERE user_id = ?",
                    Self::SELECT_COLUMNS
                ),
                [user_id.as_i64()],
                Self::load_friend,
            )
            .optional()?;

        Ok(friend)
    }

    fn delete_friend(&self, user_id: &UserId) -> Result<bool> {
        let conn = self.conn.lock().unwrap();

        let rows = conn.execute(
            "DELETE FROM friends WHERE user_id = ?",
            [user_id.as_i64()],
        )?;

        Ok(rows > 0)
    }

    fn count_friends(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM friends", [], |row| row.get(0))?;

        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::tempdir;

    fn make_friend(id: i64, screen_name: &str, followers: i64) -> Friend {
        Friend::builder(UserId::new(id))
            .screen_name(screen_name)
            .name(format!("User {}", id))
            .verified(false)
            .followers_count(followers)
            .following(true)
            .build()
    }

    fn aged_friend(id: i64, days_old: i64, dont_remove: Option<bool>) -> Friend {
        Friend::builder(UserId::new(id))
            .screen_name(format!("user{}", id))
            .following(true)
            .dont_remove(dont_remove)
            .date_added(Some(Utc::now() - Duration::days(days_old)))
            .build()
    }

    #[test]
    fn test_migrations_are_valid() {
        migrations().validate().unwrap();
    }

    #[test]
    fn test_open_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("friends.test.sqlite");

        {
            let store = SqliteFriendStore::new(&db_path).unwrap();
            store.upsert_friends(&[make_friend(1, "alice", 10)]).unwrap();
        }

        // Reopening runs migrations again without error and keeps data
        let store = SqliteFriendStore::new(&db_path).unwrap();
        assert_eq!(store.count_friends().unwrap(), 1);
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let store = SqliteFriendStore::open_in_memory().unwrap();
        let friend = make_friend(1, "alice", 10);

        store.upsert_friends(&[friend.clone()]).unwrap();
        let first = store.get_friend(&UserId::new(1)).unwrap().unwrap();

        store.upsert_friends(&[friend]).unwrap();
        let second = store.get_friend(&UserId::new(1)).unwrap().unwrap();

        assert_eq!(store.count_friends().unwrap(), 1);
        assert_eq!(first.date_added, second.date_added);
        assert_eq!(second.screen_name, "alice");
    }

    #[test]
    fn test_upsert_refreshes_mutable_fields_keeps_date_added() {
        let store = SqliteFriendStore::open_in_memory().unwrap();

        let original = aged_friend(42, 50, None);
        store.upsert_friends(&[original.clone()]).unwrap();
        let stored = store.get_friend(&UserId::new(42)).unwrap().unwrap();
        let original_date_added = stored.date_added.unwrap();

        let updated = Friend {
            screen_name: "renamed".to_string(),
            followers_count: 999,
            date_added: None,
            ..original
        };
        store.upsert_friends(&[updated]).unwrap();

        let stored = store.get_friend(&UserId::new(42)).unwrap().unwrap();
        assert_eq!(stored.screen_name, "renamed");
        assert_eq!(stored.followers_count, 999);
        assert_eq!(stored.date_added.unwrap(), original_date_added);
    }

    #[test]
    fn test_default_date_added_is_now() {
        let store = SqliteFriendStore::open_in_memory().unwrap();
        store.upsert_friends(&[make_friend(1, "alice", 10)]).unwrap();

        let stored = store.get_friend(&UserId::new(1)).unwrap().unwrap();
        let age = Utc::now() - stored.date_added.unwrap();
        assert!(age.num_seconds() >= 0);
        assert!(age.num_seconds() < 60);
    }

    #[test]
    fn test_update_relationship_touches_only_relationship_columns() {
        let store = SqliteFriendStore::open_in_memory().unwrap();
        store.upsert_friends(&[aged_friend(7, 10, None)]).unwrap();
        let before = store.get_friend(&UserId::new(7)).unwrap().unwrap();

        let touched = store.update_relationship(&UserId::new(7), false, true).unwrap();
        assert!(touched);

        let after = store.get_friend(&UserId::new(7)).unwrap().unwrap();
        assert!(!after.following);
        assert_eq!(after.friends, Some(true));
        // Everything else untouched
        assert_eq!(after.screen_name, before.screen_name);
        assert_eq!(after.followers_count, before.followers_count);
        assert_eq!(after.date_added, before.date_added);
    }

    #[test]
    fn test_update_relationship_unknown_user_is_noop() {
        let store = SqliteFriendStore::open_in_memory().unwrap();
        let touched = store.update_relationship(&UserId::new(999), true, true).unwrap();
        assert!(!touched);
        assert_eq!(store.count_friends().unwrap(), 0);
    }

    #[test]
    fn test_removal_candidates_age_boundary() {
        let store = SqliteFriendStore::open_in_memory().unwrap();
        store
            .upsert_friends(&[aged_friend(1, 29, None), aged_friend(2, 31, None)])
            .unwrap();

        let candidates = store.removal_candidates(30).unwrap();
        let ids: Vec<i64> = candidates.iter().map(|f| f.user_id.as_i64()).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_removal_candidates_respect_dont_remove() {
        let store = SqliteFriendStore::open_in_memory().unwrap();
        store
            .upsert_friends(&[
                aged_friend(1, 100, Some(true)),
                aged_friend(2, 100, Some(false)),
                aged_friend(3, 100, None),
            ])
            .unwrap();

        for num_days in [1, 30, 100] {
            let candidates = store.removal_candidates(num_days).unwrap();
            let mut ids: Vec<i64> = candidates.iter().map(|f| f.user_id.as_i64()).collect();
            ids.sort();
            // dont_remove = true is exempt at any age; NULL and false are not
            assert_eq!(ids, vec![2, 3], "num_days = {}", num_days);
        }
    }

    #[test]
    fn test_all_friends_and_delete() {
        let store = SqliteFriendStore::open_in_memory().unwrap();
        store
            .upsert_friends(&[make_friend(1, "a", 1), make_friend(2, "b", 2)])
            .unwrap();

        assert_eq!(store.all_friends().unwrap().len(), 2);

        assert!(store.delete_friend(&UserId::new(1)).unwrap());
        assert!(!store.delete_friend(&UserId::new(1)).unwrap());
        assert_eq!(store.count_friends().unwrap(), 1);
        assert!(store.get_friend(&UserId::new(1)).unwrap().is_none());
    }

    #[test]
    fn test_nullable_profile_fields_round_trip() {
        let store = SqliteFriendStore::open_in_memory().unwrap();
        let friend = Friend::builder(UserId::new(5))
            .screen_name("noprofile")
            .url(None)
            .location(None)
            .created_at(Some(
                chrono::DateTime::parse_from_rfc3339("2007-05-23T06:01:13+00:00")
                    .unwrap()
                    .with_timezone(&Utc),
            ))
            .following(true)
            .build();
        store.upsert_friends(&[friend]).unwrap();

        let stored = store.get_friend(&UserId::new(5)).unwrap().unwrap();
        assert!(stored.url.is_none());
        assert!(stored.location.is_none());
        assert_eq!(
            stored.created_at.unwrap().to_rfc3339(),
            "2007-05-23T06:01:13+00:00"
        );
    }
}
