//! Friend-list sync implementation

use anyhow::{Context, Result};
use log::info;

use crate::storage::FriendStore;
use crate::twitter::{api::RawUser, normalize_user};

/// Statistics from a sync operation
#[derive(Debug, Default, Clone)]
pub struct SyncStats {
    /// Number of pages committed
    pub pages: usize,
    /// Number of records upserted
    pub records: usize,
    /// Duration of the sync operation
    pub duration_ms: u64,
}

/// Sync the friend list into local storage, committing per page.
///
/// This operation is idempotent - re-running it re-fetches from page 1 and
/// re-upserts, which never duplicates rows or resets `date_added`. A page
/// error or a malformed record aborts the run; pages committed so far stay
/// committed, so a crash loses at most one page of progress.
///
/// # Arguments
/// * `pages` - the page sequence, normally `UserClient::friends()`
/// * `store` - Storage backend
pub fn sync_friends<I>(pages: I, store: &dyn FriendStore) -> Result<SyncStats>
where
    I: IntoIterator<Item = Result<Vec<RawUser>>>,
{
    let start = std::time::Instant::now();
    let mut stats = SyncStats::default();

    for page in pages {
        let raw_users = page.context("Failed to fetch friends page")?;

        let mut batch = Vec::with_capacity(raw_users.len());
        for raw in &raw_users {
            batch.push(normalize_user(raw)?);
        }

        // One transaction per page
        store.upsert_friends(&batch)?;
        stats.pages += 1;
        stats.records += batch.len();

        info!(
            "[SYNC] Committed page {} ({} records, {} total)",
            stats.pages,
            batch.len(),
            stats.records
        );
    }

    stats.duration_ms = start.elapsed().as_millis() as u64;
    Ok(stats)
}
