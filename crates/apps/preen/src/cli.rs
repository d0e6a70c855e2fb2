//! CLI command definitions and handlers

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use log::{info, warn};

use flock::storage::{FriendStore, SqliteFriendStore};
use flock::twitter::{SearchClient, UserClient};
use flock::{Settings, sync_friends};

#[derive(Parser)]
#[command(name = "preen")]
#[command(author, version, about = "Track and groom a Twitter friends list")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file (default: ~/.config/preen/config.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the friends list and refresh the local cache
    Sync,

    /// List friends eligible for removal
    Candidates {
        /// Minimum days a friend must have been tracked
        #[arg(short, long)]
        days: u32,
    },

    /// Unfollow and delete removal candidates
    Prune {
        /// Minimum days a friend must have been tracked
        #[arg(short, long)]
        days: u32,

        /// List what would be removed without touching anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Search recent tweets
    Search {
        /// Twitter search query
        #[arg(short, long)]
        query: String,

        /// Language filter (e.g. en)
        #[arg(short, long)]
        lang: Option<String>,

        /// Start date (format: yyyy-mm-dd, default: 7 days ago)
        #[arg(short, long, value_parser = parse_date)]
        start: Option<DateTime<Utc>>,

        /// End date (format: yyyy-mm-dd, default: 1 day ago)
        #[arg(short, long, value_parser = parse_date)]
        end: Option<DateTime<Utc>>,

        /// Limit number of tweets returned
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
}

/// Parse a yyyy-mm-dd date into a UTC midnight timestamp
fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| {
            d.and_hms_opt(0, 0, 0)
                .expect("midnight is always valid")
                .and_utc()
        })
        .map_err(|e| format!("invalid date `{}` (expected yyyy-mm-dd): {}", s, e))
}

/// Build the v1.1 client and fail fast if the API rejects the credentials
fn authenticated_client(settings: &Settings) -> Result<UserClient> {
    let client = UserClient::new(settings.user_tokens()?);
    let me = client
        .verify_credentials()
        .context("Twitter rejected the configured credentials")?;
    info!(
        "Authenticated as @{}",
        me.screen_name.as_deref().unwrap_or("<unknown>")
    );
    Ok(client)
}

pub fn run_sync(config_path: Option<&Path>) -> Result<()> {
    let settings = Settings::load(config_path)?;
    let client = authenticated_client(&settings)?;
    let store = SqliteFriendStore::new(&settings.database.path)?;

    let stats = sync_friends(client.friends(), &store)?;
    info!(
        "Synced {} friends across {} pages in {}ms",
        stats.records, stats.pages, stats.duration_ms
    );

    Ok(())
}

pub fn run_candidates(config_path: Option<&Path>, days: u32) -> Result<()> {
    let settings = Settings::load(config_path)?;
    let store = SqliteFriendStore::new(&settings.database.path)?;

    let candidates = store.removal_candidates(days)?;
    for friend in &candidates {
        println!(
            "{:>20}  @{:<24} tracked since {}",
            friend.user_id,
            friend.screen_name,
            friend
                .date_added
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "?".to_string())
        );
    }
    info!("{} removal candidates older than {} days", candidates.len(), days);

    Ok(())
}

pub fn run_prune(config_path: Option<&Path>, days: u32, dry_run: bool) -> Result<()> {
    let settings = Settings::load(config_path)?;
    let store = SqliteFriendStore::new(&settings.database.path)?;

    let candidates = store.removal_candidates(days)?;
    if candidates.is_empty() {
        info!("Nothing to prune");
        return Ok(());
    }

    if dry_run {
        for friend in &candidates {
            println!("would unfollow @{} ({})", friend.screen_name, friend.user_id);
        }
        warn!("Dry run: {} friends left untouched", candidates.len());
        return Ok(());
    }

    let client = authenticated_client(&settings)?;

    // Remote call first, then the local row; a failure aborts the run and
    // a re-run picks up the remaining candidates.
    for friend in &candidates {
        client
            .unfollow(&friend.user_id)
            .with_context(|| format!("Failed to unfollow @{}", friend.screen_name))?;
        store.delete_friend(&friend.user_id)?;
        info!("Unfollowed @{} ({})", friend.screen_name, friend.user_id);
    }

    info!("Pruned {} friends", candidates.len());
    Ok(())
}

pub fn run_search(
    config_path: Option<&Path>,
    query: &str,
    lang: Option<&str>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    limit: Option<usize>,
) -> Result<()> {
    let settings = Settings::load(config_path)?;
    let client = SearchClient::new(settings.bearer_token()?);

    // v2 recent search has no language parameter; fold it into the query.
    let query = match lang {
        Some(lang) => format!("{} lang:{}", query, lang),
        None => query.to_string(),
    };

    let mut total = 0usize;
    for page in client.search_recent(&query, start, end, limit) {
        let page = page?;
        for tweet in &page.tweets {
            let place = tweet
                .geo
                .as_ref()
                .and_then(|geo| geo.place_id.as_ref())
                .and_then(|id| page.places.get(id))
                .map(|name| format!(" [{}]", name))
                .unwrap_or_default();

            println!(
                "{}  {}{}  {}",
                tweet.id,
                tweet.created_at.as_deref().unwrap_or("-"),
                place,
                tweet.text.replace('\n', " ")
            );
        }
        total += page.tweets.len();
    }

    info!("{} tweets matched", total);
    Ok(())
}
