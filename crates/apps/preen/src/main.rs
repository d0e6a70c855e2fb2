//! Preen - a friend-list grooming bot for Twitter
//!
//! Syncs the account's friend list into a local SQLite cache, tracks how
//! long each friend has been around, and unfollows the stale ones.

use anyhow::Result;
use clap::Parser;
use log::error;

mod cli;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // Bootstrap config directory
    if let Err(e) = config::init() {
        error!("Failed to initialize config directory: {}", e);
    }

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Sync => cli::run_sync(config_path),
        Commands::Candidates { days } => cli::run_candidates(config_path, days),
        Commands::Prune { days, dry_run } => cli::run_prune(config_path, days, dry_run),
        Commands::Search {
            query,
            lang,
            start,
            end,
            limit,
        } => cli::run_search(config_path, &query, lang.as_deref(), start, end, limit),
    }
}
