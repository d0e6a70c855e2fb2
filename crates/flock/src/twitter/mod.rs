//! Twitter API integration
//!
//! This module provides:
//! - OAuth 1.0a request signing
//! - A v1.1 user-context client (friend list, follow/unfollow, search)
//! - A v2 app-context client (recent tweet search)
//! - Response normalization to domain models
//!
//! The two API versions are deliberately separate clients: call sites pick
//! the one they need instead of one type mixing both authentication modes.

mod client;
mod normalize;
mod oauth;
mod search;

pub use client::{FriendPages, SearchV1Pages, UserClient};
pub use normalize::{MalformedRecord, normalize_user};
pub use oauth::OAuth1;
pub use search::{SearchClient, SearchPage, SearchPages};

use std::time::Duration;

use anyhow::{Result, bail};
use log::warn;

/// v1.1 search result ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultType {
    #[default]
    Mixed,
    Recent,
    Popular,
}

impl ResultType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultType::Mixed => "mixed",
            ResultType::Recent => "recent",
            ResultType::Popular => "popular",
        }
    }
}

/// How long to sleep after an HTTP 429 before retrying
const RATE_LIMIT_WAIT: Duration = Duration::from_secs(60);

/// Upper bound on waits for a single request; covers the 15-minute
/// v1.1 rate window with slack
const MAX_RATE_LIMIT_WAITS: u32 = 16;

/// Run a request, sleeping and retrying while the API reports a rate limit.
///
/// Every error other than HTTP 429 propagates immediately; the caller
/// decides whether to abort. This is the "block, don't fail" contract the
/// pagination iterators rely on.
pub(crate) fn retry_rate_limited<T>(
    what: &str,
    mut call: impl FnMut() -> Result<T, ureq::Error>,
) -> Result<T> {
    for _ in 0..MAX_RATE_LIMIT_WAITS {
        match call() {
            Ok(value) => return Ok(value),
            Err(ureq::Error::StatusCode(429)) => {
                warn!(
                    "[TWITTER] rate limited on {}, sleeping {}s",
                    what,
                    RATE_LIMIT_WAIT.as_secs()
                );
                std::thread::sleep(RATE_LIMIT_WAIT);
            }
            Err(e) => return Err(anyhow::Error::new(e).context(format!("{} failed", what))),
        }
    }

    bail!("{} still rate limited after {} waits", what, MAX_RATE_LIMIT_WAITS)
}

/// Twitter API response types
pub mod api {
    use serde::{Deserialize, Serialize};

    /// A v1.1 user object as it arrives on the wire
    ///
    /// Every field is optional; [`super::normalize_user`] decides which
    /// ones are actually required.
    #[derive(Debug, Clone, Default, Deserialize, Serialize)]
    #[serde(default)]
    pub struct RawUser {
        pub id: Option<i64>,
        pub screen_name: Option<String>,
        pub name: Option<String>,
        pub url: Option<String>,
        pub verified: Option<bool>,
        pub location: Option<String>,
        pub friends_count: Option<i64>,
        pub followers_count: Option<i64>,
        /// v1.1 timestamp, e.g. "Wed Oct 10 20:19:24 +0000 2018"
        pub created_at: Option<String>,
        pub following: Option<bool>,
    }

    /// One page of `GET friends/list.json`
    #[derive(Debug, Deserialize)]
    pub struct FriendsListPage {
        pub users: Vec<RawUser>,
        /// 0 means this was the last page
        pub next_cursor: i64,
        #[serde(default)]
        pub previous_cursor: i64,
    }

    /// A v1.1 tweet (the subset the bot cares about)
    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(default)]
    pub struct RawTweet {
        pub id: Option<i64>,
        pub created_at: Option<String>,
        pub text: Option<String>,
        pub user: Option<RawUser>,
        pub lang: Option<String>,
    }

    /// One page of `GET search/tweets.json`
    #[derive(Debug, Deserialize)]
    pub struct SearchTweetsPage {
        pub statuses: Vec<RawTweet>,
        pub search_metadata: SearchMetadata,
    }

    /// v1.1 search pagination metadata
    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    pub struct SearchMetadata {
        /// Pre-built query string for the next page, absent on the last one
        pub next_results: Option<String>,
    }

    /// Envelope of `GET 2/tweets/search/recent`
    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    pub struct SearchRecentResponse {
        pub data: Option<Vec<Tweet>>,
        pub includes: Option<Includes>,
        pub meta: SearchMeta,
    }

    /// A v2 tweet
    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(default)]
    pub struct Tweet {
        pub id: String,
        pub text: String,
        pub created_at: Option<String>,
        pub geo: Option<TweetGeo>,
    }

    /// v2 tweet geo block
    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(default)]
    pub struct TweetGeo {
        pub place_id: Option<String>,
    }

    /// v2 expansion payloads
    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    pub struct Includes {
        pub users: Option<Vec<RawUser>>,
        pub places: Option<Vec<Place>>,
    }

    /// A v2 place from `includes.places`
    #[derive(Debug, Clone, Deserialize)]
    pub struct Place {
        pub id: String,
        pub full_name: String,
    }

    /// v2 search pagination metadata
    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    pub struct SearchMeta {
        pub result_count: Option<u32>,
        pub next_token: Option<String>,
    }
}
