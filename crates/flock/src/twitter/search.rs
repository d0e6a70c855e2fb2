//! Twitter v2 app-context search client
//!
//! Bearer-token client for `GET 2/tweets/search/recent`. Kept separate
//! from [`super::UserClient`] so the two authentication modes never share
//! a type.

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};

use super::api::{SearchRecentResponse, Tweet};
use super::retry_rate_limited;

/// Twitter v2 client acting with an app-only bearer token
pub struct SearchClient {
    bearer_token: String,
}

/// One page of recent-search results with its place expansion resolved
#[derive(Debug, Default)]
pub struct SearchPage {
    pub tweets: Vec<Tweet>,
    /// place id -> full name, from `includes.places`
    pub places: HashMap<String, String>,
}

impl SearchClient {
    /// Twitter v2 API base URL
    const BASE_URL: &'static str = "https://api.twitter.com/2";

    /// Recent search caps pages at 100 tweets
    const MAX_PAGE_SIZE: usize = 100;

    /// Recent search requires at least 10 tweets per page
    const MIN_PAGE_SIZE: usize = 10;

    /// Create a new app-context search client
    pub fn new(bearer_token: impl Into<String>) -> Self {
        Self {
            bearer_token: bearer_token.into(),
        }
    }

    /// Search recent tweets, one network call per page.
    ///
    /// `start` defaults to 7 days ago and `end` to 1 day ago, the widest
    /// window the recent-search index reliably covers. `limit` caps the
    /// total number of tweets yielded across pages.
    pub fn search_recent(
        &self,
        query: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> SearchPages<'_> {
        let now = Utc::now();
        SearchPages {
            client: self,
            query: query.to_string(),
            start: start.unwrap_or(now - Duration::days(7)),
            end: end.unwrap_or(now - Duration::days(1)),
            remaining: limit,
            next_token: None,
            done: false,
        }
    }

    /// Fetch one recent-search page
    fn search_page(
        &self,
        query: &str,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
        page_size: usize,
        next_token: Option<&str>,
    ) -> Result<SearchRecentResponse> {
        let mut url = format!(
            "{}/tweets/search/recent?query={}&start_time={}&end_time={}&max_results={}\
             &expansions=geo.place_id&place.fields=full_name&tweet.fields=created_at",
            Self::BASE_URL,
            urlencoding::encode(query),
            urlencoding::encode(&start.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
            urlencoding::encode(&end.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
            page_size.clamp(Self::MIN_PAGE_SIZE, Self::MAX_PAGE_SIZE),
        );
        if let Some(token) = next_token {
            url.push_str(&format!("&next_token={}", token));
        }

        retry_rate_limited("search recent", || {
            let mut response = ureq::get(&url)
                .header("Authorization", &format!("Bearer {}", self.bearer_token))
                .call()?;
            response.body_mut().read_json()
        })
        .context("Twitter API request failed: search recent")
    }
}

/// Lazy page sequence over v2 recent-search results
pub struct SearchPages<'a> {
    client: &'a SearchClient,
    query: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    /// Tweets left under the caller's limit, None for unlimited
    remaining: Option<usize>,
    next_token: Option<String>,
    done: bool,
}

impl Iterator for SearchPages<'_> {
    type Item = Result<SearchPage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.remaining == Some(0) {
            self.done = true;
            return None;
        }

        let page_size = self.remaining.unwrap_or(SearchClient::MAX_PAGE_SIZE);
        let response = match self.client.search_page(
            &self.query,
            &self.start,
            &self.end,
            page_size,
            self.next_token.as_deref(),
        ) {
            Ok(response) => response,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        self.next_token = response.meta.next_token.clone();
        if self.next_token.is_none() {
            self.done = true;
        }

        let mut tweets = response.data.unwrap_or_default();
        if let Some(remaining) = self.remaining.as_mut() {
            tweets.truncate(*remaining);
            *remaining -= tweets.len();
        }

        let places: HashMap<String, String> = response
            .includes
            .and_then(|inc| inc.places)
            .unwrap_or_default()
            .into_iter()
            .map(|place| (place.id, place.full_name))
            .collect();

        Some(Ok(SearchPage { tweets, places }))
    }
}
