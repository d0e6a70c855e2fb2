//! Twitter v1.1 user-context client
//!
//! Provides the friend list, follow/unfollow mutations, and v1.1 search.
//! Uses synchronous HTTP (ureq); every request is signed with OAuth 1.0a.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use super::api::{FriendsListPage, RawTweet, RawUser, SearchTweetsPage};
use super::{OAuth1, ResultType, retry_rate_limited};
use crate::models::UserId;

/// Twitter v1.1 client acting as the bot's own account
pub struct UserClient {
    oauth: OAuth1,
}

impl UserClient {
    /// Twitter v1.1 API base URL
    const BASE_URL: &'static str = "https://api.twitter.com/1.1";

    /// Users per friends/list page, the v1.1 maximum
    const FRIENDS_PAGE_SIZE: &'static str = "200";

    /// Tweets per search/tweets page, the v1.1 maximum
    const SEARCH_PAGE_SIZE: &'static str = "100";

    /// Create a new user-context client
    pub fn new(oauth: OAuth1) -> Self {
        Self { oauth }
    }

    /// Check the credentials by fetching the bot's own user object.
    ///
    /// Called before any sync work so a bad token fails fast instead of
    /// half-way through a run.
    pub fn verify_credentials(&self) -> Result<RawUser> {
        let url = format!("{}/account/verify_credentials.json", Self::BASE_URL);
        self.request("verify credentials", "GET", &url, &[])
    }

    /// Enumerate the bot's current friends, one page per network call.
    ///
    /// The returned iterator is finite and not restartable; each call to
    /// `friends` starts a fresh pagination cursor. Advancing blocks on the
    /// network, waiting out rate limits instead of failing. After yielding
    /// an error the iterator is exhausted.
    pub fn friends(&self) -> FriendPages<'_> {
        FriendPages {
            client: self,
            cursor: -1,
            done: false,
        }
    }

    /// Follow an account. Already-following is not an error; the API
    /// response reflects whatever state the remote side settled on.
    pub fn follow(&self, user_id: &UserId) -> Result<RawUser> {
        let url = format!("{}/friendships/create.json", Self::BASE_URL);
        let id = user_id.to_string();
        self.request(
            "follow",
            "POST",
            &url,
            &[("follow", "true"), ("user_id", &id)],
        )
    }

    /// Unfollow an account. Symmetric with [`Self::follow`].
    pub fn unfollow(&self, user_id: &UserId) -> Result<RawUser> {
        let url = format!("{}/friendships/destroy.json", Self::BASE_URL);
        let id = user_id.to_string();
        self.request("unfollow", "POST", &url, &[("user_id", &id)])
    }

    /// v1.1 tweet search, cursored via `search_metadata.next_results`
    pub fn search(&self, query: &str, lang: Option<&str>, result_type: ResultType) -> SearchV1Pages<'_> {
        SearchV1Pages {
            client: self,
            next_params: Some(search_params(query, lang, result_type)),
        }
    }

    /// Fetch one friends/list page at the given cursor
    fn friends_page(&self, cursor: i64) -> Result<FriendsListPage> {
        let url = format!("{}/friends/list.json", Self::BASE_URL);
        let cursor = cursor.to_string();
        self.request(
            "list friends",
            "GET",
            &url,
            &[
                ("count", Self::FRIENDS_PAGE_SIZE),
                ("cursor", &cursor),
                ("skip_status", "true"),
            ],
        )
    }

    /// Fetch one search/tweets page with the given parameters
    fn search_page(&self, params: &[(String, String)]) -> Result<SearchTweetsPage> {
        let url = format!("{}/search/tweets.json", Self::BASE_URL);
        let borrowed: Vec<(&str, &str)> =
            params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        self.request("search tweets", "GET", &url, &borrowed)
    }

    /// Sign and send one request, parsing the JSON response.
    ///
    /// All parameters travel in the query string so the signature and the
    /// wire request cover the identical set. The Authorization header is
    /// rebuilt on every rate-limit retry to get a fresh nonce.
    fn request<T: DeserializeOwned>(
        &self,
        what: &str,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let full_url = if query.is_empty() {
            url.to_string()
        } else {
            format!("{}?{}", url, query)
        };

        retry_rate_limited(what, || {
            let auth = self.oauth.authorization_header(method, url, params);
            let mut response = if method == "POST" {
                ureq::post(&full_url)
                    .header("Authorization", &auth)
                    .send_empty()?
            } else {
                ureq::get(&full_url).header("Authorization", &auth).call()?
            };
            response.body_mut().read_json()
        })
        .with_context(|| format!("Twitter API request failed: {}", what))
    }
}

/// Lazy page sequence over the bot's friend list
///
/// Yields `Ok(users)` per page until `next_cursor` reaches 0, or a single
/// `Err` after which iteration stops.
pub struct FriendPages<'a> {
    client: &'a UserClient,
    cursor: i64,
    done: bool,
}

impl Iterator for FriendPages<'_> {
    type Item = Result<Vec<RawUser>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.client.friends_page(self.cursor) {
            Ok(page) => {
                self.cursor = page.next_cursor;
                if page.next_cursor == 0 {
                    self.done = true;
                }
                Some(Ok(page.users))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Lazy page sequence over v1.1 search results
pub struct SearchV1Pages<'a> {
    client: &'a UserClient,
    /// Parameters for the next request; None once exhausted or errored
    next_params: Option<Vec<(String, String)>>,
}

impl Iterator for SearchV1Pages<'_> {
    type Item = Result<Vec<RawTweet>>;

    fn next(&mut self) -> Option<Self::Item> {
        let params = self.next_params.take()?;

        match self.client.search_page(&params) {
            Ok(page) => {
                self.next_params = page
                    .search_metadata
                    .next_results
                    .as_deref()
                    .map(parse_query);
                Some(Ok(page.statuses))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Build the first-page parameter list for a v1.1 search
fn search_params(query: &str, lang: Option<&str>, result_type: ResultType) -> Vec<(String, String)> {
    let mut params = vec![
        ("q".to_string(), query.to_string()),
        ("count".to_string(), UserClient::SEARCH_PAGE_SIZE.to_string()),
        ("result_type".to_string(), result_type.as_str().to_string()),
    ];
    if let Some(lang) = lang {
        params.push(("lang".to_string(), lang.to_string()));
    }
    params
}

/// Parse the `next_results` query string ("?max_id=...&q=...") back into
/// decoded key/value pairs ready for re-signing
fn parse_query(qs: &str) -> Vec<(String, String)> {
    qs.trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (
                urlencoding::decode(k).map(|c| c.into_owned()).unwrap_or_else(|_| k.to_string()),
                urlencoding::decode(v).map(|c| c.into_owned()).unwrap_or_else(|_| v.to_string()),
            )
        })
        .collect()
}
