//! Friend model representing one tracked Twitter account

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a remote account (Twitter numeric user ID)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl UserId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One tracked account, as stored in the local database
///
/// Profile fields (`screen_name` through `following`) are refreshed on every
/// sync. `friends` is filled in by the separate relationship-update path.
/// `date_added` is assigned by the store at first insert and never rewritten;
/// it is the retention clock for removal candidates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Friend {
    /// Stable remote identity, primary key
    pub user_id: UserId,
    /// Handle, without the leading @
    pub screen_name: String,
    /// Display name
    pub name: String,
    /// Profile URL, if the account set one
    pub url: Option<String>,
    /// Blue-check flag as reported by the API
    pub verified: bool,
    /// Free-text location, if the account set one
    pub location: Option<String>,
    /// How many accounts they follow
    pub friends_count: i64,
    /// How many accounts follow them
    pub followers_count: i64,
    /// When the remote account was created
    pub created_at: Option<DateTime<Utc>>,
    /// Does the bot currently follow this account
    pub following: bool,
    /// Does this account follow the bot back (None = not yet probed)
    pub friends: Option<bool>,
    /// Exempt from retention-based removal
    pub dont_remove: Option<bool>,
    /// Was the follow initiated by automation vs. pre-existing
    pub added_by_bot: Option<bool>,
    /// When this row was first inserted (None until the store assigns it)
    pub date_added: Option<DateTime<Utc>>,
}

impl Friend {
    /// Create a new friend builder
    pub fn builder(user_id: UserId) -> FriendBuilder {
        FriendBuilder::new(user_id)
    }
}

/// Builder for creating Friend instances
pub struct FriendBuilder {
    user_id: UserId,
    screen_name: String,
    name: String,
    url: Option<String>,
    verified: bool,
    location: Option<String>,
    friends_count: i64,
    followers_count: i64,
    created_at: Option<DateTime<Utc>>,
    following: bool,
    friends: Option<bool>,
    dont_remove: Option<bool>,
    added_by_bot: Option<bool>,
    date_added: Option<DateTime<Utc>>,
}

impl FriendBuilder {
    fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            screen_name: String::new(),
            name: String::new(),
            url: None,
            verified: false,
            location: None,
            friends_count: 0,
            followers_count: 0,
            created_at: None,
            following: false,
            friends: None,
            dont_remove: None,
            added_by_bot: None,
            date_added: None,
        }
    }

    pub fn screen_name(mut self, screen_name: impl Into<String>) -> Self {
        self.screen_name = screen_name.into();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn url(mut self, url: Option<String>) -> Self {
        self.url = url;
        self
    }

    pub fn verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }

    pub fn location(mut self, location: Option<String>) -> Self {
        self.location = location;
        self
    }

    pub fn friends_count(mut self, count: i64) -> Self {
        self.friends_count = count;
        self
    }

    pub fn followers_count(mut self, count: i64) -> Self {
        self.followers_count = count;
        self
    }

    pub fn created_at(mut self, created_at: Option<DateTime<Utc>>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn following(mut self, following: bool) -> Self {
        self.following = following;
        self
    }

    pub fn friends(mut self, friends: Option<bool>) -> Self {
        self.friends = friends;
        self
    }

    pub fn dont_remove(mut self, dont_remove: Option<bool>) -> Self {
        self.dont_remove = dont_remove;
        self
    }

    pub fn added_by_bot(mut self, added_by_bot: Option<bool>) -> Self {
        self.added_by_bot = added_by_bot;
        self
    }

    pub fn date_added(mut self, date_added: Option<DateTime<Utc>>) -> Self {
        self.date_added = date_added;
        self
    }

    pub fn build(self) -> Friend {
        Friend {
            user_id: self.user_id,
            screen_name: self.screen_name,
            name: self.name,
            url: self.url,
            verified: self.verified,
            location: self.location,
            friends_count: self.friends_count,
            followers_count: self.followers_count,
            created_at: self.created_at,
            following: self.following,
            friends: self.friends,
            dont_remove: self.dont_remove,
            added_by_bot: self.added_by_bot,
            date_added: self.date_added,
        }
    }
}
