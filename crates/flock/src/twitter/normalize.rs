//! Raw user record normalization
//!
//! Converts a wire-format v1.1 user object into a [`Friend`]. This is a
//! strict parse: required fields that real v1.1 user objects always carry
//! must be present, anything else is a [`MalformedRecord`]. No I/O.

use chrono::{DateTime, Utc};

use super::api::RawUser;
use crate::models::{Friend, UserId};

/// Twitter's v1.1 timestamp layout, e.g. "Wed Oct 10 20:19:24 +0000 2018"
const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// A raw user record missing something the transform requires
#[derive(Debug, thiserror::Error)]
pub enum MalformedRecord {
    #[error("user record missing required field `{0}`")]
    MissingField(&'static str),
    #[error("user record has unparseable created_at `{0}`")]
    BadCreatedAt(String),
}

/// Normalize one raw user into a Friend record.
///
/// `following` is read from the source even though this transform only
/// runs while enumerating the bot's own friend list. `friends`,
/// `dont_remove`, `added_by_bot`, and `date_added` stay unset; they belong
/// to the store's insert defaults and the relationship-update path.
pub fn normalize_user(raw: &RawUser) -> Result<Friend, MalformedRecord> {
    let user_id = required(raw.id, "id")?;
    let screen_name = required(raw.screen_name.clone(), "screen_name")?;
    let name = required(raw.name.clone(), "name")?;
    let verified = required(raw.verified, "verified")?;
    let friends_count = required(raw.friends_count, "friends_count")?;
    let followers_count = required(raw.followers_count, "followers_count")?;
    let created_at_str = required(raw.created_at.as_deref(), "created_at")?;
    let created_at = parse_created_at(created_at_str)?;

    Ok(Friend::builder(UserId::new(user_id))
        .screen_name(screen_name)
        .name(name)
        .url(raw.url.clone())
        .verified(verified)
        .location(raw.location.clone())
        .friends_count(friends_count)
        .followers_count(followers_count)
        .created_at(Some(created_at))
        .following(raw.following.unwrap_or(false))
        .build())
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, MalformedRecord> {
    value.ok_or(MalformedRecord::MissingField(field))
}

fn parse_created_at(s: &str) -> Result<DateTime<Utc>, MalformedRecord> {
    DateTime::parse_from_str(s, CREATED_AT_FORMAT)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| MalformedRecord::BadCreatedAt(s.to_string()))
}
