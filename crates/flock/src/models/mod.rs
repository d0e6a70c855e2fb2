//! Domain models for tracked accounts

mod friend;

pub use friend::{Friend, FriendBuilder, UserId};
