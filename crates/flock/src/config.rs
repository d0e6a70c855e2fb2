//! Configuration loading for the bot
//!
//! Supports loading settings from (in order of priority):
//! 1. An explicit config file path (`--config`)
//! 2. The default config file (~/.config/preen/config.yaml)
//! 3. Runtime environment variables (credential fallback)

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::twitter::OAuth1;

/// Settings filename in the preen config directory
const SETTINGS_FILE: &str = "config.yaml";

/// Top-level settings, mirroring the config file's two sections
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub auth: AuthSettings,
    pub database: DatabaseSettings,
}

/// Twitter credentials. Any field absent from the file falls back to its
/// TWITTER_* environment variable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
    pub access_token: Option<String>,
    pub access_token_secret: Option<String>,
    /// App-only token, used by v2 search; the v1.1 client ignores it
    pub bearer_token: Option<String>,
}

/// Local database location
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub path: PathBuf,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("friends.db"),
        }
    }
}

impl Settings {
    /// Load settings using the following priority:
    /// 1. Explicit path, if given
    /// 2. Default config file (~/.config/preen/config.yaml)
    /// 3. Empty settings (credentials may still come from the environment)
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut settings: Settings = match explicit {
            Some(path) => config::load_yaml_file(path)?,
            None if config::config_exists(SETTINGS_FILE) => config::load_yaml(SETTINGS_FILE)?,
            None => Settings::default(),
        };

        settings.auth.fill_from_env();
        Ok(settings)
    }

    /// Default settings file path (~/.config/preen/config.yaml)
    pub fn default_settings_path() -> Option<PathBuf> {
        config::config_path(SETTINGS_FILE)
    }

    /// User-context credentials for the v1.1 client.
    ///
    /// Missing credentials are a configuration error, fatal before any
    /// sync work begins.
    pub fn user_tokens(&self) -> Result<OAuth1> {
        Ok(OAuth1 {
            consumer_key: self.auth.require("consumer_key", &self.auth.consumer_key)?,
            consumer_secret: self
                .auth
                .require("consumer_secret", &self.auth.consumer_secret)?,
            access_token: self.auth.require("access_token", &self.auth.access_token)?,
            access_token_secret: self
                .auth
                .require("access_token_secret", &self.auth.access_token_secret)?,
        })
    }

    /// App-only bearer token for the v2 search client
    pub fn bearer_token(&self) -> Result<String> {
        self.auth.require("bearer_token", &self.auth.bearer_token)
    }
}

impl AuthSettings {
    /// Fill credentials absent from the file from TWITTER_* env vars
    fn fill_from_env(&mut self) {
        fill(&mut self.consumer_key, "TWITTER_CONSUMER_KEY");
        fill(&mut self.consumer_secret, "TWITTER_CONSUMER_SECRET");
        fill(&mut self.access_token, "TWITTER_ACCESS_TOKEN");
        fill(&mut self.access_token_secret, "TWITTER_ACCESS_TOKEN_SECRET");
        fill(&mut self.bearer_token, "TWITTER_BEARER_TOKEN");
    }

    fn require(&self, name: &str, value: &Option<String>) -> Result<String> {
        value.clone().with_context(|| {
            format!(
                "Missing credential `{}`: set it in the auth section of the \
                 config file or via TWITTER_{}",
                name,
                name.to_uppercase()
            )
        })
    }
}

fn fill(slot: &mut Option<String>, var: &str) {
    if slot.is_none()
        && let Ok(value) = std::env::var(var)
        && !value.is_empty()
    {
        *slot = Some(value);
    }
}
