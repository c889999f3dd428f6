// src/config.rs

//! Environment-sourced settings.
//!
//! Selectors, sources, and tunables live in `config.toml` (see
//! `models::Config`); credentials come from the environment so they never
//! land in the repository. A missing credential is a fatal configuration
//! error, raised before any network call.

use crate::error::{AppError, Result};

/// Telegram bot credentials.
#[derive(Debug, Clone)]
pub struct TelegramCredentials {
    pub bot_token: String,
    pub chat_id: String,
}

impl TelegramCredentials {
    /// Read `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID`.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bot_token: require_env("TELEGRAM_BOT_TOKEN")?,
            chat_id: require_env("TELEGRAM_CHAT_ID")?,
        })
    }
}

/// GitHub Gist credentials for the remote state store.
#[derive(Debug, Clone)]
pub struct GistCredentials {
    pub token: String,
    pub gist_id: String,
}

impl GistCredentials {
    /// Read `GIST_ACCESS_TOKEN` and `GIST_ID`.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            token: require_env("GIST_ACCESS_TOKEN")?,
            gist_id: require_env("GIST_ID")?,
        })
    }
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AppError::config(format!("Missing required environment variable: {name}")))
}
