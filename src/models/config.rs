// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::Path;

use chrono::{Duration, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and scheduling behavior settings
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Notification composition settings
    #[serde(default)]
    pub notify: NotifyConfig,

    /// State store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Title preprocessing settings
    #[serde(default)]
    pub cleaning: CleaningConfig,

    /// Monitored listing pages
    #[serde(default = "defaults::default_sources")]
    pub sources: Vec<Source>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.monitor.user_agent.trim().is_empty() {
            return Err(AppError::validation("monitor.user_agent is empty"));
        }
        if self.monitor.timeout_secs == 0 {
            return Err(AppError::validation("monitor.timeout_secs must be > 0"));
        }
        if self.monitor.retention_hours == 0 {
            return Err(AppError::validation("monitor.retention_hours must be > 0"));
        }
        if self.notify.max_message_chars == 0 {
            return Err(AppError::validation("notify.max_message_chars must be > 0"));
        }
        if !(-23..=23).contains(&self.store.utc_offset_hours) {
            return Err(AppError::validation(
                "store.utc_offset_hours must be between -23 and 23",
            ));
        }
        if self.sources.is_empty() {
            return Err(AppError::validation("No sources defined"));
        }
        let mut seen_ids = std::collections::HashSet::new();
        for source in &self.sources {
            if source.id.trim().is_empty() {
                return Err(AppError::validation("Source with empty id"));
            }
            if !seen_ids.insert(source.id.as_str()) {
                return Err(AppError::validation(format!(
                    "Duplicate source id: {}",
                    source.id
                )));
            }
            if source.title_selector.trim().is_empty() {
                return Err(AppError::validation(format!(
                    "Source {} has an empty title_selector",
                    source.id
                )));
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            monitor: MonitorConfig::default(),
            notify: NotifyConfig::default(),
            store: StoreConfig::default(),
            cleaning: CleaningConfig::default(),
            sources: defaults::default_sources(),
        }
    }
}

/// HTTP client and run behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between source fetches in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// How long a seen title is remembered, in hours
    #[serde(default = "defaults::retention_hours")]
    pub retention_hours: u64,

    /// Titles at or below this length are discarded as noise
    #[serde(default = "defaults::min_title_len")]
    pub min_title_len: usize,
}

impl MonitorConfig {
    /// Retention window as a chrono duration.
    pub fn retention_window(&self) -> Duration {
        Duration::hours(self.retention_hours as i64)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            retention_hours: defaults::retention_hours(),
            min_title_len: defaults::min_title_len(),
        }
    }
}

/// Notification composition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Character budget per outgoing message
    #[serde(default = "defaults::max_message_chars")]
    pub max_message_chars: usize,

    /// Template for one article line. Placeholders: {title}, {link}
    #[serde(default = "defaults::line_template")]
    pub line_template: String,

    /// Template for the message header. Placeholders: {name}, {count}, {time}
    #[serde(default = "defaults::header_template")]
    pub header_template: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            max_message_chars: defaults::max_message_chars(),
            line_template: defaults::line_template(),
            header_template: defaults::header_template(),
        }
    }
}

/// Which state store backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// GitHub Gist over HTTP (production)
    Gist,
    /// Local filesystem (development and tests)
    Local,
}

/// State store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Storage backend
    #[serde(default = "defaults::backend")]
    pub backend: StoreBackend,

    /// Root directory for the local backend
    #[serde(default = "defaults::local_dir")]
    pub local_dir: String,

    /// Fixed UTC offset for persisted timestamps, in hours
    #[serde(default = "defaults::utc_offset_hours")]
    pub utc_offset_hours: i32,
}

impl StoreConfig {
    /// The configured fixed offset. Falls back to UTC on out-of-range values.
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: defaults::backend(),
            local_dir: defaults::local_dir(),
            utc_offset_hours: defaults::utc_offset_hours(),
        }
    }
}

/// Title cleaning/preprocessing settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CleaningConfig {
    /// Substrings to remove from titles before keying
    #[serde(default)]
    pub title_remove_patterns: Vec<String>,
}

impl CleaningConfig {
    /// Clean a title: collapse whitespace, strip configured substrings.
    pub fn clean_title(&self, text: &str) -> String {
        let mut result = Self::normalize_whitespace(text);

        for pattern in &self.title_remove_patterns {
            result = result.replace(pattern, "");
        }

        result.trim().to_string()
    }

    fn normalize_whitespace(s: &str) -> String {
        s.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// One monitored listing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    /// Stable identifier, also the store key stem
    pub id: String,

    /// Display name used in notification headers
    pub name: String,

    /// Listing page URL. A `{date}` placeholder is expanded to YYYYMMDD
    /// in the configured offset at fetch time.
    pub url: String,

    /// CSS selector for title elements, in page order
    pub title_selector: String,

    /// CSS selector for the link element within a title's subtree
    #[serde(default)]
    pub link_selector: Option<String>,

    /// HTML attribute carrying the link
    #[serde(default = "defaults::link_attr")]
    pub link_attr: String,

    /// Only titles containing this substring are kept
    #[serde(default)]
    pub keyword: Option<String>,
}

mod defaults {
    use super::{Source, StoreBackend};

    // Monitor defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (iPhone; CPU iPhone OS 16_6 like Mac OS X) AppleWebKit/605.1.15 \
         (KHTML, like Gecko) Version/16.6 Mobile/15E148 Safari/604.1"
            .into()
    }
    pub fn timeout() -> u64 {
        15
    }
    pub fn request_delay() -> u64 {
        1000
    }
    pub fn retention_hours() -> u64 {
        24
    }
    pub fn min_title_len() -> usize {
        5
    }

    // Notify defaults
    pub fn max_message_chars() -> usize {
        4000
    }
    pub fn line_template() -> String {
        "• <a href=\"{link}\">{title}</a>".into()
    }
    pub fn header_template() -> String {
        "[{name}] {count} new ({time})".into()
    }

    // Store defaults
    pub fn backend() -> StoreBackend {
        StoreBackend::Local
    }
    pub fn local_dir() -> String {
        "state".into()
    }
    pub fn utc_offset_hours() -> i32 {
        9
    }

    // Source defaults
    pub fn link_attr() -> String {
        "href".into()
    }

    /// The Naver sports sections monitored out of the box.
    pub fn default_sources() -> Vec<Source> {
        let sections = [
            ("kbaseball", "국내야구"),
            ("wbaseball", "해외야구"),
            ("kfootball", "국내축구"),
            ("wfootball", "해외축구"),
            ("basketball", "농구"),
            ("volleyball", "배구"),
            ("general", "일반스포츠"),
        ];

        sections
            .iter()
            .map(|(id, name)| Source {
                id: (*id).to_string(),
                name: (*name).to_string(),
                url: format!(
                    "https://m.sports.naver.com/{id}/news?sectionId={id}&sort=latest&date={{date}}&isPhoto=N"
                ),
                title_selector: ".NewsItem_title__BXkJ6".to_string(),
                link_selector: None,
                link_attr: link_attr(),
                keyword: Some("단독".to_string()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.monitor.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_retention() {
        let mut config = Config::default();
        config.monitor.retention_hours = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_duplicate_source_ids() {
        let mut config = Config::default();
        let duplicate = config.sources[0].clone();
        config.sources.push(duplicate);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_clean_title() {
        let cleaning = CleaningConfig {
            title_remove_patterns: vec!["[속보]".to_string()],
        };
        assert_eq!(
            cleaning.clean_title("  [속보]  Big   news  "),
            "Big news"
        );
    }

    #[test]
    fn test_utc_offset() {
        let store = StoreConfig::default();
        assert_eq!(store.utc_offset().local_minus_utc(), 9 * 3600);
    }
}
