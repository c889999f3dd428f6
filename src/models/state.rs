// src/models/state.rs

//! Persisted state for one monitored source.
//!
//! The store holds UTF-8 JSON, one document per source. Timestamps travel
//! as RFC 3339 strings in a fixed UTC offset so the payload stays readable
//! when inspected by hand in the gist.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Article;

/// The remembered set of one source, as written to the store.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SourceState {
    /// Remembered articles. Order is insignificant here.
    #[serde(default)]
    pub articles: Vec<StoredArticle>,

    /// RFC 3339 timestamp of the last successful save
    #[serde(default)]
    pub last_updated: String,
}

impl SourceState {
    /// Build a persistable state from in-memory articles.
    pub fn from_articles(articles: &[Article], now: DateTime<FixedOffset>) -> Self {
        let offset = *now.offset();
        Self {
            articles: articles
                .iter()
                .map(|a| StoredArticle::from_article(a, offset))
                .collect(),
            last_updated: now.to_rfc3339(),
        }
    }

    /// Convert stored entries back into in-memory articles.
    ///
    /// Entries with an unparsable `first_seen_at` get `now` instead, so a
    /// malformed legacy record expires one window later rather than living
    /// in the store forever.
    pub fn into_articles(self, now: DateTime<Utc>) -> Vec<Article> {
        self.articles
            .into_iter()
            .map(|stored| stored.into_article(now))
            .collect()
    }
}

/// One remembered article on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredArticle {
    /// Article headline (the identity key)
    pub title: String,

    /// Absolute URL to the article
    #[serde(default)]
    pub link: String,

    /// RFC 3339 timestamp of first observation
    #[serde(default)]
    pub first_seen_at: String,
}

impl StoredArticle {
    fn from_article(article: &Article, offset: FixedOffset) -> Self {
        Self {
            title: article.title.clone(),
            link: article.link.clone(),
            first_seen_at: article.first_seen_at.with_timezone(&offset).to_rfc3339(),
        }
    }

    fn into_article(self, now: DateTime<Utc>) -> Article {
        let first_seen_at = DateTime::parse_from_rfc3339(&self.first_seen_at)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or(now);

        Article {
            title: self.title,
            link: self.link,
            first_seen_at,
        }
    }
}
