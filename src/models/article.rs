// src/models/article.rs

//! Article data structures.

use chrono::{DateTime, Utc};

/// An article in the remembered set.
///
/// The title is the natural key; link and first-seen time are attributes
/// and take no part in identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Article headline, cleaned and non-empty
    pub title: String,

    /// Absolute URL to the article
    pub link: String,

    /// When this title first appeared in a fetch
    pub first_seen_at: DateTime<Utc>,
}

/// An article as extracted from a listing page, in page order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedArticle {
    /// Article headline
    pub title: String,

    /// Absolute URL to the article
    pub link: String,
}

impl FetchedArticle {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }

    /// Render this article through a line template.
    ///
    /// Supported placeholders: `{title}`, `{link}`
    pub fn format(&self, template: &str) -> String {
        template
            .replace("{title}", &self.title)
            .replace("{link}", &self.link)
    }
}
