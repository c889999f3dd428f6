// src/pipeline/retention.rs

//! Merge and retention for the remembered set.
//!
//! The listing re-publishes the same headline across many cycles, so the
//! remembered set cannot simply mirror the latest page snapshot: an article
//! that scrolls off for one cycle would be re-notified when it returns.
//! Instead, every observed title is remembered with the time it was first
//! seen and expires a fixed window after that, whether or not it is still
//! on the page.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

use crate::models::{Article, FetchedArticle};

/// Merge freshly fetched articles into the remembered set.
///
/// Unseen titles are inserted with `first_seen_at = now`. Titles already
/// remembered are left untouched; re-observation must not reset the
/// retention clock, or articles that stay listed would never expire.
pub fn merge_fetched(
    mut remembered: Vec<Article>,
    fetched: &[FetchedArticle],
    now: DateTime<Utc>,
) -> Vec<Article> {
    let mut known: HashSet<String> = remembered.iter().map(|a| a.title.clone()).collect();

    for article in fetched {
        if known.insert(article.title.clone()) {
            remembered.push(Article {
                title: article.title.clone(),
                link: article.link.clone(),
                first_seen_at: now,
            });
        }
    }

    remembered
}

/// Drop every article first seen more than `window` ago.
pub fn prune_expired(
    articles: Vec<Article>,
    now: DateTime<Utc>,
    window: Duration,
) -> Vec<Article> {
    let cutoff = now - window;
    articles
        .into_iter()
        .filter(|a| a.first_seen_at >= cutoff)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 6, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_merge_inserts_unseen_with_now() {
        let now = at(10);
        let merged = merge_fetched(vec![], &[FetchedArticle::new("A", "u1")], now);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].first_seen_at, now);
    }

    #[test]
    fn test_merge_keeps_original_first_seen() {
        let t1 = at(1);
        let remembered = vec![Article {
            title: "A".to_string(),
            link: "u1".to_string(),
            first_seen_at: t1,
        }];

        let merged = merge_fetched(remembered, &[FetchedArticle::new("A", "u1")], at(9));
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].first_seen_at, t1);
    }

    #[test]
    fn test_merge_dedupes_fetched_titles() {
        let fetched = vec![
            FetchedArticle::new("A", "u1"),
            FetchedArticle::new("A", "u2"),
        ];
        let merged = merge_fetched(vec![], &fetched, at(10));
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].link, "u1");
    }

    #[test]
    fn test_prune_boundary() {
        let now = at(12);
        let window = Duration::hours(24);
        let articles = vec![
            Article {
                title: "just expired".to_string(),
                link: String::new(),
                first_seen_at: now - window - Duration::seconds(1),
            },
            Article {
                title: "still fresh".to_string(),
                link: String::new(),
                first_seen_at: now - window + Duration::seconds(1),
            },
        ];

        let retained = prune_expired(articles, now, window);
        assert_eq!(retained.len(), 1);
        assert_eq!(retained[0].title, "still fresh");
    }
}
