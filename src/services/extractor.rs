// src/services/extractor.rs

//! Article extraction from listing pages.
//!
//! Fetches a source's listing page and pulls `(title, link)` pairs out of
//! it using the CSS selectors configured per source. All provider-specific
//! markup knowledge lives in the source configuration, not here.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{CleaningConfig, FetchedArticle, MonitorConfig, Source};
use crate::utils::resolve;

/// Contract for fetching the current articles of a source.
///
/// Implementations return articles in page order with unique titles. An
/// error (or an empty result) means the fetch failed and the caller must
/// not mistake it for "zero articles listed".
#[async_trait]
pub trait ArticleExtractor: Send + Sync {
    async fn fetch(&self, source: &Source) -> Result<Vec<FetchedArticle>>;
}

/// Scraper-backed extractor for HTML listing pages.
pub struct HtmlExtractor {
    client: reqwest::Client,
    monitor: MonitorConfig,
    cleaning: CleaningConfig,
    offset: FixedOffset,
}

impl HtmlExtractor {
    pub fn new(
        client: reqwest::Client,
        monitor: MonitorConfig,
        cleaning: CleaningConfig,
        offset: FixedOffset,
    ) -> Self {
        Self {
            client,
            monitor,
            cleaning,
            offset,
        }
    }

    /// Expand the `{date}` placeholder some listings require.
    fn expanded_url(&self, url: &str, now: DateTime<Utc>) -> String {
        let date = now.with_timezone(&self.offset).format("%Y%m%d").to_string();
        url.replace("{date}", &date)
    }

    /// Extract articles from already-fetched HTML. Exposed for tests.
    pub fn extract(
        &self,
        html: &str,
        source: &Source,
        page_url: &str,
    ) -> Result<Vec<FetchedArticle>> {
        let document = Html::parse_document(html);

        let title_sel = parse_selector(&source.title_selector)?;
        let link_sel = source
            .link_selector
            .as_deref()
            .map(parse_selector)
            .transpose()?;

        let mut seen = std::collections::HashSet::new();
        let mut articles = Vec::new();

        for element in document.select(&title_sel) {
            let raw_title: String = element.text().collect();
            let title = self.cleaning.clean_title(&raw_title);

            if title.chars().count() <= self.monitor.min_title_len {
                continue;
            }
            if let Some(keyword) = &source.keyword {
                if !title.contains(keyword.as_str()) {
                    continue;
                }
            }

            let Some(href) = find_link(&element, link_sel.as_ref(), &source.link_attr) else {
                log::debug!("[{}] no link found for '{}'", source.id, title);
                continue;
            };
            let link = resolve(page_url, &href);

            if seen.insert(title.clone()) {
                articles.push(FetchedArticle { title, link });
            }
        }

        Ok(articles)
    }
}

#[async_trait]
impl ArticleExtractor for HtmlExtractor {
    async fn fetch(&self, source: &Source) -> Result<Vec<FetchedArticle>> {
        let url = self.expanded_url(&source.url, Utc::now());

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::extract(&source.id, e))?;

        if !response.status().is_success() {
            return Err(AppError::extract(
                &source.id,
                format!("listing page returned {}", response.status()),
            ));
        }

        let html = response
            .text()
            .await
            .map_err(|e| AppError::extract(&source.id, e))?;

        self.extract(&html, source, &url)
    }
}

/// Find the link for a matched title element.
///
/// Precedence: configured link selector within the title's subtree, the
/// title element itself when it is an anchor, the nearest descendant
/// anchor, then the nearest ancestor anchor. Listing markup wraps titles
/// both ways in the wild.
fn find_link(element: &ElementRef, link_sel: Option<&Selector>, attr: &str) -> Option<String> {
    if let Some(sel) = link_sel {
        return element
            .select(sel)
            .next()
            .and_then(|e| e.value().attr(attr))
            .map(str::to_string);
    }

    if element.value().name() == "a" {
        if let Some(href) = element.value().attr(attr) {
            return Some(href.to_string());
        }
    }

    let anchor = Selector::parse("a").ok()?;
    if let Some(descendant) = element.select(&anchor).next() {
        if let Some(href) = descendant.value().attr(attr) {
            return Some(href.to_string());
        }
    }

    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "a")
        .and_then(|e| e.value().attr(attr))
        .map(str::to_string)
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
