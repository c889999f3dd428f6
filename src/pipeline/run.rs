// src/pipeline/run.rs

//! One monitoring cycle.
//!
//! Sources are processed strictly in sequence; within a source the steps
//! are read-state → fetch → diff → notify → merge+prune → write-state.
//! The write is the sole mutation point and happens last, so an aborted
//! run never leaves the store corrupted. One source's failure never stops
//! the others.

use chrono::{DateTime, Duration, FixedOffset, Utc};

use crate::error::Result;
use crate::models::{Article, Config, FetchedArticle, Source, SourceState};
use crate::notify::{compose_messages, Notifier};
use crate::pipeline::{detect_novel, merge_fetched, prune_expired};
use crate::services::ArticleExtractor;
use crate::storage::StateStore;

/// Aggregated outcome of one run across all sources.
#[derive(Debug, Default)]
pub struct RunStats {
    pub sources_total: usize,
    pub load_failures: usize,
    pub fetch_failures: usize,
    pub novel_total: usize,
    pub messages_sent: usize,
    pub notify_failures: usize,
    pub save_failures: usize,
}

/// The state transition of one source for one cycle.
///
/// Pure apart from its inputs: given the remembered set, the fetched
/// articles, and the clock, it yields the novel articles (page order) and
/// the next remembered set. Novelty is computed against the unpruned
/// remembered set and pruning runs only after the merge, so an article
/// that ages out while still listed is dropped this cycle and re-reported
/// as novel on the next, never silently lost.
pub fn advance(
    remembered: Vec<Article>,
    fetched: &[FetchedArticle],
    now: DateTime<Utc>,
    window: Duration,
) -> (Vec<FetchedArticle>, Vec<Article>) {
    let novel = detect_novel(&remembered, fetched);
    let merged = merge_fetched(remembered, fetched, now);
    let retained = prune_expired(merged, now, window);
    (novel, retained)
}

/// Store key for a source's persisted state.
pub fn state_key(source_id: &str) -> String {
    format!("{source_id}.json")
}

/// Run one monitoring cycle over every configured source.
pub async fn run_monitor(
    config: &Config,
    extractor: &dyn ArticleExtractor,
    store: &dyn StateStore,
    notifier: &dyn Notifier,
) -> Result<RunStats> {
    let window = config.monitor.retention_window();
    let offset = config.store.utc_offset();
    let delay = std::time::Duration::from_millis(config.monitor.request_delay_ms);

    let mut stats = RunStats {
        sources_total: config.sources.len(),
        ..RunStats::default()
    };

    for (index, source) in config.sources.iter().enumerate() {
        monitor_source(config, extractor, store, notifier, source, window, offset, &mut stats)
            .await;

        // Space out page fetches; the last source needs no trailing pause.
        if index + 1 < config.sources.len() && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    log::info!(
        "Run complete: {} sources, {} new articles, {} messages sent ({} fetch / {} notify / {} save failures)",
        stats.sources_total,
        stats.novel_total,
        stats.messages_sent,
        stats.fetch_failures,
        stats.notify_failures,
        stats.save_failures
    );

    Ok(stats)
}

#[allow(clippy::too_many_arguments)]
async fn monitor_source(
    config: &Config,
    extractor: &dyn ArticleExtractor,
    store: &dyn StateStore,
    notifier: &dyn Notifier,
    source: &Source,
    window: Duration,
    offset: FixedOffset,
    stats: &mut RunStats,
) {
    log::info!("[{}] checking {}", source.id, source.name);

    let key = state_key(&source.id);
    let now = Utc::now();

    // A failed read degrades to an empty remembered set. Every currently
    // listed article gets re-reported on this run, which beats silently
    // losing the store.
    let remembered = match store.load(&key).await {
        Ok(Some(state)) => state.into_articles(now),
        Ok(None) => {
            log::info!("[{}] no previous state, starting fresh", source.id);
            Vec::new()
        }
        Err(e) => {
            stats.load_failures += 1;
            log::warn!("[{}] state load failed, treating as empty: {}", source.id, e);
            Vec::new()
        }
    };

    let fetched = match extractor.fetch(source).await {
        Ok(fetched) => fetched,
        Err(e) => {
            stats.fetch_failures += 1;
            log::warn!("[{}] fetch failed: {}", source.id, e);
            return;
        }
    };

    // An empty fetch means the page or parse failed, not that the listing
    // is empty. Writing an empty snapshot here would re-notify everything
    // next cycle.
    if fetched.is_empty() {
        stats.fetch_failures += 1;
        log::warn!("[{}] fetch returned nothing, skipping diff and save", source.id);
        return;
    }

    let (novel, retained) = advance(remembered, &fetched, now, window);

    if novel.is_empty() {
        log::info!("[{}] no new articles", source.id);
    } else {
        log::info!("[{}] {} new articles", source.id, novel.len());
        stats.novel_total += novel.len();

        let header = render_header(
            &config.notify.header_template,
            source,
            novel.len(),
            now.with_timezone(&offset),
        );
        let lines: Vec<String> = novel
            .iter()
            .map(|article| article.format(&config.notify.line_template))
            .collect();

        for message in compose_messages(&header, &lines, config.notify.max_message_chars) {
            match notifier.send(&message).await {
                Ok(()) => stats.messages_sent += 1,
                Err(e) => {
                    stats.notify_failures += 1;
                    log::warn!("[{}] notification send failed: {}", source.id, e);
                }
            }
        }
    }

    // Save on every successful fetch, novel or not, so the retention clock
    // advances on the scrape cadence. The notifications above are already
    // out; a failed save must not re-raise and duplicate them next call.
    let next = SourceState::from_articles(&retained, now.with_timezone(&offset));
    match store.save(&key, &next).await {
        Ok(()) => log::info!("[{}] saved {} remembered titles", source.id, retained.len()),
        Err(e) => {
            stats.save_failures += 1;
            log::warn!("[{}] state save failed: {}", source.id, e);
        }
    }
}

/// Render the notification header for a source.
///
/// Supported placeholders: `{name}`, `{count}`, `{time}`
fn render_header(
    template: &str,
    source: &Source,
    count: usize,
    now: DateTime<FixedOffset>,
) -> String {
    template
        .replace("{name}", &source.name)
        .replace("{count}", &count.to_string())
        .replace("{time}", &now.format("%Y-%m-%d %H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 6, hour, 0, 0).unwrap()
    }

    fn article(title: &str, first_seen_at: DateTime<Utc>) -> Article {
        Article {
            title: title.to_string(),
            link: format!("https://example.com/{title}"),
            first_seen_at,
        }
    }

    fn titles(articles: &[Article]) -> Vec<&str> {
        articles.iter().map(|a| a.title.as_str()).collect()
    }

    // --- advance ---

    #[test]
    fn test_fresh_start_reports_everything_in_page_order() {
        let fetched = vec![
            FetchedArticle::new("A", "u1"),
            FetchedArticle::new("B", "u2"),
        ];
        let now = at(12);

        let (novel, retained) = advance(vec![], &fetched, now, Duration::hours(24));

        let novel_titles: Vec<&str> = novel.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(novel_titles, vec!["A", "B"]);
        assert_eq!(titles(&retained), vec!["A", "B"]);
        assert!(retained.iter().all(|a| a.first_seen_at == now));
    }

    #[test]
    fn test_only_unseen_titles_are_novel() {
        let t0 = at(1);
        let now = at(2);
        let fetched = vec![
            FetchedArticle::new("A", "u1"),
            FetchedArticle::new("B", "u2"),
        ];

        let (novel, retained) =
            advance(vec![article("A", t0)], &fetched, now, Duration::hours(24));

        assert_eq!(novel.len(), 1);
        assert_eq!(novel[0].title, "B");
        assert_eq!(retained[0].first_seen_at, t0);
        assert_eq!(retained[1].first_seen_at, now);
    }

    #[test]
    fn test_aged_out_but_still_listed_is_dropped_not_renotified() {
        let now = at(12);
        let stale = article("A", now - Duration::hours(25));
        let fetched = vec![FetchedArticle::new("A", "u1")];

        let (novel, retained) = advance(vec![stale], &fetched, now, Duration::hours(24));

        // Matched the remembered set before pruning, so not novel this
        // cycle; expired afterwards, so the next cycle re-reports it.
        assert!(novel.is_empty());
        assert!(retained.is_empty());
    }

    #[test]
    fn test_second_identical_cycle_is_a_no_op() {
        let fetched = vec![
            FetchedArticle::new("A", "u1"),
            FetchedArticle::new("B", "u2"),
        ];
        let window = Duration::hours(24);

        let (_, first) = advance(vec![], &fetched, at(12), window);
        let (novel, second) = advance(first.clone(), &fetched, at(12), window);

        assert!(novel.is_empty());
        assert_eq!(titles(&second), titles(&first));
    }

    // --- run_monitor with stubbed collaborators ---

    struct StubExtractor {
        articles: Vec<FetchedArticle>,
    }

    #[async_trait]
    impl ArticleExtractor for StubExtractor {
        async fn fetch(&self, _source: &Source) -> Result<Vec<FetchedArticle>> {
            Ok(self.articles.clone())
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        states: Mutex<HashMap<String, SourceState>>,
        fail_saves: bool,
    }

    #[async_trait]
    impl StateStore for MemoryStore {
        async fn load(&self, key: &str) -> Result<Option<SourceState>> {
            Ok(self.states.lock().unwrap().get(key).cloned())
        }

        async fn save(&self, key: &str, state: &SourceState) -> Result<()> {
            if self.fail_saves {
                return Err(AppError::store("induced save failure"));
            }
            self.states
                .lock()
                .unwrap()
                .insert(key.to_string(), state.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, text: &str) -> Result<()> {
            self.messages.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn test_config() -> Config {
        let mut config = Config::default();
        config.monitor.request_delay_ms = 0;
        config.sources = vec![Source {
            id: "test".to_string(),
            name: "Test Section".to_string(),
            url: "https://example.com/news".to_string(),
            title_selector: "a".to_string(),
            link_selector: None,
            link_attr: "href".to_string(),
            keyword: None,
        }];
        config
    }

    #[tokio::test]
    async fn test_run_notifies_and_persists() {
        let config = test_config();
        let extractor = StubExtractor {
            articles: vec![
                FetchedArticle::new("First story", "https://example.com/1"),
                FetchedArticle::new("Second story", "https://example.com/2"),
            ],
        };
        let store = MemoryStore::default();
        let notifier = RecordingNotifier::default();

        let stats = run_monitor(&config, &extractor, &store, &notifier)
            .await
            .unwrap();

        assert_eq!(stats.novel_total, 2);
        assert_eq!(stats.messages_sent, 1);

        let messages = notifier.messages.lock().unwrap();
        let first = messages[0].find("First story").unwrap();
        let second = messages[0].find("Second story").unwrap();
        assert!(first < second);

        let states = store.states.lock().unwrap();
        assert_eq!(states.get("test.json").unwrap().articles.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_fetch_skips_notify_and_save() {
        let config = test_config();
        let extractor = StubExtractor { articles: vec![] };
        let store = MemoryStore::default();
        let notifier = RecordingNotifier::default();

        let stats = run_monitor(&config, &extractor, &store, &notifier)
            .await
            .unwrap();

        assert_eq!(stats.fetch_failures, 1);
        assert_eq!(stats.novel_total, 0);
        assert!(notifier.messages.lock().unwrap().is_empty());
        assert!(store.states.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_failure_does_not_abort_the_run() {
        let config = test_config();
        let extractor = StubExtractor {
            articles: vec![FetchedArticle::new("Only story", "https://example.com/1")],
        };
        let store = MemoryStore {
            fail_saves: true,
            ..MemoryStore::default()
        };
        let notifier = RecordingNotifier::default();

        let stats = run_monitor(&config, &extractor, &store, &notifier)
            .await
            .unwrap();

        assert_eq!(stats.save_failures, 1);
        assert_eq!(stats.messages_sent, 1);
    }

    #[tokio::test]
    async fn test_second_run_reports_nothing_new() {
        let config = test_config();
        let extractor = StubExtractor {
            articles: vec![FetchedArticle::new("Only story", "https://example.com/1")],
        };
        let store = MemoryStore::default();
        let notifier = RecordingNotifier::default();

        run_monitor(&config, &extractor, &store, &notifier)
            .await
            .unwrap();
        let stats = run_monitor(&config, &extractor, &store, &notifier)
            .await
            .unwrap();

        assert_eq!(stats.novel_total, 0);
        assert_eq!(notifier.messages.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_render_header() {
        let config = test_config();
        let now = Utc
            .with_ymd_and_hms(2026, 8, 6, 3, 0, 0)
            .unwrap()
            .with_timezone(&FixedOffset::east_opt(9 * 3600).unwrap());

        let header = render_header("[{name}] {count} new ({time})", &config.sources[0], 3, now);
        assert_eq!(header, "[Test Section] 3 new (2026-08-06 12:00:00)");
    }
}
