// src/notify/mod.rs

//! Notification delivery and size-budgeted message composition.

pub mod telegram;

use async_trait::async_trait;

use crate::error::Result;

pub use telegram::TelegramNotifier;

/// Contract for delivering one formatted message.
///
/// Failures are reported to the caller, which logs them and moves on; a
/// lost notification never aborts a monitoring run.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

/// Compose one or more messages from a header and per-article lines.
///
/// Lines are accumulated under the character budget; when the next line
/// would overflow, the completed lines are flushed as a message and
/// accumulation continues in a new one, preserving article order. A line
/// is never split: a single line exceeding the budget is emitted as its
/// own message unmodified.
pub fn compose_messages(header: &str, lines: &[String], max_chars: usize) -> Vec<String> {
    let mut messages = Vec::new();
    let mut current = header.trim_end().to_string();

    for line in lines {
        if current.is_empty() {
            current = line.clone();
            continue;
        }

        let candidate = current.chars().count() + 1 + line.chars().count();
        if candidate > max_chars {
            messages.push(std::mem::take(&mut current));
            current = line.clone();
        } else {
            current.push('\n');
            current.push_str(line);
        }
    }

    if !current.is_empty() {
        messages.push(current);
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_single_message_when_under_budget() {
        let messages = compose_messages("Header", &lines(&["one", "two"]), 100);
        assert_eq!(messages, vec!["Header\none\ntwo"]);
    }

    #[test]
    fn test_split_preserves_order_and_whole_lines() {
        let messages = compose_messages("HH", &lines(&["aaaa", "bbbb", "cccc"]), 10);
        assert_eq!(messages, vec!["HH\naaaa", "bbbb\ncccc"]);
    }

    #[test]
    fn test_header_only_on_first_message() {
        let messages = compose_messages("Header", &lines(&["aaaaaaaa", "bbbbbbbb"]), 16);
        assert_eq!(messages[0], "Header\naaaaaaaa");
        assert_eq!(messages[1], "bbbbbbbb");
    }

    #[test]
    fn test_oversized_line_sent_alone_unmodified() {
        let long = "x".repeat(50);
        let messages = compose_messages("H", &lines(&["short", &long, "after"]), 20);
        assert_eq!(messages, vec!["H\nshort".to_string(), long, "after".to_string()]);
    }

    #[test]
    fn test_no_lines_yields_header_alone() {
        let messages = compose_messages("Header", &[], 100);
        assert_eq!(messages, vec!["Header"]);
    }

    #[test]
    fn test_budget_counts_characters_not_bytes() {
        // Each Hangul syllable is one character but three UTF-8 bytes.
        let messages = compose_messages("", &lines(&["단독보도", "단독보도"]), 9);
        assert_eq!(messages.len(), 1);
    }
}
