// src/notify/telegram.rs

//! Telegram Bot API notifier.

use async_trait::async_trait;

use crate::config::TelegramCredentials;
use crate::error::{AppError, Result};
use crate::notify::Notifier;

/// Notifier backed by the Telegram `sendMessage` endpoint.
pub struct TelegramNotifier {
    client: reqwest::Client,
    credentials: TelegramCredentials,
}

impl TelegramNotifier {
    pub fn new(client: reqwest::Client, credentials: TelegramCredentials) -> Self {
        Self {
            client,
            credentials,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "https://api.telegram.org/bot{}/sendMessage",
            self.credentials.bot_token
        )
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let params = [
            ("chat_id", self.credentials.chat_id.as_str()),
            ("text", text),
            ("parse_mode", "HTML"),
            ("disable_web_page_preview", "false"),
        ];

        let response = self
            .client
            .post(self.endpoint())
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::notify(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::notify(format!(
                "sendMessage returned {status}: {body}"
            )));
        }

        Ok(())
    }
}
