// src/storage/gist.rs

//! GitHub Gist state store.
//!
//! The gist holds one file per source key; `load` reads the file content
//! out of the gist document and `save` patches it back. A missing gist
//! file is a normal first run, not an error.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::GistCredentials;
use crate::error::{AppError, Result};
use crate::models::SourceState;
use crate::storage::StateStore;

const GITHUB_API: &str = "https://api.github.com";
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Gist-backed store for persisted source state.
pub struct GistStore {
    client: reqwest::Client,
    credentials: GistCredentials,
}

/// The subset of the gist document this store reads.
#[derive(Debug, Deserialize)]
struct Gist {
    #[serde(default)]
    files: HashMap<String, GistFile>,
}

#[derive(Debug, Deserialize)]
struct GistFile {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    truncated: bool,
    #[serde(default)]
    raw_url: Option<String>,
}

impl GistStore {
    pub fn new(client: reqwest::Client, credentials: GistCredentials) -> Self {
        Self {
            client,
            credentials,
        }
    }

    fn gist_url(&self) -> String {
        format!("{GITHUB_API}/gists/{}", self.credentials.gist_id)
    }

    async fn fetch_gist(&self) -> Result<Option<Gist>> {
        let response = self
            .client
            .get(self.gist_url())
            .bearer_auth(&self.credentials.token)
            .header("Accept", GITHUB_ACCEPT)
            .send()
            .await
            .map_err(|e| AppError::store(e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(AppError::store(format!(
                "gist read returned {}",
                response.status()
            )));
        }

        let gist = response.json().await.map_err(|e| AppError::store(e))?;
        Ok(Some(gist))
    }

    /// Fetch the full content of a file the gist API truncated inline.
    async fn fetch_raw(&self, raw_url: &str) -> Result<String> {
        let response = self
            .client
            .get(raw_url)
            .bearer_auth(&self.credentials.token)
            .send()
            .await
            .map_err(|e| AppError::store(e))?;

        if !response.status().is_success() {
            return Err(AppError::store(format!(
                "gist raw read returned {}",
                response.status()
            )));
        }

        response.text().await.map_err(|e| AppError::store(e))
    }
}

#[async_trait]
impl StateStore for GistStore {
    async fn load(&self, key: &str) -> Result<Option<SourceState>> {
        let Some(gist) = self.fetch_gist().await? else {
            return Ok(None);
        };
        let Some(file) = gist.files.get(key) else {
            return Ok(None);
        };

        let content = if file.truncated {
            match &file.raw_url {
                Some(raw_url) => Some(self.fetch_raw(raw_url).await?),
                None => file.content.clone(),
            }
        } else {
            file.content.clone()
        };

        match content {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, key: &str, state: &SourceState) -> Result<()> {
        let content = serde_json::to_string_pretty(state)?;
        let payload = serde_json::json!({
            "files": { key: { "content": content } }
        });

        let response = self
            .client
            .patch(self.gist_url())
            .bearer_auth(&self.credentials.token)
            .header("Accept", GITHUB_ACCEPT)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::store(e))?;

        if !response.status().is_success() {
            return Err(AppError::store(format!(
                "gist write returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}
