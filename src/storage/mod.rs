// src/storage/mod.rs

//! State persistence for remembered article sets.
//!
//! One JSON document per source, addressed by a stable key. The production
//! backend is a GitHub Gist (one gist file per key); the local backend
//! keeps files on disk for development and tests.

pub mod gist;
pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::SourceState;

pub use gist::GistStore;
pub use local::LocalStore;

/// Trait for state store backends.
///
/// `load` distinguishes "no state yet" (`Ok(None)`, the first run) from a
/// failed or malformed read (`Err`); callers degrade both to an empty
/// remembered set but only the latter is worth a warning.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the persisted state stored under `key`, if any.
    async fn load(&self, key: &str) -> Result<Option<SourceState>>;

    /// Write `state` under `key`, replacing any previous document.
    async fn save(&self, key: &str, state: &SourceState) -> Result<()>;
}
