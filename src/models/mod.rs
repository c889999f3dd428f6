// src/models/mod.rs

//! Domain models for the monitor application.

mod article;
mod config;
mod state;

// Re-export all public types
pub use article::{Article, FetchedArticle};
pub use config::{
    CleaningConfig, Config, MonitorConfig, NotifyConfig, Source, StoreBackend, StoreConfig,
};
pub use state::{SourceState, StoredArticle};
