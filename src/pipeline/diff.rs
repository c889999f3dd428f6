// src/pipeline/diff.rs

//! Novelty detection.
//!
//! A fetched article is novel when its title is absent from the remembered
//! set. Comparison is exact string equality on titles; links play no part.
//! Novel articles are reported in page order, because placement on the
//! listing page is the source's own ranking signal.

use std::collections::HashSet;

use crate::models::{Article, FetchedArticle};

/// Titles present in `fetched` but not in `remembered`, in fetched order.
pub fn detect_novel(remembered: &[Article], fetched: &[FetchedArticle]) -> Vec<FetchedArticle> {
    let known: HashSet<&str> = remembered.iter().map(|a| a.title.as_str()).collect();

    fetched
        .iter()
        .filter(|f| !known.contains(f.title.as_str()))
        .cloned()
        .collect()
}
