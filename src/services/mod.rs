// src/services/mod.rs

//! External collaborators: page fetching and extraction.

pub mod extractor;

pub use extractor::{ArticleExtractor, HtmlExtractor};
