pub mod duckduckgo;
pub mod stream;
pub mod web;

pub use duckduckgo::{SearchClient, SearchResult, parse_results, resolve_link};
pub use stream::{Player, StreamKind, classify_query, detect_players, filter_streams, handle_stream};
pub use web::{extract_text, handle_search};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to parse search page: {0}")]
    Parse(String),
}
