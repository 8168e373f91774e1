//! Web search boundary.
//!
//! A search lookup returns a short snippet that is added to the prompt as
//! reference material. An answer the endpoint does not have is an empty
//! string, not an error.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Search request failed: {0}")]
    Transport(String),

    #[error("Search endpoint returned status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Failed to parse search response: {0}")]
    Parse(String),
}

/// Looks up a short text answer for a query.
#[async_trait::async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, query: &str) -> Result<String, SearchError>;
}
