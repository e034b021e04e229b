use thiserror::Error;

use crate::config::Network;

/// Error type for subgraph client operations
#[derive(Debug, Error)]
pub enum SubgraphClientError {
    /// Transport-level failure from the reqwest HTTP client
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("subgraph returned HTTP {status}: {body}")]
    StatusError { status: u16, body: String },

    /// GraphQL-level errors in an otherwise successful response
    #[error("GraphQL error: {0}")]
    GraphqlError(String),

    /// Response could not be decoded into the expected shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// No endpoint configured for the network
    #[error("no subgraph configured for {0}")]
    UnknownNetwork(Network),

    /// Fetch stopped because cancellation was requested
    #[error("fetch cancelled")]
    Cancelled,
}

impl SubgraphClientError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            SubgraphClientError::HttpError(e) => {
                e.is_timeout() || e.is_connect() || e.is_request() || e.is_body()
            }
            SubgraphClientError::StatusError { status, .. } => {
                *status == 429 || (500..600).contains(status)
            }
            SubgraphClientError::GraphqlError(_)
            | SubgraphClientError::MalformedResponse(_)
            | SubgraphClientError::UnknownNetwork(_)
            | SubgraphClientError::Cancelled => false,
        }
    }
}

impl From<serde_json::Error> for SubgraphClientError {
    fn from(error: serde_json::Error) -> Self {
        SubgraphClientError::MalformedResponse(error.to_string())
    }
}
