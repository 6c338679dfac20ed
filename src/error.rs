//! error types
//!
//! structured errors for config, request encoding, transport, rate limiting,
//! response decoding, binding, and graphql responses.

use crate::graphql::{GraphQlError, GraphQlErrors};
use std::fmt;

/// library result type
pub type Result<T> = std::result::Result<T, Error>;

/// error type for the client and its query builder / binder
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    /// the query builder rejected the descriptor or variables
    #[error("build error: {0}")]
    Build(String),

    /// request serialization failed or a `Retry-After` header was malformed
    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("operation cancelled")]
    Cancelled,

    #[error("timed out retrying with secondary rate limit reached on {url}")]
    RateLimitTimeout { url: String },

    #[error("non-200 OK status code: {status} body: {body:?}")]
    HttpStatus {
        /// final http status
        status: u16,
        /// truncated response body
        body: String,
        /// `Retry-After` seconds on a final 403, i.e. retries ran out
        retry_after: Option<u64>,
    },

    #[error("decode error: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("bind error: {0}")]
    Bind(String),

    /// server reported errors; displays only the first message
    #[error("{0}")]
    GraphQl(GraphQlErrors),
}

impl Error {
    /// true for network failures and cancellation
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Cancelled)
    }

    /// true if the call gave up while waiting out a secondary rate limit
    ///
    /// a plain 403 without `Retry-After` is a rejection, not a rate limit.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimitTimeout { .. })
            || matches!(
                self,
                Error::HttpStatus {
                    status: 403,
                    retry_after: Some(_),
                    ..
                }
            )
    }

    /// http status for terminal non-200 responses
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            Error::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// the full graphql error list, if the server reported any
    pub fn graphql_errors(&self) -> Option<&GraphQlErrors> {
        match self {
            Error::GraphQl(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<GraphQlErrors> for Error {
    fn from(errors: GraphQlErrors) -> Self {
        Error::GraphQl(errors)
    }
}

impl fmt::Display for GraphQlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
