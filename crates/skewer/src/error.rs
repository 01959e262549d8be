//! Error types surfaced by the client.
//!
//! Two classes exist. [`ConfigError`] is the only fatal class and is raised before
//! any request is dispatched. [`TransportError`] describes a single failed call; it
//! never escapes the completion handler that observes it.

use std::time::Duration;
use thiserror::Error;

/// Rejected run configuration. Detected before the tally is built.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("num_tests should not be greater than 10k (requested {requested}, max {max})")]
    TooManyTests { requested: usize, max: usize },

    #[error("please specify server host:port")]
    MissingServer,

    #[error("concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("unknown model `{0}`, expected one of: bert, text-cnn")]
    UnknownModel(String),
}

/// Failure of one inference call.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The call did not resolve within its deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The server answered with a non-OK gRPC status.
    #[error("rpc failed: {0}")]
    Status(#[from] tonic::Status),

    /// The channel could not be established or was not ready.
    #[error("connection failed: {0}")]
    Connect(String),
}
