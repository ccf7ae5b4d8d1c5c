//! Error types for parsing, probing and checker configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A proxy line that is not `host:port:country`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed proxy line `{raw}`: expected host:port:country, found {fields} field(s)")]
pub struct ParseError {
    pub raw: String,
    pub fields: usize,
}

/// Why a proxy ended up NotWorking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum FailureCause {
    #[error("malformed proxy line")]
    Malformed,

    #[error("probe timed out")]
    Timeout,

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("could not build client: {0}")]
    Client(String),

    #[error("request failed: {0}")]
    Request(String),
}

/// Checker configuration that cannot be run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("probe timeout must be greater than zero")]
    ZeroTimeout,

    #[error("own IP must not be empty")]
    MissingOwnIp,

    #[error("invalid target URL `{url}`: {reason}")]
    InvalidTargetUrl { url: String, reason: String },
}
