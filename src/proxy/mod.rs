//! Proxy module for parsing, probing and classifying proxies
//!
//! This module provides functionality for:
//! - Parsing `host:port:country` proxy lines
//! - Probing each proxy with a single bounded request
//! - Classifying responses by anonymity level and server software
//! - Checking whole proxy lists under a shared concurrency budget

pub mod checker;
pub mod classifier;
pub mod error;
pub mod loader;
pub mod models;
pub mod parser;
pub mod prober;

pub use checker::{CheckerConfig, ProxyChecker};
pub use classifier::{classify, Classification};
pub use error::{ConfigError, FailureCause, ParseError};
pub use loader::{load_proxy_lists, read_lines};
pub use models::{
    Anonymity, Endpoint, ProbeOutcome, ProbeResult, ProbeStatus, Protocol, ProxyLists,
    ServerSoftware,
};
pub use parser::ProxyParser;
pub use prober::{HttpProber, Prober};
