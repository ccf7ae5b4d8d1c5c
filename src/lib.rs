//! Proxy Sweep - Concurrent Proxy Checker
//!
//! Probes lists of HTTP, HTTPS, SOCKS4, SOCKS5 and CONNECT proxies through a
//! bounded worker budget and classifies each working proxy by the IP it
//! exposes, its anonymity level and the server software it runs.

pub mod proxy;
pub mod report;
pub mod tui;

pub use proxy::*;

/// Application result type
pub type Result<T> = anyhow::Result<T>;
