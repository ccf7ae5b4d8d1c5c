//! Proxy data models

use crate::proxy::error::FailureCause;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Candidate proxy lines grouped by the protocol they are advertised under
pub type ProxyLists = BTreeMap<Protocol, Vec<String>>;

/// Proxy protocol enumeration
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Http,
    Https,
    Socks4,
    Socks5,
    Connect,
}

impl Protocol {
    /// Every supported protocol, in report order
    pub const ALL: [Protocol; 5] = [
        Protocol::Http,
        Protocol::Https,
        Protocol::Socks4,
        Protocol::Socks5,
        Protocol::Connect,
    ];

    /// Scheme used when handing this proxy to the HTTP client.
    ///
    /// HTTPS and CONNECT proxies are still spoken to over plain HTTP; the
    /// target URL decides whether the tunnelled leg is encrypted.
    pub fn proxy_scheme(&self) -> &'static str {
        match self {
            Protocol::Socks4 => "socks4",
            Protocol::Socks5 => "socks5",
            Protocol::Http | Protocol::Https | Protocol::Connect => "http",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Http => write!(f, "http"),
            Protocol::Https => write!(f, "https"),
            Protocol::Socks4 => write!(f, "socks4"),
            Protocol::Socks5 => write!(f, "socks5"),
            Protocol::Connect => write!(f, "connect"),
        }
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            "socks4" => Ok(Protocol::Socks4),
            "socks5" => Ok(Protocol::Socks5),
            "connect" => Ok(Protocol::Connect),
            _ => Err(format!(
                "Invalid protocol: {}. Use: http, https, socks4, socks5, connect",
                s
            )),
        }
    }
}

/// One candidate proxy server parsed from a `host:port:country` line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    /// Kept as text; it is only ever forwarded into the proxy URL
    pub port: String,
    pub country_code: String,
    pub protocol: Protocol,
}

impl Endpoint {
    pub fn new(host: String, port: String, country_code: String, protocol: Protocol) -> Self {
        Self {
            host,
            port,
            country_code,
            protocol,
        }
    }

    /// Get the proxy URL string handed to the HTTP client
    pub fn proxy_url(&self) -> String {
        format!("{}://{}:{}", self.protocol.proxy_scheme(), self.host, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.proxy_url())
    }
}

/// Raw outcome of a single probe, consumed by classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success { http_status: u16, body: String },
    Failure { cause: FailureCause },
}

impl ProbeOutcome {
    pub fn failure(cause: FailureCause) -> Self {
        ProbeOutcome::Failure { cause }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProbeStatus {
    Working,
    NotWorking,
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeStatus::Working => write!(f, "Working"),
            ProbeStatus::NotWorking => write!(f, "NotWorking"),
        }
    }
}

/// How much a proxy reveals about the caller, most revealing first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anonymity {
    Transparent,
    Anonymous,
    Elite,
}

impl fmt::Display for Anonymity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anonymity::Transparent => write!(f, "transparent"),
            Anonymity::Anonymous => write!(f, "anonymous"),
            Anonymity::Elite => write!(f, "elite"),
        }
    }
}

/// Proxy server software recognised from a response body.
///
/// `Unknown` is never produced by the classifier (no match leaves the field
/// empty) but is accepted when reading results back from JSON reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerSoftware {
    Squid,
    Mikrotik,
    Tinyproxy,
    Litespeed,
    Varnish,
    HAProxy,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ServerSoftware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerSoftware::Squid => write!(f, "squid"),
            ServerSoftware::Mikrotik => write!(f, "mikrotik"),
            ServerSoftware::Tinyproxy => write!(f, "tinyproxy"),
            ServerSoftware::Litespeed => write!(f, "litespeed"),
            ServerSoftware::Varnish => write!(f, "varnish"),
            ServerSoftware::HAProxy => write!(f, "haproxy"),
            ServerSoftware::Unknown => write!(f, "unknown"),
        }
    }
}

/// Result of probing one submitted proxy line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub protocol: Protocol,
    /// The line exactly as it was submitted
    pub endpoint_raw: String,
    pub status: ProbeStatus,
    pub observed_ip: Option<String>,
    pub anonymity: Option<Anonymity>,
    pub server_software: Option<ServerSoftware>,
    pub country_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureCause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
}

impl ProbeResult {
    pub fn working(
        endpoint: &Endpoint,
        endpoint_raw: String,
        observed_ip: Option<String>,
        anonymity: Anonymity,
        server_software: Option<ServerSoftware>,
        response_time_ms: u64,
    ) -> Self {
        Self {
            protocol: endpoint.protocol,
            endpoint_raw,
            status: ProbeStatus::Working,
            observed_ip,
            anonymity: Some(anonymity),
            server_software,
            country_code: endpoint.country_code.clone(),
            failure: None,
            response_time_ms: Some(response_time_ms),
        }
    }

    /// A probe that went out but did not come back with a 200.
    ///
    /// `fallback_ip` is the caller's own IP, reported in place of an
    /// observed one.
    pub fn not_working(
        endpoint: &Endpoint,
        endpoint_raw: String,
        fallback_ip: String,
        cause: FailureCause,
    ) -> Self {
        Self {
            protocol: endpoint.protocol,
            endpoint_raw,
            status: ProbeStatus::NotWorking,
            observed_ip: Some(fallback_ip),
            anonymity: None,
            server_software: None,
            country_code: endpoint.country_code.clone(),
            failure: Some(cause),
            response_time_ms: None,
        }
    }

    /// A line that never became an endpoint
    pub fn malformed(protocol: Protocol, endpoint_raw: String) -> Self {
        Self {
            protocol,
            endpoint_raw,
            status: ProbeStatus::NotWorking,
            observed_ip: None,
            anonymity: None,
            server_software: None,
            country_code: String::new(),
            failure: Some(FailureCause::Malformed),
            response_time_ms: None,
        }
    }

    pub fn is_working(&self) -> bool {
        matches!(self.status, ProbeStatus::Working)
    }
}
