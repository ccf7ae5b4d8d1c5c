//! Response classification: observed IP, anonymity level and server software

use crate::proxy::models::{Anonymity, ServerSoftware};
use once_cell::sync::Lazy;
use regex::Regex;

/// Whole-string dotted-quad IPv4 address
static IPV4_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}$").expect("Invalid IPv4 regex")
});

/// `REMOTE_ADDR = <value>` line as printed by proxy judge pages
static REMOTE_ADDR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*REMOTE_ADDR = (.*)$").expect("Invalid REMOTE_ADDR regex")
});

/// Markers a proxy leaves when it announces itself, matched case-sensitively
const ANONYMOUS_SIGNATURES: [&str; 2] = ["HTTP_VIA", "PROXY_REMOTE_ADDR"];

/// Server fingerprints in priority order, matched case-insensitively
const SERVER_SIGNATURES: [(&str, ServerSoftware); 6] = [
    ("squid", ServerSoftware::Squid),
    ("mikrotik", ServerSoftware::Mikrotik),
    ("tinyproxy", ServerSoftware::Tinyproxy),
    ("litespeed", ServerSoftware::Litespeed),
    ("varnish", ServerSoftware::Varnish),
    ("haproxy", ServerSoftware::HAProxy),
];

/// Everything learned from a successful probe's body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub observed_ip: Option<String>,
    pub anonymity: Anonymity,
    pub server_software: Option<ServerSoftware>,
}

/// Classify a response body returned through a proxy
pub fn classify(body: &str, known_own_ip: &str) -> Classification {
    Classification {
        observed_ip: observed_ip(body),
        anonymity: anonymity(body, known_own_ip),
        server_software: server_software(body),
    }
}

/// The IP the target saw, if the body reports one
pub fn observed_ip(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if IPV4_REGEX.is_match(trimmed) {
        return Some(trimmed.to_string());
    }

    let value = REMOTE_ADDR_REGEX.captures(trimmed)?.get(1)?.as_str().trim();
    IPV4_REGEX.is_match(value).then(|| value.to_string())
}

/// A leaked own IP wins over any proxy signature
pub fn anonymity(body: &str, known_own_ip: &str) -> Anonymity {
    if !known_own_ip.is_empty() && body.contains(known_own_ip) {
        Anonymity::Transparent
    } else if ANONYMOUS_SIGNATURES.iter().any(|sig| body.contains(sig)) {
        Anonymity::Anonymous
    } else {
        Anonymity::Elite
    }
}

pub fn server_software(body: &str) -> Option<ServerSoftware> {
    let lowered = body.to_lowercase();
    SERVER_SIGNATURES
        .iter()
        .find(|(pattern, _)| lowered.contains(pattern))
        .map(|(_, software)| *software)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_ip_body_is_elite() {
        let result = classify(" 203.0.113.9 \n", "127.0.0.1");
        assert_eq!(result.observed_ip.as_deref(), Some("203.0.113.9"));
        assert_eq!(result.anonymity, Anonymity::Elite);
        assert_eq!(result.server_software, None);
    }

    #[test]
    fn test_transparency_takes_precedence_over_via() {
        let result = classify("REMOTE_ADDR = 127.0.0.1\nHTTP_VIA: proxy", "127.0.0.1");
        assert_eq!(result.observed_ip.as_deref(), Some("127.0.0.1"));
        assert_eq!(result.anonymity, Anonymity::Transparent);
    }

    #[test]
    fn test_server_fingerprint_without_leak() {
        let result = classify("X-Powered-By: Squid/4.10", "10.0.0.1");
        assert_eq!(result.server_software, Some(ServerSoftware::Squid));
        assert_eq!(result.anonymity, Anonymity::Elite);
        assert_eq!(result.observed_ip, None);
    }

    #[test]
    fn test_anonymous_signatures() {
        assert_eq!(
            anonymity("HTTP_VIA = 1.1 cache01", "10.0.0.1"),
            Anonymity::Anonymous
        );
        assert_eq!(
            anonymity("PROXY_REMOTE_ADDR = 198.51.100.7", "10.0.0.1"),
            Anonymity::Anonymous
        );
        // signature match is case-sensitive
        assert_eq!(anonymity("http_via = 1.1 cache01", "10.0.0.1"), Anonymity::Elite);
    }

    #[test]
    fn test_remote_addr_value_must_be_ipv4() {
        assert_eq!(observed_ip("REMOTE_ADDR = unknown"), None);
        assert_eq!(observed_ip("REMOTE_ADDR = 2001:db8::1"), None);
        assert_eq!(
            observed_ip("HTTP_HOST = localhost\nREMOTE_ADDR = 198.51.100.7\r\nHTTP_ACCEPT = */*"),
            Some("198.51.100.7".to_string())
        );
    }

    #[test]
    fn test_remote_addr_line_is_not_proxy_remote_addr() {
        assert_eq!(observed_ip("PROXY_REMOTE_ADDR = 198.51.100.7"), None);
    }

    #[test]
    fn test_body_with_ip_prefix_is_not_an_ip() {
        assert_eq!(observed_ip("1.2.3.4 is your address"), None);
        assert_eq!(observed_ip("<html>nothing here</html>"), None);
    }

    #[test]
    fn test_server_priority_order() {
        assert_eq!(
            server_software("Via: 1.1 varnish, 1.1 squid"),
            Some(ServerSoftware::Squid)
        );
        assert_eq!(
            server_software("Server: HAProxy and LiteSpeed"),
            Some(ServerSoftware::Litespeed)
        );
        assert_eq!(server_software("MikroTik HttpProxy"), Some(ServerSoftware::Mikrotik));
        assert_eq!(server_software("tinyproxy/1.11"), Some(ServerSoftware::Tinyproxy));
        assert_eq!(server_software("nginx"), None);
    }
}
