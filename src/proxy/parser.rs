//! Proxy parser module for turning `host:port:country` lines into endpoints

use crate::proxy::error::ParseError;
use crate::proxy::models::{Endpoint, Protocol};

/// Proxy parser for the colon-delimited list format
pub struct ProxyParser;

impl ProxyParser {
    /// Parse a single proxy line
    ///
    /// The line must split into exactly three fields on `:`. The port is not
    /// validated; it is forwarded verbatim into the proxy URL.
    pub fn parse_line(raw: &str, protocol: Protocol) -> Result<Endpoint, ParseError> {
        let parts: Vec<&str> = raw.split(':').collect();

        match parts.as_slice() {
            [host, port, country] => Ok(Endpoint::new(
                host.to_string(),
                port.to_string(),
                country.to_string(),
                protocol,
            )),
            _ => Err(ParseError {
                raw: raw.to_string(),
                fields: parts.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_host_port_country() {
        let endpoint = ProxyParser::parse_line("1.2.3.4:8080:US", Protocol::Http).unwrap();
        assert_eq!(endpoint.host, "1.2.3.4");
        assert_eq!(endpoint.port, "8080");
        assert_eq!(endpoint.country_code, "US");
        assert_eq!(endpoint.protocol, Protocol::Http);
    }

    #[test]
    fn test_parse_keeps_port_opaque() {
        let endpoint = ProxyParser::parse_line("proxy.example:99999:XX", Protocol::Socks5).unwrap();
        assert_eq!(endpoint.port, "99999");
        assert_eq!(endpoint.proxy_url(), "socks5://proxy.example:99999");
    }

    #[test]
    fn test_parse_trusts_country_verbatim() {
        let endpoint = ProxyParser::parse_line("1.2.3.4:80:not-a-country", Protocol::Connect).unwrap();
        assert_eq!(endpoint.country_code, "not-a-country");
    }

    #[test]
    fn test_parse_wrong_field_count() {
        let err = ProxyParser::parse_line("bad-line", Protocol::Http).unwrap_err();
        assert_eq!(err.raw, "bad-line");
        assert_eq!(err.fields, 1);

        let err = ProxyParser::parse_line("1.2.3.4:8080", Protocol::Http).unwrap_err();
        assert_eq!(err.fields, 2);

        let err = ProxyParser::parse_line("1.2.3.4:8080:user:pass", Protocol::Http).unwrap_err();
        assert_eq!(err.fields, 4);
    }

    #[test]
    fn test_parse_error_message_names_line() {
        let err = ProxyParser::parse_line("a:b", Protocol::Https).unwrap_err();
        assert!(err.to_string().contains("`a:b`"));
    }
}
