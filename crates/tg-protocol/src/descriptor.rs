//! Tunnel descriptor
//!
//! A [`TunnelDescriptor`] is the canonical record of one live tunnel. The
//! public URL reported by the daemon is the source of truth; `proto`,
//! `domain` and `port` are derived from it when the descriptor is built and
//! are carried alongside it only so clients do not have to re-parse.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ProtocolError;

/// Components extracted from a tunnel's public URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicUrl {
    /// Lowercase scheme (e.g. "tcp", "https")
    pub proto: String,
    /// Hostname
    pub domain: String,
    /// Explicit port, if the URL carries one
    pub port: Option<String>,
}

/// Split a public URL into scheme, host and port.
///
/// `port` is whatever the URL spells out, including a port equal to the
/// scheme's default (`https://host:443` reports `443`).
pub fn parse_public_url(raw: &str) -> Result<PublicUrl, ProtocolError> {
    let url = Url::parse(raw).map_err(|source| ProtocolError::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;

    let domain = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| ProtocolError::MissingHost(raw.to_string()))?
        .to_string();

    Ok(PublicUrl {
        proto: url.scheme().to_string(),
        domain,
        port: url
            .port()
            .map(|p| p.to_string())
            .or_else(|| explicit_default_port(&url, raw)),
    })
}

/// The parser drops a port equal to the scheme default; recover it from
/// the authority as written.
fn explicit_default_port(url: &Url, raw: &str) -> Option<String> {
    let default = url.port_or_known_default()?;

    let rest = raw.split_once("://")?.1;
    let authority = rest
        .split(|c: char| matches!(c, '/' | '?' | '#'))
        .next()
        .unwrap_or(rest);
    let host_port = authority.rsplit('@').next().unwrap_or(authority);
    let after_host = match host_port.rfind(']') {
        Some(end) => &host_port[end + 1..],
        None => host_port,
    };

    let written = after_host.rsplit_once(':')?.1;
    match written.parse::<u16>() {
        Ok(port) if port == default => Some(port.to_string()),
        _ => None,
    }
}

/// Connection details for one live tunnel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunnelDescriptor {
    /// Tunnel name, as known to the daemon
    #[serde(default)]
    pub name: String,
    /// Daemon-assigned identifier
    pub id: String,
    /// Scheme of the public URL
    pub proto: String,
    /// Host of the public URL
    pub domain: String,
    /// Port of the public URL, if any
    #[serde(default)]
    pub port: Option<String>,
    /// Local address the daemon forwards to
    pub addr: String,
    /// Full public URL
    pub url: String,
}

impl TunnelDescriptor {
    /// Build a descriptor, deriving `proto`, `domain` and `port` from `url`
    pub fn from_public_url(
        name: impl Into<String>,
        id: impl Into<String>,
        addr: impl Into<String>,
        url: impl Into<String>,
    ) -> Result<Self, ProtocolError> {
        let url = url.into();
        let parsed = parse_public_url(&url)?;

        Ok(Self {
            name: name.into(),
            id: id.into(),
            proto: parsed.proto,
            domain: parsed.domain,
            port: parsed.port,
            addr: addr.into(),
            url,
        })
    }

    /// Whether the derived fields still agree with `url`
    pub fn is_consistent(&self) -> bool {
        match parse_public_url(&self.url) {
            Ok(parsed) => {
                parsed.proto == self.proto
                    && parsed.domain == self.domain
                    && parsed.port == self.port
            }
            Err(_) => false,
        }
    }

    /// Port as a string, empty when the URL has none
    pub fn port_str(&self) -> &str {
        self.port.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_with_port() {
        let parsed = parse_public_url("tcp://0.tcp.example.com:12345").unwrap();
        assert_eq!(parsed.proto, "tcp");
        assert_eq!(parsed.domain, "0.tcp.example.com");
        assert_eq!(parsed.port.as_deref(), Some("12345"));
    }

    #[test]
    fn test_parse_url_without_port() {
        let parsed = parse_public_url("https://a.b.c").unwrap();
        assert_eq!(parsed.proto, "https");
        assert_eq!(parsed.domain, "a.b.c");
        assert!(parsed.port.is_none());
    }

    #[test]
    fn test_parse_url_components_match_input() {
        for proto in ["tcp", "http", "https", "tls"] {
            for (domain, port) in [("a.b.c", Some("1234")), ("x-y.ngrok.io", None)] {
                let raw = match port {
                    Some(p) => format!("{}://{}:{}", proto, domain, p),
                    None => format!("{}://{}", proto, domain),
                };
                let parsed = parse_public_url(&raw).unwrap();
                assert_eq!(parsed.proto, proto, "{}", raw);
                assert_eq!(parsed.domain, domain, "{}", raw);
                assert_eq!(parsed.port.as_deref(), port, "{}", raw);
            }
        }
    }

    #[test]
    fn test_parse_url_keeps_explicit_default_port() {
        for (raw, port) in [
            ("https://a.b.c:443", "443"),
            ("http://a.b.c:80", "80"),
            ("https://a.b.c:443/path?q=1", "443"),
            ("http://user:pw@a.b.c:80", "80"),
        ] {
            let parsed = parse_public_url(raw).unwrap();
            assert_eq!(parsed.domain, "a.b.c", "{}", raw);
            assert_eq!(parsed.port.as_deref(), Some(port), "{}", raw);
        }

        assert!(parse_public_url("http://user:pw@a.b.c").unwrap().port.is_none());
        assert!(parse_public_url("https://a.b.c/x:443").unwrap().port.is_none());
    }

    #[test]
    fn test_descriptor_with_default_port_is_consistent() {
        let d = TunnelDescriptor::from_public_url("web", "id", "localhost:8080", "https://a.b.c:443")
            .unwrap();
        assert_eq!(d.port_str(), "443");
        assert!(d.is_consistent());
    }

    #[test]
    fn test_parse_url_rejects_garbage() {
        assert!(matches!(
            parse_public_url("not a url"),
            Err(ProtocolError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_descriptor_from_public_url() {
        let d = TunnelDescriptor::from_public_url(
            "ssh",
            "abc123",
            "localhost:22",
            "tcp://0.tcp.example.com:12345",
        )
        .unwrap();

        assert_eq!(d.name, "ssh");
        assert_eq!(d.id, "abc123");
        assert_eq!(d.proto, "tcp");
        assert_eq!(d.domain, "0.tcp.example.com");
        assert_eq!(d.port.as_deref(), Some("12345"));
        assert_eq!(d.addr, "localhost:22");
        assert_eq!(d.url, "tcp://0.tcp.example.com:12345");
        assert!(d.is_consistent());
    }

    #[test]
    fn test_descriptor_detects_divergence() {
        let mut d = TunnelDescriptor::from_public_url(
            "web",
            "id",
            "localhost:8888",
            "https://nb.ngrok.app",
        )
        .unwrap();
        assert!(d.is_consistent());
        assert_eq!(d.port_str(), "");

        d.port = Some("9999".to_string());
        assert!(!d.is_consistent());
    }
}
