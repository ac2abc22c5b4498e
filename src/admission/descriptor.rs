//! Typed request metadata consumed by the admission gate.
//!
//! The gate never sees the raw HTTP request. The HTTP layer extracts the
//! handful of headers the policies care about into a `RequestDescriptor`
//! at the boundary, so the gate stays a plain function over plain data.

use std::fmt;
use std::net::IpAddr;

/// Identity used to bucket rate-limit state for one caller.
///
/// Derived from the client socket address, unless a proxy supplied an
/// `X-Forwarded-For` header, in which case the first entry wins.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientKey(String);

impl ClientKey {
    pub fn derive(peer: IpAddr, forwarded_for: Option<&str>) -> Self {
        if let Some(raw) = forwarded_for {
            if let Some(first) = raw.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return Self(first.to_string());
                }
            }
        }
        Self(peer.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Observable metadata of one inbound request.
///
/// All header fields are optional; absence is meaningful to the gate
/// (an absent origin passes the CORS stage, an absent trusted header
/// fails the secret check).
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub origin: Option<String>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub trusted_header: Option<String>,
    pub client_key: ClientKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_key_from_socket_ip() {
        let key = ClientKey::derive("192.0.2.7".parse().unwrap(), None);
        assert_eq!(key.as_str(), "192.0.2.7");
    }

    #[test]
    fn test_client_key_prefers_first_forwarded_entry() {
        let key = ClientKey::derive(
            "127.0.0.1".parse().unwrap(),
            Some("203.0.113.9, 10.0.0.1, 10.0.0.2"),
        );
        assert_eq!(key.as_str(), "203.0.113.9");
    }

    #[test]
    fn test_client_key_ignores_empty_forwarded_header() {
        let key = ClientKey::derive("127.0.0.1".parse().unwrap(), Some("  "));
        assert_eq!(key.as_str(), "127.0.0.1");
    }
}
