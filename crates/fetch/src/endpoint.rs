use std::fmt;

/// Errors from parsing a service base URL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    #[error("unsupported scheme in {0:?}, only http:// is supported")]
    UnsupportedScheme(String),
    #[error("missing host in {0:?}")]
    MissingHost(String),
    #[error("invalid port in {0:?}")]
    InvalidPort(String),
}

/// A parsed `http://host[:port][/prefix]` base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
    /// Path prefix without a trailing slash; empty for the root.
    prefix: String,
}

impl Endpoint {
    pub fn parse(base_url: &str) -> Result<Self, EndpointError> {
        let trimmed = base_url.trim();
        let rest = trimmed
            .strip_prefix("http://")
            .ok_or_else(|| EndpointError::UnsupportedScheme(trimmed.to_string()))?;

        let (authority, path) = match rest.find('/') {
            Some(i) => rest.split_at(i),
            None => (rest, ""),
        };

        let (host, port) = if let Some(bracketed) = authority.strip_prefix('[') {
            // IPv6 literal: [::1]:5000
            let end = bracketed
                .find(']')
                .ok_or_else(|| EndpointError::MissingHost(trimmed.to_string()))?;
            let port = bracketed[end + 1..].strip_prefix(':');
            (&bracketed[..end], port)
        } else {
            match authority.rsplit_once(':') {
                Some((h, p)) => (h, Some(p)),
                None => (authority, None),
            }
        };

        if host.is_empty() {
            return Err(EndpointError::MissingHost(trimmed.to_string()));
        }
        let port = match port {
            Some(p) => p
                .parse::<u16>()
                .map_err(|_| EndpointError::InvalidPort(trimmed.to_string()))?,
            None => 80,
        };

        Ok(Self {
            host: host.to_string(),
            port,
            prefix: path.trim_end_matches('/').to_string(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Value for the `Host` header.
    pub fn authority(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Request target for a route below the prefix, e.g. `/api/generate_world?seed=1`.
    pub fn target(&self, route: &str, query: &str) -> String {
        let route = route.trim_start_matches('/');
        if query.is_empty() {
            format!("{}/{}", self.prefix, route)
        } else {
            format!("{}/{}?{}", self.prefix, route, query)
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "http://{}{}", self.authority(), self.prefix)
    }
}
