use tileworld_common::GridError;

use crate::endpoint::EndpointError;

/// Errors from fetching a world.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] EndpointError),
    /// The service answered with a non-2xx status.
    #[error("world service returned HTTP {status}")]
    Network { status: u16 },
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
    /// The HTTP exchange failed: bad framing, oversized head, connection dropped mid-body.
    #[error("HTTP exchange failed: {0}")]
    Http(#[from] hyper::Error),
    #[error("malformed HTTP response: {0}")]
    Protocol(String),
    #[error("malformed world data: {0}")]
    MalformedWorldData(#[from] GridError),
}

impl FetchError {
    /// True for failures of the request itself rather than of its payload.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Transport(_) | Self::Http(_) | Self::Protocol(_)
        )
    }

    /// HTTP status for non-2xx answers.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Network { status } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_grouping() {
        assert!(FetchError::Network { status: 500 }.is_network());
        assert!(FetchError::Protocol("eof".into()).is_network());
        assert!(
            FetchError::Transport(std::io::Error::from(std::io::ErrorKind::ConnectionRefused))
                .is_network()
        );
        assert!(!FetchError::MalformedWorldData(GridError::NonPositiveSize(0)).is_network());
    }

    #[test]
    fn status_only_for_http_failures() {
        assert_eq!(FetchError::Network { status: 404 }.status(), Some(404));
        assert_eq!(FetchError::Protocol("x".into()).status(), None);
    }
}
