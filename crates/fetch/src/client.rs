use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tileworld_common::{WorldGrid, WorldRequest};
use tracing::Instrument;

use crate::endpoint::Endpoint;
use crate::error::FetchError;
use crate::http;

/// Route on the generation service that answers world requests.
pub const GENERATE_WORLD_ROUTE: &str = "generate_world";

/// World service client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the generation service, e.g. `http://127.0.0.1:5000`.
    pub base_url: String,
    /// Give up on a request after this many milliseconds. `None` waits forever.
    pub timeout_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".into(),
            timeout_ms: None,
        }
    }
}

/// Anything that can produce a validated world for a request.
///
/// Sessions spawn fetches against this seam; `WorldClient` is the HTTP
/// implementation.
pub trait WorldSource: Send + Sync + 'static {
    fn fetch_world(
        &self,
        request: WorldRequest,
    ) -> impl Future<Output = Result<WorldGrid, FetchError>> + Send;
}

/// HTTP client for the world-generation service.
#[derive(Debug, Clone)]
pub struct WorldClient {
    endpoint: Endpoint,
    timeout: Option<Duration>,
}

impl WorldClient {
    pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
        Ok(Self {
            endpoint: Endpoint::parse(&config.base_url)?,
            timeout: config.timeout_ms.map(Duration::from_millis),
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Issue one `GET /generate_world` and validate the body.
    pub async fn fetch(&self, request: WorldRequest) -> Result<WorldGrid, FetchError> {
        let target = self.endpoint.target(GENERATE_WORLD_ROUTE, &request.query());
        tracing::debug!(endpoint = %self.endpoint, %target, "requesting world");

        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, http::get(&self.endpoint, &target))
                .await
                .map_err(|_| {
                    FetchError::Transport(std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        format!("no response within {limit:?}"),
                    ))
                })??,
            None => http::get(&self.endpoint, &target).await?,
        };

        if !response.status.is_success() {
            return Err(FetchError::Network {
                status: response.status.as_u16(),
            });
        }

        let grid = WorldGrid::from_json(&response.body)?;
        if grid.size() != request.size as usize {
            tracing::warn!(
                requested = request.size,
                received = grid.size(),
                "world service answered with a different size"
            );
        }
        tracing::info!(seed = request.seed, size = grid.size(), "world fetched");
        Ok(grid)
    }
}

impl WorldSource for WorldClient {
    fn fetch_world(
        &self,
        request: WorldRequest,
    ) -> impl Future<Output = Result<WorldGrid, FetchError>> + Send {
        self.fetch(request).instrument(tracing::debug_span!(
            "fetch_world",
            seed = request.seed,
            size = request.size
        ))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Accept one connection, read the request head, answer with `response`.
    pub(crate) async fn serve_once(response: String) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let mut read = 0;
            while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf[read..]).await.unwrap();
                if n == 0 {
                    break;
                }
                read += n;
            }
            // The client may hang up early on a response it rejects.
            if socket.write_all(response.as_bytes()).await.is_ok() {
                socket.shutdown().await.ok();
            }
        });
        addr
    }

    pub(crate) fn json_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    fn client_for(addr: SocketAddr) -> WorldClient {
        WorldClient::new(&ClientConfig {
            base_url: format!("http://{addr}"),
            timeout_ms: Some(2_000),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn fetches_valid_world() {
        let addr = serve_once(json_response("200 OK", r#"{"size":2,"tiles":[[0,1],[1,2]]}"#)).await;
        let grid = client_for(addr).fetch(WorldRequest::new(1, 2)).await.unwrap();
        assert_eq!(grid.size(), 2);
        assert_eq!(grid.get(1, 1), Some(2));
    }

    #[tokio::test]
    async fn non_success_status_is_network_error() {
        let addr = serve_once(json_response("503 Service Unavailable", "{}")).await;
        let err = client_for(addr).fetch(WorldRequest::new(1, 2)).await.unwrap_err();
        assert!(matches!(err, FetchError::Network { status: 503 }));
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn bad_shape_is_malformed() {
        let addr = serve_once(json_response("200 OK", r#"{"size":3,"tiles":[[0,1,2]]}"#)).await;
        let err = client_for(addr).fetch(WorldRequest::new(1, 3)).await.unwrap_err();
        assert!(matches!(err, FetchError::MalformedWorldData(_)));
        assert!(!err.is_network());
    }

    #[tokio::test]
    async fn refused_connection_is_transport_error() {
        // Bind then drop to get a port with nothing listening.
        let addr = {
            let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
            l.local_addr().unwrap()
        };
        let err = client_for(addr).fetch(WorldRequest::new(1, 2)).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _keep = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });
        let client = WorldClient::new(&ClientConfig {
            base_url: format!("http://{addr}"),
            timeout_ms: Some(50),
        })
        .unwrap();
        let err = client.fetch(WorldRequest::new(1, 2)).await.unwrap_err();
        match err {
            FetchError::Transport(e) => assert_eq!(e.kind(), std::io::ErrorKind::TimedOut),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let cfg: ClientConfig = serde_json::from_str(r#"{"timeout_ms":250}"#).unwrap();
        assert_eq!(cfg.base_url, "http://127.0.0.1:5000");
        assert_eq!(cfg.timeout_ms, Some(250));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = WorldClient::new(&ClientConfig {
            base_url: "ftp://nope".into(),
            timeout_ms: None,
        })
        .unwrap_err();
        assert!(matches!(err, FetchError::InvalidEndpoint(_)));
    }
}
