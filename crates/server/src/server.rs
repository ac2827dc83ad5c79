use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use tileworld_worldgen::NoiseParams;
use tokio::net::TcpListener;

use crate::routes::{self, AppState};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to signal server shutdown")]
    Shutdown,
    #[error("could not join server task: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Generation service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Largest accepted `size` parameter.
    pub max_size: u32,
    pub noise: NoiseParams,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_size: 512,
            noise: NoiseParams::default(),
        }
    }
}

/// A bound, not yet running, generation service.
pub struct WorldServer {
    listener: TcpListener,
    config: ServerConfig,
}

/// Control handle for a running service.
pub struct WorldServerHandle {
    address: SocketAddr,
    serve_task: tokio::task::JoinHandle<std::io::Result<()>>,
    shutdown_sender: tokio::sync::oneshot::Sender<()>,
    served: Arc<AtomicUsize>,
}

impl WorldServer {
    pub async fn bind_any_local(config: ServerConfig) -> Result<Self, ServerError> {
        Self::bind("127.0.0.1:0", config).await
    }

    pub async fn bind<A: tokio::net::ToSocketAddrs>(
        addr: A,
        config: ServerConfig,
    ) -> Result<Self, ServerError> {
        Ok(Self {
            listener: TcpListener::bind(addr).await?,
            config,
        })
    }

    pub fn local_address(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Start serving on the current runtime.
    pub fn run(self) -> Result<WorldServerHandle, ServerError> {
        let address = self.listener.local_addr()?;
        let served = Arc::new(AtomicUsize::new(0));
        let router = routes::build_router(AppState::new(self.config, served.clone()));
        let listener = self.listener;

        let (shutdown_sender, shutdown_receiver) = tokio::sync::oneshot::channel::<()>();

        let serve_task = tokio::spawn(async move {
            tracing::info!(%address, "world service listening");
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_receiver.await;
                    tracing::debug!("received world service shutdown signal");
                })
                .await
        });

        Ok(WorldServerHandle {
            address,
            serve_task,
            shutdown_sender,
            served,
        })
    }
}

impl WorldServerHandle {
    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Number of responses sent so far.
    pub fn requests_served(&self) -> usize {
        self.served.load(Ordering::SeqCst)
    }

    /// Stop accepting connections and wait for in-flight requests to finish.
    pub async fn shutdown(self) -> Result<(), ServerError> {
        tracing::debug!("shutting down world service");
        self.shutdown_sender
            .send(())
            .map_err(|_| ServerError::Shutdown)?;
        self.serve_task.await??;
        tracing::info!("world service stopped");
        Ok(())
    }
}
