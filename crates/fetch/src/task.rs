use tileworld_common::{WorldGrid, WorldRequest};
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::task::JoinHandle;

use crate::client::WorldSource;
use crate::error::FetchError;

/// Non-blocking view of a spawned fetch.
#[derive(Debug)]
pub enum FetchPoll {
    /// The request is still in flight.
    Pending,
    /// The request finished. Returned exactly once.
    Ready(Result<WorldGrid, FetchError>),
    /// No result will arrive: the fetch was cancelled or its result was already taken.
    Closed,
}

/// A world fetch running on a tokio runtime, owned by the frame loop.
///
/// Cancelling or dropping the handle aborts the in-flight request: the fetch
/// future is dropped at its next suspension point, which closes its socket.
pub struct FetchHandle {
    request: WorldRequest,
    cancel: Option<oneshot::Sender<()>>,
    result: Option<oneshot::Receiver<Result<WorldGrid, FetchError>>>,
    task: JoinHandle<()>,
}

impl FetchHandle {
    pub fn spawn<S: WorldSource>(
        runtime: &tokio::runtime::Handle,
        source: S,
        request: WorldRequest,
    ) -> Self {
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
        let (result_tx, result_rx) = oneshot::channel();

        let task = runtime.spawn(async move {
            tokio::select! {
                // Resolves on an explicit cancel and when the sender is dropped.
                _ = &mut cancel_rx => {
                    tracing::debug!(seed = request.seed, size = request.size, "world fetch cancelled");
                }
                result = source.fetch_world(request) => {
                    if result_tx.send(result).is_err() {
                        tracing::debug!("world fetch finished after its handle went away");
                    }
                }
            }
        });

        tracing::debug!(seed = request.seed, size = request.size, "world fetch spawned");
        Self {
            request,
            cancel: Some(cancel_tx),
            result: Some(result_rx),
            task,
        }
    }

    pub fn request(&self) -> WorldRequest {
        self.request
    }

    /// Check for a result without blocking.
    pub fn poll(&mut self) -> FetchPoll {
        let Some(rx) = self.result.as_mut() else {
            return FetchPoll::Closed;
        };
        match rx.try_recv() {
            Ok(result) => {
                self.result = None;
                self.cancel = None;
                FetchPoll::Ready(result)
            }
            Err(TryRecvError::Empty) => FetchPoll::Pending,
            Err(TryRecvError::Closed) => {
                self.result = None;
                self.cancel = None;
                FetchPoll::Closed
            }
        }
    }

    /// Cancel the fetch. Returns true if it was still in flight.
    pub fn cancel(&mut self) -> bool {
        let in_flight = self.result.is_some() && !self.task.is_finished();
        if let Some(tx) = self.cancel.take() {
            // The task may already be gone; nothing to signal then.
            let _ = tx.send(());
        }
        self.result = None;
        in_flight
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl std::fmt::Debug for FetchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchHandle")
            .field("request", &self.request)
            .field("pending", &self.result.is_some())
            .finish()
    }
}
