use tileworld_common::WorldRequest;
use tileworld_fetch::{FetchHandle, FetchPoll, WorldSource};
use tileworld_input::DirectionalInput;

use crate::config::SceneConfig;
use crate::scene::{Scene, SceneError, ScenePhase};

/// Outcome of a session's world fetch, reported once by [`GameSession::poll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Ready { size: usize },
    Failed(String),
}

/// One mount-to-unmount scope: a scene, the fetch feeding it and a host render
/// resource `R`.
///
/// The fetch is bound to the session: unmounting (or dropping) the session
/// cancels it and releases `R` exactly once.
pub struct GameSession<R> {
    scene: Scene,
    fetch: Option<FetchHandle>,
    resource: Option<R>,
    mounted: bool,
}

impl<R> GameSession<R> {
    /// Create the scene, start its single fetch on `runtime` and take
    /// ownership of the render resource.
    pub fn mount<S: WorldSource>(
        config: SceneConfig,
        runtime: &tokio::runtime::Handle,
        source: S,
        request: WorldRequest,
        resource: R,
    ) -> Result<Self, SceneError> {
        let mut scene = Scene::new(config);
        scene.begin_loading(request)?;
        let fetch = FetchHandle::spawn(runtime, source, request);
        tracing::info!(seed = request.seed, size = request.size, "session mounted");
        Ok(Self {
            scene,
            fetch: Some(fetch),
            resource: Some(resource),
            mounted: true,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn resource(&self) -> Option<&R> {
        self.resource.as_ref()
    }

    pub fn resource_mut(&mut self) -> Option<&mut R> {
        self.resource.as_mut()
    }

    /// Scene and resource together, for drawing.
    pub fn parts_mut(&mut self) -> (&Scene, Option<&mut R>) {
        (&self.scene, self.resource.as_mut())
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Move a finished fetch into the scene. Returns an event the first time
    /// the outcome is known and `None` otherwise.
    pub fn poll(&mut self) -> Option<SessionEvent> {
        let fetch = self.fetch.as_mut()?;
        let outcome = match fetch.poll() {
            FetchPoll::Pending => return None,
            FetchPoll::Ready(result) => self.scene.complete_loading(result),
            FetchPoll::Closed => self.scene.fail("world fetch ended without a result"),
        };
        self.fetch = None;

        if let Err(e) = outcome {
            tracing::warn!("dropping fetch outcome: {e}");
            return None;
        }
        match self.scene.phase() {
            ScenePhase::Ready => Some(SessionEvent::Ready {
                size: self.scene.tilemap().map_or(0, |t| t.size()),
            }),
            ScenePhase::Failed(reason) => Some(SessionEvent::Failed(reason.clone())),
            _ => None,
        }
    }

    /// Per-frame update; a no-op until the scene is ready.
    pub fn frame(&mut self, input: &DirectionalInput, dt: f32) {
        self.scene.update(input, dt);
    }

    /// Cancel the fetch, destroy the scene and release the render resource.
    /// Returns false if the session was already unmounted.
    pub fn unmount(&mut self) -> bool {
        if !self.mounted {
            return false;
        }
        self.mounted = false;
        if let Some(mut fetch) = self.fetch.take() {
            if fetch.cancel() {
                tracing::debug!("cancelled in-flight world fetch");
            }
        }
        self.scene.destroy();
        drop(self.resource.take());
        tracing::info!("session unmounted");
        true
    }
}

impl<R> Drop for GameSession<R> {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl<R> std::fmt::Debug for GameSession<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("phase", self.scene.phase())
            .field("fetch", &self.fetch)
            .field("has_resource", &self.resource.is_some())
            .finish()
    }
}
