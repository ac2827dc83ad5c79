use std::fmt;

use glam::Vec2;
use tileworld_common::{WorldGrid, WorldRequest};
use tileworld_fetch::FetchError;
use tileworld_input::DirectionalInput;

use crate::camera::FollowCamera;
use crate::config::SceneConfig;
use crate::player::Player;
use crate::tilemap::{Bounds, Tilemap};

/// Lifecycle of one scene.
///
/// `Uninitialized → Loading → Ready → Destroyed`, or `Loading → Failed` when
/// the world could not be obtained. `Destroyed` is reachable from every phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenePhase {
    Uninitialized,
    Loading,
    Ready,
    Failed(String),
    Destroyed,
}

impl ScenePhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Failed(_) => "failed",
            Self::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for ScenePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(reason) => write!(f, "failed: {reason}"),
            other => f.write_str(other.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("cannot {action} while the scene is {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: &'static str,
    },
}

/// Everything the frame loop mutates: phase, tilemap, player, camera.
///
/// Owned by a single writer and passed by `&mut` to setup and per-frame code.
#[derive(Debug, Clone)]
pub struct Scene {
    config: SceneConfig,
    phase: ScenePhase,
    request: Option<WorldRequest>,
    tilemap: Option<Tilemap>,
    player: Option<Player>,
    camera: Option<FollowCamera>,
    frames: u64,
}

impl Scene {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            phase: ScenePhase::Uninitialized,
            request: None,
            tilemap: None,
            player: None,
            camera: None,
            frames: 0,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn phase(&self) -> &ScenePhase {
        &self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == ScenePhase::Ready
    }

    /// The world this scene asked for, once loading began.
    pub fn request(&self) -> Option<WorldRequest> {
        self.request
    }

    pub fn tilemap(&self) -> Option<&Tilemap> {
        self.tilemap.as_ref()
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn camera(&self) -> Option<&FollowCamera> {
        self.camera.as_ref()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.tilemap.as_ref().map(Tilemap::bounds)
    }

    /// Frames updated while ready.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn transition_error(&self, action: &'static str) -> SceneError {
        SceneError::InvalidTransition {
            action,
            phase: self.phase.name(),
        }
    }

    pub fn begin_loading(&mut self, request: WorldRequest) -> Result<(), SceneError> {
        if self.phase != ScenePhase::Uninitialized {
            return Err(self.transition_error("begin loading"));
        }
        tracing::info!(seed = request.seed, size = request.size, "scene loading");
        self.request = Some(request);
        self.phase = ScenePhase::Loading;
        Ok(())
    }

    /// Feed the fetch outcome into a loading scene.
    ///
    /// A result arriving after `destroy` is dropped without error.
    pub fn complete_loading(
        &mut self,
        result: Result<WorldGrid, FetchError>,
    ) -> Result<(), SceneError> {
        match self.phase {
            ScenePhase::Loading => {}
            ScenePhase::Destroyed => {
                tracing::debug!("world arrived after the scene was destroyed; ignoring");
                return Ok(());
            }
            _ => return Err(self.transition_error("complete loading")),
        }

        match result {
            Ok(grid) => {
                self.build(grid);
                Ok(())
            }
            Err(e) => self.fail(e.to_string()),
        }
    }

    /// Move a loading scene to `Failed`. No tilemap or player is created.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), SceneError> {
        if self.phase != ScenePhase::Loading {
            return Err(self.transition_error("fail"));
        }
        let reason = reason.into();
        tracing::error!(%reason, "scene failed to load");
        self.phase = ScenePhase::Failed(reason);
        Ok(())
    }

    fn build(&mut self, grid: WorldGrid) {
        let tilemap = Tilemap::new(grid, self.config.tile_edge);
        let bounds = tilemap.bounds();
        let player = Player::spawn(bounds.center(), self.config.tile_edge);

        let mut camera = FollowCamera::new(self.config.viewport, self.config.camera_lerp, bounds);
        camera.center_on(player.position);

        tracing::info!(
            size = tilemap.size(),
            tileset = tilemap.tileset(),
            width = bounds.size().x,
            height = bounds.size().y,
            "scene ready"
        );
        self.tilemap = Some(tilemap);
        self.player = Some(player);
        self.camera = Some(camera);
        self.phase = ScenePhase::Ready;
    }

    /// Resize the visible area; the camera is re-clamped.
    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.config.viewport = viewport;
        if let Some(camera) = self.camera.as_mut() {
            camera.set_viewport(viewport);
        }
    }

    /// Per-frame step. Does nothing unless a player exists.
    pub fn update(&mut self, input: &DirectionalInput, dt: f32) {
        let (Some(player), Some(camera)) = (self.player.as_mut(), self.camera.as_mut()) else {
            return;
        };
        let bounds = camera.bounds;
        player.step(input, self.config.player_speed, dt, &bounds);
        camera.follow(player.position);
        self.frames += 1;
        tracing::trace!(
            x = player.position.x,
            y = player.position.y,
            vx = player.velocity.x,
            vy = player.velocity.y,
            "frame"
        );
    }

    /// Drop all scene state. Returns true only on the first call.
    pub fn destroy(&mut self) -> bool {
        if self.phase == ScenePhase::Destroyed {
            return false;
        }
        tracing::info!(from = self.phase.name(), "scene destroyed");
        self.tilemap = None;
        self.player = None;
        self.camera = None;
        self.phase = ScenePhase::Destroyed;
        true
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tileworld_common::GridError;
    use tileworld_input::Direction;

    fn grid(size: usize) -> WorldGrid {
        WorldGrid::new(size, vec![vec![1; size]; size]).unwrap()
    }

    fn loading() -> Scene {
        let mut scene = Scene::default();
        scene.begin_loading(WorldRequest::new(123, 64)).unwrap();
        scene
    }

    fn held(direction: Direction) -> DirectionalInput {
        let mut input = DirectionalInput::new();
        input.set(direction, true);
        input
    }

    #[test]
    fn ready_scene_has_bounds_player_and_camera() {
        let mut scene = loading();
        scene.complete_loading(Ok(grid(64))).unwrap();

        assert!(scene.is_ready());
        let bounds = scene.bounds().unwrap();
        assert_eq!(bounds.max, Vec2::new(64.0 * 32.0, 64.0 * 32.0));
        assert_eq!(scene.player().unwrap().position, Vec2::new(1024.0, 1024.0));
        assert_eq!(scene.camera().unwrap().position, Vec2::new(1024.0, 1024.0));
    }

    #[test]
    fn malformed_world_creates_no_player() {
        let mut scene = loading();
        let err = FetchError::MalformedWorldData(GridError::RowCount {
            expected: 64,
            actual: 63,
        });
        scene.complete_loading(Err(err)).unwrap();

        assert!(matches!(scene.phase(), ScenePhase::Failed(r) if r.contains("63")));
        assert!(scene.player().is_none());
        assert!(scene.tilemap().is_none());
    }

    #[test]
    fn network_error_creates_no_player() {
        let mut scene = loading();
        scene
            .complete_loading(Err(FetchError::Network { status: 503 }))
            .unwrap();
        assert!(matches!(scene.phase(), ScenePhase::Failed(r) if r.contains("503")));
        assert!(scene.player().is_none());
    }

    #[test]
    fn update_without_player_is_noop() {
        let mut scene = loading();
        scene.update(&held(Direction::Left), 1.0);
        assert_eq!(scene.frames(), 0);
        assert!(scene.player().is_none());
    }

    #[test]
    fn steady_input_gives_steady_velocity() {
        let mut scene = loading();
        scene.complete_loading(Ok(grid(64))).unwrap();
        let mut input = held(Direction::Left);
        input.set(Direction::Up, true);

        scene.update(&input, 1.0 / 60.0);
        let first = scene.player().unwrap().velocity;
        for _ in 0..10 {
            scene.update(&input, 1.0 / 60.0);
            assert_eq!(scene.player().unwrap().velocity, first);
        }
        assert!((first.length() - 160.0).abs() < 1e-3);
    }

    #[test]
    fn player_and_camera_stay_in_bounds() {
        let mut scene = loading();
        scene.complete_loading(Ok(grid(8))).unwrap();
        let input = held(Direction::Right);
        for _ in 0..600 {
            scene.update(&input, 1.0 / 30.0);
        }
        let bounds = scene.bounds().unwrap();
        let player = scene.player().unwrap();
        assert_eq!(player.position.x, bounds.max.x - player.half_extent.x);

        // 8 * 32 = 256 world pixels is smaller than the 800x600 viewport.
        assert_eq!(scene.camera().unwrap().position, bounds.center());
    }

    #[test]
    fn transitions_are_checked() {
        let mut scene = Scene::default();
        assert!(scene.complete_loading(Ok(grid(2))).is_err());
        scene.begin_loading(WorldRequest::new(0, 2)).unwrap();
        assert_eq!(
            scene.begin_loading(WorldRequest::new(0, 2)),
            Err(SceneError::InvalidTransition {
                action: "begin loading",
                phase: "loading"
            })
        );
    }

    #[test]
    fn destroy_once_and_late_result_ignored() {
        let mut scene = loading();
        assert!(scene.destroy());
        assert!(!scene.destroy());
        scene.complete_loading(Ok(grid(4))).unwrap();
        assert_eq!(scene.phase(), &ScenePhase::Destroyed);
        assert!(scene.player().is_none());
    }

    #[test]
    fn destroy_drops_ready_state() {
        let mut scene = loading();
        scene.complete_loading(Ok(grid(4))).unwrap();
        assert!(scene.destroy());
        assert!(scene.tilemap().is_none());
        assert!(scene.camera().is_none());
    }
}
