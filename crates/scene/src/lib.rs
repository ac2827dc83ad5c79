//! Scene: the state the frame loop owns between mount and unmount.
//!
//! # Invariants
//! - A player exists only in the `Ready` phase, and only after a validated grid.
//! - World bounds are exactly `size * tile_edge` on both axes, origin at zero.
//! - The player and the camera never leave the bounds after an update.
//! - A session releases its render resource exactly once.

pub mod camera;
pub mod config;
pub mod player;
pub mod scene;
pub mod session;
pub mod tilemap;

pub use camera::FollowCamera;
pub use config::SceneConfig;
pub use player::Player;
pub use scene::{Scene, SceneError, ScenePhase};
pub use session::{GameSession, SessionEvent};
pub use tilemap::{Bounds, Tilemap};

pub fn crate_info() -> &'static str {
    "tileworld-scene v0.1.0"
}
