use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Scene tuning. Missing fields fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Edge length of one tile in world pixels.
    pub tile_edge: f32,
    /// Player speed in world pixels per second.
    pub player_speed: f32,
    /// Fraction of the remaining distance the camera covers each frame.
    pub camera_lerp: f32,
    /// Visible area in world pixels.
    pub viewport: Vec2,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            tile_edge: 32.0,
            player_speed: 160.0,
            camera_lerp: 0.1,
            viewport: Vec2::new(800.0, 600.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: SceneConfig = serde_json::from_str(r#"{"tile_edge":16.0}"#).unwrap();
        assert_eq!(cfg.tile_edge, 16.0);
        assert_eq!(cfg.player_speed, 160.0);
        assert_eq!(cfg.viewport, Vec2::new(800.0, 600.0));
    }
}
