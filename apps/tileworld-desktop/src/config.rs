use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tileworld_common::WorldRequest;
use tileworld_fetch::ClientConfig;
use tileworld_scene::SceneConfig;

/// Desktop settings, loadable from JSON. Missing fields use defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesktopConfig {
    pub client: ClientConfig,
    pub scene: SceneConfig,
    pub seed: i64,
    pub size: u32,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            scene: SceneConfig::default(),
            seed: 123,
            size: 64,
            window_width: 1280,
            window_height: 720,
        }
    }
}

impl DesktopConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn request(&self) -> WorldRequest {
        WorldRequest::new(self.seed, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_fields_fall_back() {
        let cfg: DesktopConfig = serde_json::from_str(
            r#"{"seed":7,"client":{"base_url":"http://10.0.0.2:8080"},"scene":{"player_speed":90.0}}"#,
        )
        .unwrap();
        assert_eq!(cfg.request(), WorldRequest::new(7, 64));
        assert_eq!(cfg.client.base_url, "http://10.0.0.2:8080");
        assert_eq!(cfg.client.timeout_ms, None);
        assert_eq!(cfg.scene.player_speed, 90.0);
        assert_eq!(cfg.scene.tile_edge, 32.0);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = DesktopConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("reading config"));
    }
}
