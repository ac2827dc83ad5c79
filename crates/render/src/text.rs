use std::fmt::Write;

use tileworld_scene::Scene;

use crate::palette::TilePalette;
use crate::view::{RenderView, Renderer};

/// Text renderer for terminals, logs and tests.
///
/// Draws the tiles inside the view as one glyph each, with `@` on the
/// player's tile. Scenes that are not ready render as a status line.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    palette: TilePalette,
}

pub const PLAYER_GLYPH: char = '@';

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_palette(palette: TilePalette) -> Self {
        Self { palette }
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, view: &RenderView) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Scene ({}) ===", scene.phase());

        let (Some(tilemap), Some(player)) = (scene.tilemap(), scene.player()) else {
            return out;
        };

        let edge = tilemap.tile_edge();
        let player_tile = (
            (player.position.x / edge).floor() as usize,
            (player.position.y / edge).floor() as usize,
        );
        let _ = writeln!(
            out,
            "World: {0}x{0} tiles, player at ({1:.1}, {2:.1}) tile ({3}, {4})",
            tilemap.size(),
            player.position.x,
            player.position.y,
            player_tile.0,
            player_tile.1,
        );

        let (min, max) = view.rect();
        let mut row = None;
        for (x, y, id) in tilemap.tiles_in(min, max) {
            if row.is_some_and(|r| r != y) {
                out.push('\n');
            }
            row = Some(y);
            if (x, y) == player_tile {
                out.push(PLAYER_GLYPH);
            } else {
                out.push(self.palette.style(id).glyph);
            }
        }
        if row.is_some() {
            out.push('\n');
        }

        tracing::trace!(bytes = out.len(), "text frame rendered");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use tileworld_common::{WorldGrid, WorldRequest};
    use tileworld_scene::SceneConfig;

    fn ready_scene(tiles: Vec<Vec<i32>>, viewport: Vec2) -> Scene {
        let size = tiles.len();
        let mut scene = Scene::new(SceneConfig {
            tile_edge: 10.0,
            viewport,
            ..SceneConfig::default()
        });
        scene.begin_loading(WorldRequest::new(0, size as u32)).unwrap();
        scene
            .complete_loading(Ok(WorldGrid::new(size, tiles).unwrap()))
            .unwrap();
        scene
    }

    #[test]
    fn not_ready_shows_phase() {
        let mut scene = Scene::default();
        scene.begin_loading(WorldRequest::new(1, 4)).unwrap();
        let out = DebugTextRenderer::new().render(&scene, &RenderView::of_scene(&scene));
        assert_eq!(out, "=== Scene (loading) ===\n");
    }

    #[test]
    fn whole_map_with_player() {
        let scene = ready_scene(
            vec![vec![0, 1, 2], vec![2, 1, 0], vec![7, 7, 7]],
            Vec2::new(100.0, 100.0),
        );
        let out = DebugTextRenderer::new().render(&scene, &RenderView::of_scene(&scene));
        let grid: Vec<&str> = out.lines().skip(2).collect();
        assert_eq!(grid, vec!["~.^", "^@~", "???"]);
        assert!(out.contains("tile (1, 1)"));
    }

    #[test]
    fn view_crops_the_map() {
        let scene = ready_scene(vec![vec![1; 9]; 9], Vec2::new(30.0, 30.0));
        let out = DebugTextRenderer::new().render(&scene, &RenderView::of_scene(&scene));
        let grid: Vec<&str> = out.lines().skip(2).collect();
        assert_eq!(grid, vec!["...", ".@.", "..."]);
    }
}
