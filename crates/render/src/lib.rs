//! Rendering Adapter: renderer-agnostic interface over a scene.
//!
//! # Invariants
//! - Renderers read the scene; they never mutate it.
//! - Render output derives only from scene state and the view.
//! - Every tile id has a style; unknown ids use the fallback.

mod palette;
mod text;
mod view;

pub use palette::{TilePalette, TileStyle};
pub use text::{DebugTextRenderer, PLAYER_GLYPH};
pub use view::{RenderView, Renderer};

pub fn crate_info() -> &'static str {
    "tileworld-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
