//! wgpu render backend for tile worlds.
//!
//! Renders the tilemap as instanced coloured quads and the player as one more
//! quad on top, through an orthographic projection of the follow view.
//!
//! # Invariants
//! - Renderer never mutates scene state.
//! - Tile instances are uploaded once per tilemap (keyed by `Tilemap::id`);
//!   only the player and the view change per frame.
//! - No instance buffer exceeds the device's `max_buffer_size`.

mod gpu;
mod instances;
mod shaders;

pub use gpu::WgpuRenderer;
pub use instances::{
    PLAYER_COLOR, TileInstance, instance_chunks, player_instance, tile_instances,
};
