//! World generation: seeded fractal gradient noise thresholded into terrain.
//!
//! # Invariants
//! - Generation is a pure function of `(seed, size, params)`.
//! - Output is a valid square `WorldGrid` for every non-zero size; a zero size
//!   is an error, never a panic.

mod noise;
mod terrain;

pub use noise::{NoiseParams, noise_map};
pub use terrain::{Terrain, TerrainThresholds, generate_world, generate_world_with};

pub fn crate_info() -> &'static str {
    "tileworld-worldgen v0.1.0"
}
