//! Shared types: world requests and the validated tile grid.
//!
//! # Invariants
//! - A `WorldGrid` is always square and non-empty; malformed data never
//!   becomes a `WorldGrid`.
//! - Tile ids are opaque integers. Their meaning belongs to the generator.

mod grid;
mod types;

pub use grid::{GridError, RawWorldGrid, WorldGrid};
pub use types::{TileId, WorldRequest};

pub fn crate_info() -> &'static str {
    "tileworld-common v0.1.0"
}
