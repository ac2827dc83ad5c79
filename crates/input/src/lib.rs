//! Input: four directional signals and the velocity they produce.
//!
//! # Invariants
//! - Opposing directions resolve deterministically: left beats right, up beats down.
//! - Diagonal movement is never faster than axis-aligned movement.
//! - Host key codes are mapped here; the scene only sees `DirectionalInput`.

mod bindings;
mod directional;

pub use bindings::KeyBindings;
pub use directional::{Direction, DirectionalInput};

pub fn crate_info() -> &'static str {
    "tileworld-input v0.1.0"
}
