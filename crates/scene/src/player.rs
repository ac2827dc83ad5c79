use glam::Vec2;
use tileworld_input::DirectionalInput;

use crate::tilemap::Bounds;

/// The single moving entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    /// Centre in world pixels.
    pub position: Vec2,
    /// Pixels per second, recomputed from input every frame.
    pub velocity: Vec2,
    pub half_extent: Vec2,
}

impl Player {
    /// A stationary player one tile in size.
    pub fn spawn(position: Vec2, tile_edge: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            half_extent: Vec2::splat(tile_edge * 0.5),
        }
    }

    /// Reset velocity from input, integrate and clamp to `bounds`.
    pub fn step(&mut self, input: &DirectionalInput, speed: f32, dt: f32, bounds: &Bounds) {
        self.velocity = input.velocity(speed);
        self.position = bounds.clamp_center(self.position + self.velocity * dt, self.half_extent);
    }
}
