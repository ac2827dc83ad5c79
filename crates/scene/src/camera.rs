use glam::{Mat4, Vec2, Vec3};

use crate::tilemap::Bounds;

/// 2D camera that eases toward a target and never shows outside its bounds.
/// `position` is the centre of the view in world pixels, y down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowCamera {
    pub position: Vec2,
    pub viewport: Vec2,
    /// Fraction of the remaining distance covered per `follow` call, in `(0, 1]`.
    pub lerp: f32,
    pub bounds: Bounds,
}

impl FollowCamera {
    pub fn new(viewport: Vec2, lerp: f32, bounds: Bounds) -> Self {
        Self {
            position: bounds.center(),
            viewport,
            lerp: lerp.clamp(f32::EPSILON, 1.0),
            bounds,
        }
    }

    /// Jump straight to `target`, clamped.
    pub fn center_on(&mut self, target: Vec2) {
        self.position = self.bounds.clamp_center(target, self.viewport * 0.5);
    }

    /// Move a `lerp` fraction toward `target`, then clamp.
    pub fn follow(&mut self, target: Vec2) {
        let eased = self.position.lerp(target, self.lerp);
        self.position = self.bounds.clamp_center(eased, self.viewport * 0.5);
    }

    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
        self.position = self.bounds.clamp_center(self.position, viewport * 0.5);
    }

    /// Top-left and bottom-right of the visible world rectangle.
    pub fn visible_rect(&self) -> (Vec2, Vec2) {
        let half = self.viewport * 0.5;
        (self.position - half, self.position + half)
    }

    /// Orthographic projection mapping the visible rectangle to clip space
    /// with y flipped so world y grows downward on screen.
    pub fn view_projection(&self) -> Mat4 {
        let (min, max) = self.visible_rect();
        Mat4::orthographic_rh(min.x, max.x, max.y, min.y, -1.0, 1.0)
    }

    /// World position to clip space, mostly for tests and picking.
    pub fn world_to_clip(&self, world: Vec2) -> Vec2 {
        self.view_projection()
            .transform_point3(Vec3::new(world.x, world.y, 0.0))
            .truncate()
    }
}
