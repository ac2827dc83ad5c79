use glam::{Mat4, Vec2};
use tileworld_scene::{FollowCamera, Scene};

/// The visible world rectangle for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    /// Centre of the view in world pixels.
    pub center: Vec2,
    /// Visible extent in world pixels.
    pub viewport: Vec2,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            center: Vec2::new(400.0, 300.0),
            viewport: Vec2::new(800.0, 600.0),
        }
    }
}

impl RenderView {
    pub fn from_camera(camera: &FollowCamera) -> Self {
        Self {
            center: camera.position,
            viewport: camera.viewport,
        }
    }

    /// View of a scene's camera, or the default view before one exists.
    pub fn of_scene(scene: &Scene) -> Self {
        scene.camera().map(Self::from_camera).unwrap_or_default()
    }

    /// Top-left and bottom-right corners.
    pub fn rect(&self) -> (Vec2, Vec2) {
        let half = self.viewport * 0.5;
        (self.center - half, self.center + half)
    }

    /// Orthographic projection with world y growing downward on screen.
    pub fn view_projection(&self) -> Mat4 {
        let (min, max) = self.rect();
        Mat4::orthographic_rh(min.x, max.x, max.y, min.y, -1.0, 1.0)
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads scene state and a view, then produces output. It never
/// mutates the scene; the frame loop owns it.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene and view.
    fn render(&self, scene: &Scene, view: &RenderView) -> Self::Output;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tileworld_scene::Bounds;

    #[test]
    fn view_follows_camera() {
        let camera = FollowCamera::new(Vec2::new(64.0, 32.0), 1.0, Bounds::from_grid(10, 16.0));
        let view = RenderView::from_camera(&camera);
        assert_eq!(view.center, Vec2::new(80.0, 80.0));
        assert_eq!(view.rect(), (Vec2::new(48.0, 64.0), Vec2::new(112.0, 96.0)));
        assert_eq!(view.view_projection(), camera.view_projection());
    }

    #[test]
    fn default_view_before_ready() {
        assert_eq!(RenderView::of_scene(&Scene::default()), RenderView::default());
    }
}
