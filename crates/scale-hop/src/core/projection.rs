// core/projection.rs
//
// Screen-to-world mapping for drop gestures.

use glam::Vec2;

/// Screen → world conversion used when a drag gesture is released.
/// `None` means the point cannot be projected and the gesture is dropped.
pub trait ScreenProjection {
    fn screen_to_world(&self, screen: Vec2) -> Option<Vec2>;
}

/// Orthographic 2D camera projection.
///
/// Screen space is in pixels with the origin at the top-left and Y down;
/// world space is Y-up. The host moves the camera; the core only projects.
#[derive(Debug, Clone)]
pub struct OrthoProjection {
    /// Viewport size in pixels.
    pub viewport: Vec2,
    /// Visible height in world units. Width follows the viewport aspect.
    pub view_height: f32,
    /// Camera center in world space.
    pub center: Vec2,
}

impl OrthoProjection {
    pub fn new(viewport: Vec2, view_height: f32) -> Self {
        Self {
            viewport,
            view_height,
            center: Vec2::ZERO,
        }
    }

    /// Resize the viewport (e.g. on window resize).
    pub fn resize(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    /// Move the camera center.
    pub fn look_at(&mut self, target: Vec2) {
        self.center = target;
    }

    /// Visible width in world units.
    pub fn view_width(&self) -> f32 {
        if self.viewport.y <= 0.0 {
            return 0.0;
        }
        self.view_height * self.viewport.x / self.viewport.y
    }

    /// World units per pixel.
    fn units_per_pixel(&self) -> Option<f32> {
        if self.viewport.x <= 0.0 || self.viewport.y <= 0.0 || self.view_height <= 0.0 {
            return None;
        }
        Some(self.view_height / self.viewport.y)
    }
}

impl ScreenProjection for OrthoProjection {
    fn screen_to_world(&self, screen: Vec2) -> Option<Vec2> {
        if !screen.is_finite() {
            return None;
        }
        let upp = self.units_per_pixel()?;
        let from_center = screen - self.viewport / 2.0;
        Some(self.center + Vec2::new(from_center.x, -from_center.y) * upp)
    }
}
