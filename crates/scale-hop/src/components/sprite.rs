use glam::Vec2;
use crate::api::types::Rgba;

/// Sprite component: the presentation-side state the core tracks.
///
/// The core never draws; it mirrors tint and opacity here so behaviors can
/// read them back, and emits the matching side effects for the host.
#[derive(Debug, Clone)]
pub struct SpriteComponent {
    /// Native sprite size in world units at scale 1.
    pub size: Vec2,
    /// Tint multiplied over the sprite.
    pub tint: Rgba,
    /// Opacity (0.0 = invisible, 1.0 = opaque).
    pub alpha: f32,
}

impl SpriteComponent {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }
}

impl Default for SpriteComponent {
    fn default() -> Self {
        Self {
            size: Vec2::ONE,
            tint: Rgba::WHITE,
            alpha: 1.0,
        }
    }
}
