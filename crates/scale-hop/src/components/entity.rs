use glam::Vec2;
use crate::api::types::EntityId;
use crate::components::sprite::SpriteComponent;
use crate::components::tag::Tag;

/// Fat Entity: a single struct with optional components.
/// Physics bodies live in the physics adapter, keyed by the same id.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Unique identifier.
    pub id: EntityId,
    /// Collision category.
    pub tag: Tag,
    /// Position in world space, synced from physics after each step.
    pub pos: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
    /// Transform scale. A negative x mirrors the sprite.
    pub scale: Vec2,
    /// Sprite component (optional; entities without sprites are invisible).
    pub sprite: Option<SpriteComponent>,
}

impl Entity {
    /// Create a new entity with the given ID at the origin.
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            tag: Tag::Untagged,
            pos: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            sprite: None,
        }
    }

    // -- Builder pattern --

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = tag;
        self
    }

    pub fn with_pos(mut self, pos: Vec2) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_sprite(mut self, sprite: SpriteComponent) -> Self {
        self.sprite = Some(sprite);
        self
    }
}
