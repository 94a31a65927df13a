//! Physics adapter seam.
//!
//! The gameplay core configures and reacts to an external rigid-body
//! simulator through [`PhysicsAdapter`]; it never integrates or resolves
//! contacts itself. [`PhysicsWorld`] wraps Rapier2D (feature `physics`),
//! [`ScriptedPhysics`] is a deterministic stand-in for tests and headless hosts.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::EntityId;
use crate::components::layer::LayerMask;

#[cfg(feature = "physics")]
mod rapier;
mod scripted;

#[cfg(feature = "physics")]
pub use rapier::PhysicsWorld;
pub use scripted::ScriptedPhysics;

// ---------------------------------------------------------------------------
// Body descriptions
// ---------------------------------------------------------------------------

/// The kind of rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyType {
    Dynamic,
    Fixed,
}

/// Shape description for a collider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColliderDesc {
    Ball { radius: f32 },
    Cuboid { half_width: f32, half_height: f32 },
}

impl ColliderDesc {
    /// Axis-aligned box from a full size.
    pub fn cuboid(size: Vec2) -> Self {
        ColliderDesc::Cuboid {
            half_width: size.x.abs() / 2.0,
            half_height: size.y.abs() / 2.0,
        }
    }

    /// Uniformly scaled copy of this shape.
    pub fn scaled(self, factor: f32) -> Self {
        let f = factor.abs();
        match self {
            ColliderDesc::Ball { radius } => ColliderDesc::Ball { radius: radius * f },
            ColliderDesc::Cuboid { half_width, half_height } => ColliderDesc::Cuboid {
                half_width: half_width * f,
                half_height: half_height * f,
            },
        }
    }

    /// Half extents of the shape's bounding box.
    pub fn half_extents(&self) -> Vec2 {
        match *self {
            ColliderDesc::Ball { radius } => Vec2::splat(radius),
            ColliderDesc::Cuboid { half_width, half_height } => Vec2::new(half_width, half_height),
        }
    }
}

/// Physical material properties for a collider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColliderMaterial {
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
}

impl Default for ColliderMaterial {
    fn default() -> Self {
        Self {
            restitution: 0.0,
            friction: 0.4,
            density: 1.0,
        }
    }
}

/// Builder for describing a rigid body before creation.
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub body_type: BodyType,
    pub position: Vec2,
    pub rotation: f32,
    pub velocity: Vec2,
    pub gravity_scale: f32,
    pub fixed_rotation: bool,
    pub collider: ColliderDesc,
    /// Sensor colliders report triggers and never push bodies apart.
    pub sensor: bool,
    /// Layer membership, matched against overlap-query masks.
    pub layers: LayerMask,
}

impl BodyDesc {
    /// Create a dynamic body description with the given collider shape.
    pub fn dynamic(collider: ColliderDesc) -> Self {
        Self {
            body_type: BodyType::Dynamic,
            position: Vec2::ZERO,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            gravity_scale: 1.0,
            fixed_rotation: false,
            collider,
            sensor: false,
            layers: LayerMask::DEFAULT,
        }
    }

    /// Create a fixed (static, immovable) body description.
    pub fn fixed(collider: ColliderDesc) -> Self {
        Self {
            body_type: BodyType::Fixed,
            position: Vec2::ZERO,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            gravity_scale: 0.0,
            fixed_rotation: true,
            collider,
            sensor: false,
            layers: LayerMask::DEFAULT,
        }
    }

    /// A fixed sensor: pickups, checkpoints, traps.
    pub fn trigger(collider: ColliderDesc) -> Self {
        Self::fixed(collider).with_sensor(true)
    }

    pub fn with_position(mut self, pos: Vec2) -> Self {
        self.position = pos;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.velocity = vel;
        self
    }

    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    pub fn with_fixed_rotation(mut self, fixed: bool) -> Self {
        self.fixed_rotation = fixed;
        self
    }

    pub fn with_sensor(mut self, sensor: bool) -> Self {
        self.sensor = sensor;
        self
    }

    pub fn with_layers(mut self, layers: LayerMask) -> Self {
        self.layers = layers;
        self
    }
}

// ---------------------------------------------------------------------------
// Contact events
// ---------------------------------------------------------------------------

/// Trigger = overlap without physical response; collision = solid contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Trigger,
    Collision,
}

/// Where in its lifetime a contact is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    /// First step the two colliders touch.
    Started,
    /// Still touching (solid contacts only).
    Persisting,
    /// No longer touching.
    Stopped,
}

/// A contact between two entities, delivered once per step.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactEvent {
    pub entity_a: EntityId,
    pub entity_b: EntityId,
    pub kind: ContactKind,
    pub phase: ContactPhase,
    /// Contact normals pointing from `entity_a` toward `entity_b`.
    /// Empty for triggers.
    pub normals: Vec<Vec2>,
}

impl ContactEvent {
    /// View the contact from `id`'s side: the other entity, plus normals
    /// pointing from the other entity toward `id`. `None` if `id` is not
    /// part of this contact.
    pub fn seen_from(&self, id: EntityId) -> Option<(EntityId, Vec<Vec2>)> {
        if self.entity_b == id {
            Some((self.entity_a, self.normals.clone()))
        } else if self.entity_a == id {
            Some((self.entity_b, self.normals.iter().map(|n| -*n).collect()))
        } else {
            None
        }
    }

    pub fn involves(&self, id: EntityId) -> bool {
        self.entity_a == id || self.entity_b == id
    }
}

// ---------------------------------------------------------------------------
// Adapter trait
// ---------------------------------------------------------------------------

/// Everything the core needs from a rigid-body simulator. Bodies are keyed by
/// the owning entity's id; calls on unknown ids are no-ops or return zero.
pub trait PhysicsAdapter {
    /// Create a body + collider for an entity.
    fn create_body(&mut self, entity: EntityId, desc: &BodyDesc, material: ColliderMaterial);

    /// Remove an entity's body, if it has one.
    fn remove_body(&mut self, entity: EntityId);

    fn has_body(&self, entity: EntityId) -> bool;

    /// Advance the simulation by `dt` and append this step's contacts.
    fn step(&mut self, dt: f32, events: &mut Vec<ContactEvent>);

    /// Whether any non-sensor collider on `mask` overlaps the circle.
    fn overlap_circle(&self, center: Vec2, radius: f32, mask: LayerMask) -> bool;

    fn velocity(&self, entity: EntityId) -> Vec2;

    fn set_velocity(&mut self, entity: EntityId, velocity: Vec2);

    fn set_gravity_scale(&mut self, entity: EntityId, scale: f32);

    /// Replace the collider shape, keeping the body.
    fn set_shape(&mut self, entity: EntityId, shape: ColliderDesc);

    /// Current position and rotation of a body.
    fn pose(&self, entity: EntityId) -> Option<(Vec2, f32)>;

    /// Teleport a body (used to turn fixed platforms).
    fn set_pose(&mut self, entity: EntityId, position: Vec2, rotation: f32);

    /// Current collider shape of a body.
    fn shape(&self, entity: EntityId) -> Option<ColliderDesc>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seen_from_flips_normals_for_entity_a() {
        let ev = ContactEvent {
            entity_a: EntityId(1),
            entity_b: EntityId(2),
            kind: ContactKind::Collision,
            phase: ContactPhase::Started,
            normals: vec![Vec2::new(0.0, 1.0)],
        };
        let (other, normals) = ev.seen_from(EntityId(2)).unwrap();
        assert_eq!(other, EntityId(1));
        assert_eq!(normals, vec![Vec2::new(0.0, 1.0)]);

        let (other, normals) = ev.seen_from(EntityId(1)).unwrap();
        assert_eq!(other, EntityId(2));
        assert_eq!(normals, vec![Vec2::new(0.0, -1.0)]);

        assert!(ev.seen_from(EntityId(3)).is_none());
    }

    #[test]
    fn builder_pattern() {
        let desc = BodyDesc::trigger(ColliderDesc::Ball { radius: 0.5 })
            .with_position(Vec2::new(10.0, 20.0))
            .with_layers(LayerMask::GROUND);
        assert_eq!(desc.body_type, BodyType::Fixed);
        assert!(desc.sensor);
        assert_eq!(desc.position, Vec2::new(10.0, 20.0));
        assert_eq!(desc.layers, LayerMask::GROUND);
    }

    #[test]
    fn collider_scaling() {
        let ball = ColliderDesc::Ball { radius: 0.5 }.scaled(2.0);
        assert_eq!(ball, ColliderDesc::Ball { radius: 1.0 });
        let bx = ColliderDesc::cuboid(Vec2::new(4.0, 2.0));
        assert_eq!(bx.half_extents(), Vec2::new(2.0, 1.0));
        assert_eq!(bx.scaled(-0.5).half_extents(), Vec2::new(1.0, 0.5));
    }
}
