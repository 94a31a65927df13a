use std::collections::HashMap;

use glam::Vec2;

use crate::api::types::EntityId;
use crate::components::layer::LayerMask;
use super::{
    BodyDesc, BodyType, ColliderDesc, ColliderMaterial, ContactEvent, ContactKind, ContactPhase,
    PhysicsAdapter,
};

#[derive(Debug, Clone)]
struct ScriptedBody {
    body_type: BodyType,
    pos: Vec2,
    rotation: f32,
    vel: Vec2,
    gravity_scale: f32,
    shape: ColliderDesc,
    sensor: bool,
    layers: LayerMask,
}

/// Deterministic physics stand-in.
///
/// Integrates velocity and gravity for dynamic bodies but resolves no
/// contacts: the host (usually a test) queues the contacts each step should
/// deliver. Overlap queries test circles against body bounding boxes, or
/// return a forced answer when one is set.
#[derive(Debug, Default)]
pub struct ScriptedPhysics {
    gravity: Vec2,
    bodies: HashMap<EntityId, ScriptedBody>,
    queued: Vec<ContactEvent>,
    overlap_override: Option<bool>,
    steps: u64,
}

impl ScriptedPhysics {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            ..Self::default()
        }
    }

    /// Queue a contact for delivery on the next `step`.
    pub fn push_contact(&mut self, event: ContactEvent) {
        self.queued.push(event);
    }

    /// Queue a trigger entry of `visitor` into `zone`.
    pub fn push_trigger(&mut self, visitor: EntityId, zone: EntityId) {
        self.push_contact(ContactEvent {
            entity_a: zone,
            entity_b: visitor,
            kind: ContactKind::Trigger,
            phase: ContactPhase::Started,
            normals: Vec::new(),
        });
    }

    /// Queue a solid contact; `normal` points from `other` toward `subject`.
    pub fn push_collision(
        &mut self,
        subject: EntityId,
        other: EntityId,
        phase: ContactPhase,
        normal: Vec2,
    ) {
        self.push_contact(ContactEvent {
            entity_a: other,
            entity_b: subject,
            kind: ContactKind::Collision,
            phase,
            normals: vec![normal],
        });
    }

    /// Force every overlap query to answer `hit`; `None` restores geometry.
    pub fn set_overlap_override(&mut self, hit: Option<bool>) {
        self.overlap_override = hit;
    }

    pub fn gravity_scale(&self, entity: EntityId) -> Option<f32> {
        self.bodies.get(&entity).map(|b| b.gravity_scale)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of completed steps.
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

fn circle_hits_box(center: Vec2, radius: f32, box_center: Vec2, half: Vec2) -> bool {
    let nearest = center.clamp(box_center - half, box_center + half);
    nearest.distance_squared(center) <= radius * radius
}

impl PhysicsAdapter for ScriptedPhysics {
    fn create_body(&mut self, entity: EntityId, desc: &BodyDesc, _material: ColliderMaterial) {
        self.bodies.insert(
            entity,
            ScriptedBody {
                body_type: desc.body_type,
                pos: desc.position,
                rotation: desc.rotation,
                vel: desc.velocity,
                gravity_scale: desc.gravity_scale,
                shape: desc.collider,
                sensor: desc.sensor,
                layers: desc.layers,
            },
        );
    }

    fn remove_body(&mut self, entity: EntityId) {
        self.bodies.remove(&entity);
    }

    fn has_body(&self, entity: EntityId) -> bool {
        self.bodies.contains_key(&entity)
    }

    fn step(&mut self, dt: f32, events: &mut Vec<ContactEvent>) {
        for body in self.bodies.values_mut() {
            if body.body_type != BodyType::Dynamic {
                continue;
            }
            body.vel += self.gravity * body.gravity_scale * dt;
            body.pos += body.vel * dt;
        }
        let bodies = &self.bodies;
        events.extend(
            self.queued
                .drain(..)
                .filter(|e| bodies.contains_key(&e.entity_a) && bodies.contains_key(&e.entity_b)),
        );
        self.steps += 1;
    }

    fn overlap_circle(&self, center: Vec2, radius: f32, mask: LayerMask) -> bool {
        if let Some(hit) = self.overlap_override {
            return hit;
        }
        self.bodies.values().any(|b| {
            !b.sensor
                && b.layers.intersects(mask)
                && circle_hits_box(center, radius, b.pos, b.shape.half_extents())
        })
    }

    fn velocity(&self, entity: EntityId) -> Vec2 {
        self.bodies.get(&entity).map(|b| b.vel).unwrap_or(Vec2::ZERO)
    }

    fn set_velocity(&mut self, entity: EntityId, velocity: Vec2) {
        if let Some(b) = self.bodies.get_mut(&entity) {
            b.vel = velocity;
        }
    }

    fn set_gravity_scale(&mut self, entity: EntityId, scale: f32) {
        if let Some(b) = self.bodies.get_mut(&entity) {
            b.gravity_scale = scale;
        }
    }

    fn set_shape(&mut self, entity: EntityId, shape: ColliderDesc) {
        if let Some(b) = self.bodies.get_mut(&entity) {
            b.shape = shape;
        }
    }

    fn pose(&self, entity: EntityId) -> Option<(Vec2, f32)> {
        self.bodies.get(&entity).map(|b| (b.pos, b.rotation))
    }

    fn set_pose(&mut self, entity: EntityId, position: Vec2, rotation: f32) {
        if let Some(b) = self.bodies.get_mut(&entity) {
            b.pos = position;
            b.rotation = rotation;
        }
    }

    fn shape(&self, entity: EntityId) -> Option<ColliderDesc> {
        self.bodies.get(&entity).map(|b| b.shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrates_dynamic_bodies_only() {
        let mut world = ScriptedPhysics::new(Vec2::new(0.0, -10.0));
        world.create_body(
            EntityId(1),
            &BodyDesc::dynamic(ColliderDesc::Ball { radius: 0.5 }),
            ColliderMaterial::default(),
        );
        world.create_body(
            EntityId(2),
            &BodyDesc::fixed(ColliderDesc::Ball { radius: 0.5 }),
            ColliderMaterial::default(),
        );
        world.step(0.1, &mut Vec::new());
        assert!((world.velocity(EntityId(1)).y + 1.0).abs() < 1e-5);
        assert_eq!(world.pose(EntityId(2)).unwrap().0, Vec2::ZERO);
    }

    #[test]
    fn queued_contacts_for_removed_bodies_are_dropped() {
        let mut world = ScriptedPhysics::new(Vec2::ZERO);
        for id in 1..=3 {
            world.create_body(
                EntityId(id),
                &BodyDesc::fixed(ColliderDesc::Ball { radius: 0.5 }),
                ColliderMaterial::default(),
            );
        }
        world.push_trigger(EntityId(1), EntityId(2));
        world.push_trigger(EntityId(1), EntityId(3));
        world.remove_body(EntityId(3));

        let mut events = Vec::new();
        world.step(0.1, &mut events);
        assert_eq!(events.len(), 1);
        assert!(events[0].involves(EntityId(2)));

        events.clear();
        world.step(0.1, &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn overlap_uses_layers_and_geometry() {
        let mut world = ScriptedPhysics::new(Vec2::ZERO);
        world.create_body(
            EntityId(1),
            &BodyDesc::fixed(ColliderDesc::cuboid(Vec2::new(4.0, 1.0)))
                .with_layers(LayerMask::GROUND),
            ColliderMaterial::default(),
        );
        assert!(world.overlap_circle(Vec2::new(0.0, 0.6), 0.2, LayerMask::GROUND));
        assert!(!world.overlap_circle(Vec2::new(0.0, 0.8), 0.2, LayerMask::GROUND));
        assert!(!world.overlap_circle(Vec2::new(0.0, 0.6), 0.2, LayerMask::DEFAULT));

        world.set_overlap_override(Some(true));
        assert!(world.overlap_circle(Vec2::new(100.0, 100.0), 0.1, LayerMask::NONE));
    }
}
