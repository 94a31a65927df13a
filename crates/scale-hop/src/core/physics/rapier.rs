use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use glam::Vec2;
use rapier2d::prelude::*;

use crate::api::types::EntityId;
use crate::components::layer::LayerMask;
use super::{
    BodyDesc, BodyType, ColliderDesc, ColliderMaterial, ContactEvent, ContactKind, ContactPhase,
    PhysicsAdapter,
};

// ---------------------------------------------------------------------------
// Conversion helpers (private): glam to nalgebra and back
// ---------------------------------------------------------------------------

fn vec2_to_na(v: Vec2) -> nalgebra::Vector2<f32> {
    nalgebra::Vector2::new(v.x, v.y)
}

fn na_to_vec2(v: &nalgebra::Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

fn na_iso_to_pos_rot(iso: &nalgebra::Isometry2<f32>) -> (Vec2, f32) {
    let pos = Vec2::new(iso.translation.x, iso.translation.y);
    let rot = iso.rotation.angle();
    (pos, rot)
}

fn layers_to_groups(layers: LayerMask) -> InteractionGroups {
    InteractionGroups::new(Group::from_bits_truncate(layers.0), Group::ALL)
}

impl BodyType {
    fn to_rapier(self) -> RigidBodyType {
        match self {
            BodyType::Dynamic => RigidBodyType::Dynamic,
            BodyType::Fixed => RigidBodyType::Fixed,
        }
    }
}

impl ColliderDesc {
    fn build_collider(&self) -> ColliderBuilder {
        match *self {
            ColliderDesc::Ball { radius } => ColliderBuilder::ball(radius),
            ColliderDesc::Cuboid { half_width, half_height } => {
                ColliderBuilder::cuboid(half_width, half_height)
            }
        }
    }

    fn to_shared(self) -> SharedShape {
        match self {
            ColliderDesc::Ball { radius } => SharedShape::ball(radius),
            ColliderDesc::Cuboid { half_width, half_height } => {
                SharedShape::cuboid(half_width, half_height)
            }
        }
    }
}

/// Handle pair referencing Rapier internals.
#[derive(Debug, Clone, Copy)]
struct BodyHandles {
    body: RigidBodyHandle,
    collider: ColliderHandle,
}

// ---------------------------------------------------------------------------
// Event collector (no crossbeam)
// ---------------------------------------------------------------------------

struct DirectEventCollector {
    collisions: Mutex<Vec<CollisionEvent>>,
}

impl DirectEventCollector {
    fn new() -> Self {
        Self {
            collisions: Mutex::new(Vec::new()),
        }
    }

    fn drain_collisions(&self) -> Vec<CollisionEvent> {
        let mut guard = self.collisions.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *guard)
    }
}

impl EventHandler for DirectEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        self.collisions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: f32,
    ) {
        // Contact forces are not used; the trait requires this.
    }
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// Rapier2D-backed [`PhysicsAdapter`]. Y-up: use negative Y gravity.
pub struct PhysicsWorld {
    gravity: nalgebra::Vector2<f32>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    event_collector: DirectEventCollector,
    handles: HashMap<EntityId, BodyHandles>,
}

impl PhysicsWorld {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity: vec2_to_na(gravity),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            event_collector: DirectEventCollector::new(),
            handles: HashMap::new(),
        }
    }

    /// Number of rigid bodies in the simulation.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn rigid_body_mut(&mut self, entity: EntityId) -> Option<&mut RigidBody> {
        let handles = self.handles.get(&entity)?;
        self.bodies.get_mut(handles.body)
    }

    fn collider_to_entity(&self, collider_handle: ColliderHandle) -> Option<EntityId> {
        let collider = self.colliders.get(collider_handle)?;
        let body_handle = collider.parent()?;
        let body = self.bodies.get(body_handle)?;
        Some(EntityId(body.user_data as u32))
    }

    /// Normals of the solid contact between two colliders, pointing from
    /// `h1` toward `h2`.
    fn normals_between(&self, h1: ColliderHandle, h2: ColliderHandle) -> Vec<Vec2> {
        let Some(pair) = self.narrow_phase.contact_pair(h1, h2) else {
            return Vec::new();
        };
        let sign = if pair.collider1 == h1 { 1.0 } else { -1.0 };
        pair.manifolds
            .iter()
            .filter(|m| !m.points.is_empty())
            .map(|m| na_to_vec2(&m.data.normal) * sign)
            .collect()
    }
}

impl PhysicsAdapter for PhysicsWorld {
    /// The EntityId is stored in the body's `user_data` for contact lookups.
    fn create_body(&mut self, entity: EntityId, desc: &BodyDesc, material: ColliderMaterial) {
        if self.handles.contains_key(&entity) {
            self.remove_body(entity);
        }

        let rb = RigidBodyBuilder::new(desc.body_type.to_rapier())
            .translation(vec2_to_na(desc.position))
            .rotation(desc.rotation)
            .linvel(vec2_to_na(desc.velocity))
            .gravity_scale(desc.gravity_scale)
            .locked_axes(if desc.fixed_rotation {
                LockedAxes::ROTATION_LOCKED
            } else {
                LockedAxes::empty()
            })
            .user_data(entity.0 as u128)
            .build();

        let body = self.bodies.insert(rb);

        let collider = desc
            .collider
            .build_collider()
            .restitution(material.restitution)
            .friction(material.friction)
            .density(material.density)
            .sensor(desc.sensor)
            .collision_groups(layers_to_groups(desc.layers))
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();

        let collider = self
            .colliders
            .insert_with_parent(collider, body, &mut self.bodies);

        self.handles.insert(entity, BodyHandles { body, collider });
    }

    fn remove_body(&mut self, entity: EntityId) {
        if let Some(handles) = self.handles.remove(&entity) {
            self.bodies.remove(
                handles.body,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
        }
    }

    fn has_body(&self, entity: EntityId) -> bool {
        self.handles.contains_key(&entity)
    }

    fn step(&mut self, dt: f32, events: &mut Vec<ContactEvent>) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.event_collector,
        );

        // Started/stopped come from the event stream, persisting contacts
        // from the narrow phase.
        let mut started = HashSet::new();
        for event in self.event_collector.drain_collisions() {
            let (h1, h2) = (event.collider1(), event.collider2());
            let phase = if event.started() {
                started.insert((h1, h2));
                ContactPhase::Started
            } else {
                ContactPhase::Stopped
            };
            let kind = if event.sensor() {
                ContactKind::Trigger
            } else {
                ContactKind::Collision
            };

            let (Some(a), Some(b)) = (self.collider_to_entity(h1), self.collider_to_entity(h2)) else {
                continue;
            };
            let normals = match (kind, phase) {
                (ContactKind::Collision, ContactPhase::Started) => self.normals_between(h1, h2),
                _ => Vec::new(),
            };
            events.push(ContactEvent { entity_a: a, entity_b: b, kind, phase, normals });
        }

        for pair in self.narrow_phase.contact_pairs() {
            if !pair.has_any_active_contact {
                continue;
            }
            let (h1, h2) = (pair.collider1, pair.collider2);
            if started.contains(&(h1, h2)) || started.contains(&(h2, h1)) {
                continue;
            }
            let (Some(a), Some(b)) = (self.collider_to_entity(h1), self.collider_to_entity(h2)) else {
                continue;
            };
            events.push(ContactEvent {
                entity_a: a,
                entity_b: b,
                kind: ContactKind::Collision,
                phase: ContactPhase::Persisting,
                normals: self.normals_between(h1, h2),
            });
        }
    }

    fn overlap_circle(&self, center: Vec2, radius: f32, mask: LayerMask) -> bool {
        let shape = Ball::new(radius);
        let shape_pos = nalgebra::Isometry2::translation(center.x, center.y);
        let filter = QueryFilter::default()
            .exclude_sensors()
            .groups(InteractionGroups::new(Group::ALL, Group::from_bits_truncate(mask.0)));
        self.query_pipeline
            .intersection_with_shape(&self.bodies, &self.colliders, &shape_pos, &shape, filter)
            .is_some()
    }

    fn velocity(&self, entity: EntityId) -> Vec2 {
        self.handles
            .get(&entity)
            .and_then(|h| self.bodies.get(h.body))
            .map(|rb| na_to_vec2(rb.linvel()))
            .unwrap_or(Vec2::ZERO)
    }

    fn set_velocity(&mut self, entity: EntityId, velocity: Vec2) {
        if let Some(rb) = self.rigid_body_mut(entity) {
            rb.set_linvel(vec2_to_na(velocity), true);
        }
    }

    fn set_gravity_scale(&mut self, entity: EntityId, scale: f32) {
        if let Some(rb) = self.rigid_body_mut(entity) {
            rb.set_gravity_scale(scale, true);
        }
    }

    fn set_shape(&mut self, entity: EntityId, shape: ColliderDesc) {
        let Some(handles) = self.handles.get(&entity).copied() else {
            return;
        };
        if let Some(collider) = self.colliders.get_mut(handles.collider) {
            collider.set_shape(shape.to_shared());
        }
    }

    fn pose(&self, entity: EntityId) -> Option<(Vec2, f32)> {
        let handles = self.handles.get(&entity)?;
        self.bodies
            .get(handles.body)
            .map(|rb| na_iso_to_pos_rot(rb.position()))
    }

    fn set_pose(&mut self, entity: EntityId, position: Vec2, rotation: f32) {
        if let Some(rb) = self.rigid_body_mut(entity) {
            rb.set_position(
                nalgebra::Isometry2::new(vec2_to_na(position), rotation),
                true,
            );
        }
    }

    fn shape(&self, entity: EntityId) -> Option<ColliderDesc> {
        let handles = self.handles.get(&entity)?;
        let collider = self.colliders.get(handles.collider)?;
        let shape = collider.shape();
        if let Some(ball) = shape.as_ball() {
            Some(ColliderDesc::Ball { radius: ball.radius })
        } else if let Some(cuboid) = shape.as_cuboid() {
            Some(ColliderDesc::Cuboid {
                half_width: cuboid.half_extents.x,
                half_height: cuboid.half_extents.y,
            })
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
