use glam::Vec2;

use crate::api::types::{EntityId, Rgba, SideEffect, TextLabel};
use crate::components::entity::Entity;
use crate::core::physics::{BodyDesc, ColliderMaterial, ContactEvent, PhysicsAdapter};
use crate::core::scene::Scene;
use crate::core::scheduler::{Fired, Scheduler};
use crate::core::time::SimClock;

/// Mutable access to simulation state, shared by every system in a step.
///
/// Owns the scene, the physics adapter, the sequence scheduler and the
/// outgoing side-effect queue. Presentation changes go through the setters
/// here so the mirrored sprite state and the emitted effects stay in step.
pub struct EngineContext<P: PhysicsAdapter> {
    pub scene: Scene,
    pub physics: P,
    pub scheduler: Scheduler,
    pub clock: SimClock,
    effects: Vec<SideEffect>,
    contacts: Vec<ContactEvent>,
    next_id: u32,
}

impl<P: PhysicsAdapter> EngineContext<P> {
    pub fn new(physics: P) -> Self {
        Self {
            scene: Scene::new(),
            physics,
            scheduler: Scheduler::new(),
            clock: SimClock::default(),
            effects: Vec::new(),
            contacts: Vec::new(),
            next_id: 1,
        }
    }

    /// Generate the next unique entity ID.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Queue a side effect for the host.
    pub fn emit(&mut self, effect: SideEffect) {
        self.effects.push(effect);
    }

    /// Side effects queued since the last drain.
    pub fn effects(&self) -> &[SideEffect] {
        &self.effects
    }

    pub fn drain_effects(&mut self) -> Vec<SideEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Spawn an entity with a physics body. The entity's position and
    /// rotation are taken from the BodyDesc.
    pub fn spawn_with_body(
        &mut self,
        entity: Entity,
        desc: BodyDesc,
        material: ColliderMaterial,
    ) -> EntityId {
        let id = entity.id;
        self.physics.create_body(id, &desc, material);
        self.scene
            .spawn(entity.with_pos(desc.position).with_rotation(desc.rotation));
        id
    }

    /// Destroy an entity: its body, its pending sequences, its scene slot.
    /// Returns false if it was already gone.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        self.physics.remove_body(id);
        self.scheduler.cancel_owner(id);
        self.scene.despawn(id).is_some()
    }

    pub fn set_text(&mut self, label: TextLabel, text: impl Into<String>) {
        self.emit(SideEffect::SetText { label, text: text.into() });
    }

    pub fn set_tint(&mut self, id: EntityId, color: Rgba) {
        if let Some(sprite) = self.scene.get_mut(id).and_then(|e| e.sprite.as_mut()) {
            sprite.tint = color;
        }
        self.emit(SideEffect::SetTint { entity: id, color });
    }

    pub fn set_opacity(&mut self, id: EntityId, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        if let Some(sprite) = self.scene.get_mut(id).and_then(|e| e.sprite.as_mut()) {
            sprite.alpha = alpha;
        }
        self.emit(SideEffect::SetOpacity { entity: id, alpha });
    }

    /// Set an entity's visual scale. Colliders are not touched.
    pub fn set_scale(&mut self, id: EntityId, scale: Vec2) {
        if let Some(entity) = self.scene.get_mut(id) {
            entity.scale = scale;
        }
        self.emit(SideEffect::SetScale { entity: id, scale });
    }

    pub fn velocity(&self, id: EntityId) -> Vec2 {
        self.physics.velocity(id)
    }

    pub fn set_velocity(&mut self, id: EntityId, vel: Vec2) {
        self.physics.set_velocity(id, vel);
    }

    /// Set only the vertical component of an entity's velocity.
    pub fn set_vertical_velocity(&mut self, id: EntityId, vy: f32) {
        let v = self.physics.velocity(id);
        self.physics.set_velocity(id, Vec2::new(v.x, vy));
    }

    /// Contacts reported by the most recent physics step.
    pub fn contacts(&self) -> &[ContactEvent] {
        &self.contacts
    }

    pub fn take_contacts(&mut self) -> Vec<ContactEvent> {
        std::mem::take(&mut self.contacts)
    }

    /// Step the physics simulation and sync poses back to entities.
    pub fn step_physics(&mut self, dt: f32) {
        self.contacts.clear();
        self.physics.step(dt, &mut self.contacts);

        for entity in self.scene.iter_mut() {
            if let Some((pos, rot)) = self.physics.pose(entity.id) {
                entity.pos = pos;
                entity.rotation = rot;
            }
        }
    }

    /// Advance pending sequences. Owners missing from the scene are dropped.
    pub fn tick_scheduler(&mut self, dt: f32) -> Vec<Fired> {
        let scene = &self.scene;
        self.scheduler.tick(dt, |id| scene.contains(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::sprite::SpriteComponent;
    use crate::core::physics::{ColliderDesc, ScriptedPhysics};
    use crate::core::scheduler::{Action, Channel, SequenceKey};

    fn ctx() -> EngineContext<ScriptedPhysics> {
        EngineContext::new(ScriptedPhysics::new(Vec2::new(0.0, -9.81)))
    }

    #[test]
    fn spawn_with_body_creates_entity_and_physics() {
        let mut ctx = ctx();
        let id = ctx.next_id();
        let desc = BodyDesc::dynamic(ColliderDesc::Ball { radius: 0.5 })
            .with_position(Vec2::new(1.0, 2.0));
        ctx.spawn_with_body(Entity::new(id), desc, ColliderMaterial::default());

        assert_eq!(ctx.scene.len(), 1);
        assert!(ctx.physics.has_body(id));
        assert_eq!(ctx.scene.get(id).unwrap().pos, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn despawn_cleans_up_physics_and_sequences() {
        let mut ctx = ctx();
        let id = ctx.next_id();
        let desc = BodyDesc::fixed(ColliderDesc::cuboid(Vec2::ONE));
        ctx.spawn_with_body(Entity::new(id), desc, ColliderMaterial::default());
        ctx.scheduler
            .schedule_after(SequenceKey::new(id, Channel::Lifetime), 1.0, vec![Action::Despawn]);

        assert!(ctx.despawn(id));
        assert!(ctx.scene.is_empty());
        assert!(!ctx.physics.has_body(id));
        assert!(ctx.scheduler.is_empty());
        assert!(!ctx.despawn(id));
    }

    #[test]
    fn step_physics_syncs_positions() {
        let mut ctx = ctx();
        let id = ctx.next_id();
        let desc = BodyDesc::dynamic(ColliderDesc::Ball { radius: 0.5 });
        ctx.spawn_with_body(Entity::new(id), desc, ColliderMaterial::default());

        for _ in 0..10 {
            ctx.step_physics(1.0 / 60.0);
        }
        let entity = ctx.scene.get(id).unwrap();
        assert!(entity.pos.y < 0.0, "Entity should have fallen: y={}", entity.pos.y);
    }

    #[test]
    fn presentation_setters_mirror_and_emit() {
        let mut ctx = ctx();
        let id = ctx.next_id();
        ctx.scene.spawn(Entity::new(id).with_sprite(SpriteComponent::default()));

        ctx.set_tint(id, Rgba::BLACK);
        ctx.set_opacity(id, 1.5);
        let sprite = ctx.scene.get(id).unwrap().sprite.clone().unwrap();
        assert_eq!(sprite.tint, Rgba::BLACK);
        assert_eq!(sprite.alpha, 1.0);

        let effects = ctx.drain_effects();
        assert_eq!(effects.len(), 2);
        assert_eq!(effects[0], SideEffect::SetTint { entity: id, color: Rgba::BLACK });
        assert!(ctx.effects().is_empty());
    }

    #[test]
    fn vertical_velocity_keeps_horizontal() {
        let mut ctx = ctx();
        let id = ctx.next_id();
        let desc = BodyDesc::dynamic(ColliderDesc::Ball { radius: 0.5 })
            .with_velocity(Vec2::new(5.0, -1.0));
        ctx.spawn_with_body(Entity::new(id), desc, ColliderMaterial::default());

        ctx.set_vertical_velocity(id, 7.0);
        assert_eq!(ctx.velocity(id), Vec2::new(5.0, 7.0));
    }
}
