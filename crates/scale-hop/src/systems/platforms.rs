// systems/platforms.rs
//
// Behaviors of spawned platforms: bounce (velocity boost, restore, scale
// pulse), continuous rotation, and the fade lifecycle that is the only
// path by which a spawned platform is destroyed.

use glam::Vec2;

use crate::api::context::EngineContext;
use crate::api::types::EntityId;
use crate::components::platform::{BounceEffect, PlatformBehavior, SpawnedPlatform};
use crate::components::tag::Tag;
use crate::core::physics::{ContactEvent, ContactKind, ContactPhase, PhysicsAdapter};
use crate::core::scene::Scene;
use crate::core::scheduler::{Action, Channel, Ramp, SequenceKey, Stage};

/// Every live spawned platform.
#[derive(Debug, Default)]
pub struct PlatformBehaviors {
    platforms: Vec<SpawnedPlatform>,
}

impl PlatformBehaviors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take over a freshly spawned platform and start its lifecycle.
    pub fn attach<P: PhysicsAdapter>(&mut self, platform: SpawnedPlatform, ctx: &mut EngineContext<P>) {
        if let Some(fade) = platform.behavior.fade() {
            ctx.scheduler.schedule_staged(
                SequenceKey::new(platform.id, Channel::Lifetime),
                vec![
                    Stage::wait(fade.delay),
                    Stage::ramp(Ramp::opacity(1.0, 0.0), fade.duration),
                ],
                vec![Action::Despawn],
            );
        }
        self.platforms.push(platform);
    }

    pub fn get(&self, id: EntityId) -> Option<&SpawnedPlatform> {
        self.platforms.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpawnedPlatform> {
        self.platforms.iter()
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    /// Forget platforms whose entity is gone.
    pub fn prune(&mut self, scene: &Scene) {
        self.platforms.retain(|p| scene.contains(p.id));
    }

    /// React to this step's contacts. Runs before the player controller so
    /// the bounce reads the player's velocity before anything else writes it.
    pub fn handle_contacts<P: PhysicsAdapter>(
        &mut self,
        contacts: &[ContactEvent],
        ctx: &mut EngineContext<P>,
    ) {
        for contact in contacts {
            if contact.kind != ContactKind::Collision || contact.phase != ContactPhase::Started {
                continue;
            }
            for platform in &mut self.platforms {
                let PlatformBehavior::Bounce { bounce, .. } = &mut platform.behavior else {
                    continue;
                };
                let Some((other, _)) = contact.seen_from(platform.id) else {
                    continue;
                };
                if ctx.scene.tag_of(other) == Tag::Player {
                    apply_bounce(platform.id, bounce, other, ctx);
                }
            }
        }
    }

    /// Turn every rotating platform by its angular velocity.
    pub fn rotate<P: PhysicsAdapter>(&mut self, dt: f32, ctx: &mut EngineContext<P>) {
        for platform in &self.platforms {
            let PlatformBehavior::Rotate(effect) = &platform.behavior else {
                continue;
            };
            let Some(entity) = ctx.scene.get_mut(platform.id) else {
                continue;
            };
            entity.rotation += effect.config.angular_velocity() * dt;
            let (pos, rotation) = (entity.pos, entity.rotation);
            ctx.physics.set_pose(platform.id, pos, rotation);
        }
    }
}

/// Stop the player's horizontal motion and multiply its vertical velocity,
/// schedule the restoration, and restart the scale pulse.
fn apply_bounce<P: PhysicsAdapter>(
    platform: EntityId,
    bounce: &mut BounceEffect,
    player: EntityId,
    ctx: &mut EngineContext<P>,
) {
    let restore_key = SequenceKey::new(platform, Channel::BounceRestore);
    let v = ctx.velocity(player);
    // A restore still pending keeps the velocity from the first contact.
    let baseline = match bounce.baseline_vy {
        Some(vy) if ctx.scheduler.is_pending(restore_key) => vy,
        _ => v.y,
    };
    bounce.baseline_vy = Some(baseline);

    ctx.set_velocity(player, Vec2::new(0.0, v.y * bounce.config.bounce_multiplier));
    ctx.scheduler.schedule_after(
        restore_key,
        bounce.config.effect_duration,
        vec![Action::VerticalVelocity { target: player, vy: baseline }],
    );

    let hold = bounce.config.scale_effect_duration;
    ctx.scheduler.schedule_staged(
        SequenceKey::new(platform, Channel::ScalePulse),
        vec![
            Stage::instant(Action::Scale(bounce.pressed_scale()), hold),
            Stage::instant(Action::Scale(bounce.released_scale()), hold),
        ],
        vec![Action::Scale(bounce.original_scale)],
    );
    log::debug!("platform {:?} bounced player, vy {:.2} -> {:.2}", platform, v.y, v.y * bounce.config.bounce_multiplier);
}
