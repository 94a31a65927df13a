// systems/player.rs
//
// Scale-adaptive player controller.
//
// Each step the player auto-walks in its facing direction and auto-hops
// whenever grounded. Contacts are dispatched by the other body's tag:
// pickups change the scale factor (and with it gravity and jump), the
// checkpoint freezes control and judges the scale against a target range,
// traps run the death fade, and the finish line advances the level.
//
// Usage:
//   let mut player = PlayerController::spawn(&mut ctx, config, spawn_pos)?;
//   // each step, after physics:
//   player.handle_contacts(&contacts, &mut ctx);
//   player.update(&mut ctx);

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::context::EngineContext;
use crate::api::error::{ensure_positive, ensure_range, ConfigError};
use crate::api::types::{EntityId, Rgba, SideEffect, SoundEvent, TextLabel};
use crate::components::entity::Entity;
use crate::components::layer::LayerMask;
use crate::components::scale::{Limits, ScaleRules, ScaleState};
use crate::components::sprite::SpriteComponent;
use crate::components::tag::Tag;
use crate::core::physics::{
    BodyDesc, ColliderDesc, ColliderMaterial, ContactEvent, ContactKind, ContactPhase,
    PhysicsAdapter,
};
use crate::core::scheduler::{Action, Channel, SequenceKey, Stage};

pub const WIN_TEXT: &str = "Congrats, you win!";
pub const RETRY_TEXT: &str = "Haven't reached the target, go back and try to control your weight.";

/// A contact normal counts as ground when its y component exceeds this.
const GROUND_NORMAL_Y: f32 = 0.5;

/// Probe point and radius for the grounded check, relative to the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundCheck {
    /// Offset from the player's center at scale 1. Scales with the player.
    pub offset: Vec2,
    pub radius: f32,
}

impl Default for GroundCheck {
    fn default() -> Self {
        Self {
            offset: Vec2::new(0.0, -0.5),
            radius: 0.2,
        }
    }
}

/// Player tuning. Defaults are the shipped game's values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub move_speed: f32,
    /// Jump speed at scale 1.
    pub jump_speed: f32,
    /// Gravity scale at scale 1.
    pub base_gravity_scale: f32,
    pub ground_check: Option<GroundCheck>,
    pub ground_mask: LayerMask,
    pub scale_step: f32,
    pub initial_scale: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub min_gravity_scale: f32,
    pub max_gravity_scale: f32,
    pub min_jump_speed: f32,
    pub max_jump_speed: f32,
    /// Inclusive checkpoint target range.
    pub target_min: f32,
    pub target_max: f32,
    /// Jump multiplier for bouncing-platform triggers.
    pub bounce_factor: f32,
    pub checkpoint_delay: f32,
    pub finish_delay: f32,
    /// Hold on the dead tint before the fade.
    pub death_hold: f32,
    pub death_fade_duration: f32,
    /// Opacity decrement per fade stage.
    pub death_fade_step: f32,
    pub dead_tint: Rgba,
    /// Collider shape at scale 1.
    pub base_shape: ColliderDesc,
    pub sprite_size: Vec2,
    /// Transform scale at scale 1.
    pub visual_scale: Vec2,
    pub scale_label: Option<TextLabel>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        let rules = ScaleRules::default();
        Self {
            move_speed: 5.0,
            jump_speed: rules.base_jump,
            base_gravity_scale: rules.base_gravity,
            ground_check: Some(GroundCheck::default()),
            ground_mask: LayerMask::GROUND,
            scale_step: 0.25,
            initial_scale: 1.0,
            min_scale: rules.scale.min,
            max_scale: rules.scale.max,
            min_gravity_scale: rules.gravity.min,
            max_gravity_scale: rules.gravity.max,
            min_jump_speed: rules.jump.min,
            max_jump_speed: rules.jump.max,
            target_min: 0.0,
            target_max: 3.2,
            bounce_factor: 2.0,
            checkpoint_delay: 3.0,
            finish_delay: 2.0,
            death_hold: 1.0,
            death_fade_duration: 1.0,
            death_fade_step: 0.05,
            dead_tint: Rgba::BLACK,
            base_shape: ColliderDesc::Ball { radius: 0.5 },
            sprite_size: Vec2::ONE,
            visual_scale: Vec2::ONE,
            scale_label: Some(TextLabel::ScaleText),
        }
    }
}

impl PlayerConfig {
    pub fn rules(&self) -> ScaleRules {
        ScaleRules {
            scale: Limits::new(self.min_scale, self.max_scale),
            base_gravity: self.base_gravity_scale,
            gravity: Limits::new(self.min_gravity_scale, self.max_gravity_scale),
            base_jump: self.jump_speed,
            jump: Limits::new(self.min_jump_speed, self.max_jump_speed),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let check = self
            .ground_check
            .ok_or(ConfigError::MissingCollaborator("ground check"))?;
        if self.scale_label.is_none() {
            return Err(ConfigError::MissingCollaborator("scale text"));
        }
        ensure_positive("ground check radius", check.radius)?;
        self.rules().validate()?;
        ensure_range("checkpoint target", self.target_min, self.target_max)?;
        ensure_positive("scale step", self.scale_step)?;
        ensure_positive("checkpoint delay", self.checkpoint_delay)?;
        ensure_positive("finish delay", self.finish_delay)?;
        ensure_positive("death fade duration", self.death_fade_duration)?;
        ensure_positive("death fade step", self.death_fade_step)?;
        ensure_positive("initial scale", self.initial_scale)?;
        Ok(())
    }
}

/// Which phase of a life the player is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Walking and hopping.
    Active,
    /// Frozen on a checkpoint while the outcome is shown.
    AtCheckpoint,
    /// Death fade running; ends in a level reload.
    Dying,
}

/// How the player reacts to a contact. Declaration order is the order
/// reactions apply within one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Reaction {
    Grow,
    Shrink,
    Checkpoint,
    Trap,
    Finish,
    Bounce,
    GroundJump,
    Flip,
}

/// Tag dispatch table. Anything not listed is ignored.
const DISPATCH: &[(Tag, ContactKind, Reaction)] = &[
    (Tag::Food, ContactKind::Trigger, Reaction::Grow),
    (Tag::LostWeight, ContactKind::Trigger, Reaction::Shrink),
    (Tag::CheckPoint, ContactKind::Trigger, Reaction::Checkpoint),
    (Tag::Trap, ContactKind::Trigger, Reaction::Trap),
    (Tag::Finish, ContactKind::Trigger, Reaction::Finish),
    (Tag::BouncingPlatform, ContactKind::Trigger, Reaction::Bounce),
    (Tag::Ground, ContactKind::Collision, Reaction::GroundJump),
    (Tag::Obstacle, ContactKind::Collision, Reaction::Flip),
];

fn reaction_for(tag: Tag, kind: ContactKind) -> Option<Reaction> {
    DISPATCH
        .iter()
        .find(|(t, k, _)| *t == tag && *k == kind)
        .map(|&(_, _, r)| r)
}

/// Player state owner. The only writer of the player's velocity, scale and
/// lifecycle during a step.
#[derive(Debug, Clone)]
pub struct PlayerController {
    id: EntityId,
    config: PlayerConfig,
    ground_check: GroundCheck,
    label: TextLabel,
    rules: ScaleRules,
    scale: ScaleState,
    facing_right: bool,
    state: LifecycleState,
    finish_reached: bool,
}

impl PlayerController {
    /// Validate `config`, create the player entity and body at `position`,
    /// and publish the initial scale text.
    pub fn spawn<P: PhysicsAdapter>(
        ctx: &mut EngineContext<P>,
        config: PlayerConfig,
        position: Vec2,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let ground_check = config
            .ground_check
            .ok_or(ConfigError::MissingCollaborator("ground check"))?;
        let label = config
            .scale_label
            .ok_or(ConfigError::MissingCollaborator("scale text"))?;
        let rules = config.rules();
        let scale = rules.derive(config.initial_scale);

        let id = ctx.next_id();
        let entity = Entity::new(id)
            .with_tag(Tag::Player)
            .with_scale(config.visual_scale * scale.factor)
            .with_sprite(SpriteComponent::new(config.sprite_size));
        let desc = BodyDesc::dynamic(config.base_shape.scaled(scale.factor))
            .with_position(position)
            .with_gravity_scale(scale.gravity_scale)
            .with_fixed_rotation(true)
            .with_layers(LayerMask::PLAYER);
        ctx.spawn_with_body(entity, desc, ColliderMaterial::default());

        let player = Self {
            id,
            config,
            ground_check,
            label,
            rules,
            scale,
            facing_right: true,
            state: LifecycleState::Active,
            finish_reached: false,
        };
        player.publish_scale_text(ctx);
        log::info!("player {:?} spawned at {:?}, scale {:.2}", id, position, scale.factor);
        Ok(player)
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn scale(&self) -> ScaleState {
        self.scale
    }

    pub fn facing_right(&self) -> bool {
        self.facing_right
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Per-step movement: grounded check (hop) and constant-speed walk.
    /// Does nothing unless `Active`.
    pub fn update<P: PhysicsAdapter>(&mut self, ctx: &mut EngineContext<P>) {
        if self.state != LifecycleState::Active {
            return;
        }
        if self.is_grounded(ctx) {
            self.jump(ctx);
        }
        self.walk(ctx);
    }

    /// Dispatch this step's contacts involving the player.
    pub fn handle_contacts<P: PhysicsAdapter>(
        &mut self,
        contacts: &[ContactEvent],
        ctx: &mut EngineContext<P>,
    ) {
        let mut reactions: Vec<(Reaction, EntityId, ContactPhase, Vec<Vec2>)> = contacts
            .iter()
            .filter_map(|c| {
                let (other, normals) = c.seen_from(self.id)?;
                let reaction = reaction_for(ctx.scene.tag_of(other), c.kind)?;
                Some((reaction, other, c.phase, normals))
            })
            .collect();
        reactions.sort_by_key(|r| r.0);

        for (reaction, other, phase, normals) in reactions {
            self.react(reaction, other, phase, &normals, ctx);
        }
    }

    fn react<P: PhysicsAdapter>(
        &mut self,
        reaction: Reaction,
        other: EntityId,
        phase: ContactPhase,
        normals: &[Vec2],
        ctx: &mut EngineContext<P>,
    ) {
        // Triggers react on entry only.
        let entering = phase == ContactPhase::Started;
        let active = self.state == LifecycleState::Active;
        match reaction {
            Reaction::Grow if entering => self.pickup(other, self.config.scale_step, ctx),
            Reaction::Shrink if entering => self.pickup(other, -self.config.scale_step, ctx),
            Reaction::Checkpoint if entering => self.enter_checkpoint(ctx),
            Reaction::Trap if entering => self.enter_trap(ctx),
            Reaction::Finish if entering => self.reach_finish(other, ctx),
            Reaction::Bounce if entering && active => {
                let vy = self.scale.jump_speed * self.config.bounce_factor;
                ctx.set_vertical_velocity(self.id, vy);
            }
            Reaction::GroundJump if active && phase != ContactPhase::Stopped => {
                if normals.iter().any(|n| n.y > GROUND_NORMAL_Y) {
                    self.jump(ctx);
                }
            }
            Reaction::Flip if entering && active => self.flip(ctx),
            _ => {}
        }
    }

    /// Food and lost-weight pickups. The pickup is consumed even when the
    /// scale is already at its bound.
    fn pickup<P: PhysicsAdapter>(&mut self, item: EntityId, delta: f32, ctx: &mut EngineContext<P>) {
        if !ctx.scene.contains(item) {
            return;
        }
        let next = self.rules.apply_delta(&self.scale, delta);
        if next.factor != self.scale.factor {
            self.scale = next;
            self.apply_scale(ctx);
        }
        ctx.despawn(item);
    }

    /// Push the current scale into the transform, body and text.
    fn apply_scale<P: PhysicsAdapter>(&self, ctx: &mut EngineContext<P>) {
        let factor = self.scale.factor;
        ctx.set_scale(self.id, self.visual_scale());
        ctx.physics.set_gravity_scale(self.id, self.scale.gravity_scale);
        ctx.physics.set_shape(self.id, self.config.base_shape.scaled(factor));
        self.publish_scale_text(ctx);
        log::debug!(
            "player scale adjusted to {:.2} (gravity {:.2}, jump {:.2})",
            factor,
            self.scale.gravity_scale,
            self.scale.jump_speed
        );
    }

    fn visual_scale(&self) -> Vec2 {
        let s = self.config.visual_scale.abs() * self.scale.factor;
        let dir = if self.facing_right { 1.0 } else { -1.0 };
        Vec2::new(s.x * dir, s.y)
    }

    /// "Scale: 1.25x", with a note at either bound.
    pub fn scale_text(&self) -> String {
        let mut text = format!("Scale: {:.2}x", self.scale.factor);
        if self.rules.at_max(&self.scale) {
            text.push_str(" (You have reached the maximum scale!)");
        } else if self.rules.at_min(&self.scale) {
            text.push_str(" (You have reached the minimum scale!)");
        }
        text
    }

    fn publish_scale_text<P: PhysicsAdapter>(&self, ctx: &mut EngineContext<P>) {
        ctx.set_text(self.label, self.scale_text());
    }

    /// Whether the scale factor lies inside the inclusive target range.
    pub fn on_target(&self) -> bool {
        Limits::new(self.config.target_min, self.config.target_max).contains(self.scale.factor)
    }

    fn enter_checkpoint<P: PhysicsAdapter>(&mut self, ctx: &mut EngineContext<P>) {
        if self.state != LifecycleState::Active {
            return;
        }
        self.state = LifecycleState::AtCheckpoint;
        let key = SequenceKey::new(self.id, Channel::Checkpoint);
        let delay = self.config.checkpoint_delay;
        if self.on_target() {
            log::info!("checkpoint passed at scale {:.2}", self.scale.factor);
            ctx.set_text(self.label, WIN_TEXT);
            ctx.scheduler
                .schedule_after(key, delay, vec![Action::Emit(SideEffect::AdvanceToNextLevel)]);
        } else {
            log::info!("checkpoint missed at scale {:.2}", self.scale.factor);
            ctx.set_text(self.label, RETRY_TEXT);
            ctx.scheduler.schedule_after(key, delay, vec![Action::ResumeControl]);
        }
    }

    /// End of a failed checkpoint hold: restore the readout and control.
    pub fn resume<P: PhysicsAdapter>(&mut self, ctx: &mut EngineContext<P>) {
        if self.state != LifecycleState::AtCheckpoint {
            return;
        }
        self.state = LifecycleState::Active;
        self.publish_scale_text(ctx);
        log::debug!("player control resumed");
    }

    fn enter_trap<P: PhysicsAdapter>(&mut self, ctx: &mut EngineContext<P>) {
        if self.state == LifecycleState::Dying {
            return;
        }
        self.state = LifecycleState::Dying;
        ctx.scheduler.cancel(SequenceKey::new(self.id, Channel::Checkpoint));
        ctx.scheduler.schedule_staged(
            SequenceKey::new(self.id, Channel::Death),
            self.death_stages(),
            vec![Action::Opacity(0.0), Action::Emit(SideEffect::ReloadLevel)],
        );
        log::info!("player hit a trap");
    }

    /// Dead tint and hold, then opacity steps 1, 1 - step, ... down to zero.
    fn death_stages(&self) -> Vec<Stage> {
        let step = self.config.death_fade_step;
        let hold = self.config.death_fade_duration * step;
        let mut stages = vec![Stage::instant(Action::Tint(self.config.dead_tint), self.config.death_hold)];
        let mut alpha = 1.0f32;
        while alpha > 1e-4 {
            stages.push(Stage::instant(Action::Opacity(alpha), hold));
            alpha -= step;
        }
        stages
    }

    fn reach_finish<P: PhysicsAdapter>(&mut self, zone: EntityId, ctx: &mut EngineContext<P>) {
        if self.finish_reached || self.state == LifecycleState::Dying {
            return;
        }
        self.finish_reached = true;
        ctx.emit(SideEffect::PlaySound(SoundEvent::FINISH));
        ctx.scheduler.schedule_after(
            SequenceKey::new(zone, Channel::Finish),
            self.config.finish_delay,
            vec![Action::Emit(SideEffect::AdvanceToNextLevel)],
        );
        log::info!("finish line reached");
    }

    fn is_grounded<P: PhysicsAdapter>(&self, ctx: &EngineContext<P>) -> bool {
        let Some((pos, _)) = ctx.physics.pose(self.id) else {
            return false;
        };
        let offset = self.ground_check.offset * self.config.visual_scale.abs() * self.scale.factor;
        ctx.physics
            .overlap_circle(pos + offset, self.ground_check.radius, self.config.ground_mask)
    }

    fn jump<P: PhysicsAdapter>(&self, ctx: &mut EngineContext<P>) {
        ctx.set_vertical_velocity(self.id, self.scale.jump_speed);
    }

    fn walk<P: PhysicsAdapter>(&self, ctx: &mut EngineContext<P>) {
        let dir = if self.facing_right { 1.0 } else { -1.0 };
        let v = ctx.velocity(self.id);
        ctx.set_velocity(self.id, Vec2::new(self.config.move_speed * dir, v.y));
    }

    fn flip<P: PhysicsAdapter>(&mut self, ctx: &mut EngineContext<P>) {
        self.facing_right = !self.facing_right;
        ctx.set_scale(self.id, self.visual_scale());
    }
}
