use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::context::EngineContext;
use crate::api::error::{ensure_positive, ConfigError};
use crate::api::types::{EntityId, SideEffect};
use crate::components::entity::Entity;
use crate::components::layer::LayerMask;
use crate::components::sprite::SpriteComponent;
use crate::components::tag::Tag;
use crate::core::physics::{BodyDesc, ColliderDesc, ColliderMaterial, PhysicsAdapter};
use crate::core::projection::ScreenProjection;
use crate::core::scheduler::{Action, Fired};
use crate::input::queue::{InputEvent, InputQueue};
use crate::systems::platforms::PlatformBehaviors;
use crate::systems::player::{PlayerConfig, PlayerController};
use crate::systems::spawner::{PlatformSpawner, SpawnerConfig};

/// A static level object: ground, walls, pickups, zones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropConfig {
    /// Tag name. Unknown names load as untagged and are ignored by dispatch.
    pub tag: String,
    pub position: Vec2,
    pub size: Vec2,
    /// Sensors report triggers; solids collide and sit on the ground layer.
    #[serde(default)]
    pub sensor: bool,
}

/// Everything needed to build a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Y-up: gravity points down.
    pub gravity: Vec2,
    pub player: PlayerConfig,
    pub player_spawn: Vec2,
    pub spawners: Vec<SpawnerConfig>,
    pub props: Vec<PropConfig>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            gravity: Vec2::new(0.0, -9.81),
            player: PlayerConfig::default(),
            player_spawn: Vec2::ZERO,
            spawners: Vec::new(),
            props: Vec::new(),
        }
    }
}

impl LevelConfig {
    /// Parse a level from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: LevelConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("fixed dt", self.fixed_dt)?;
        self.player.validate()?;
        for spawner in &self.spawners {
            spawner.validate()?;
        }
        Ok(())
    }
}

/// One running level: the player, the drag sources, the spawned platforms,
/// and the shared simulation context.
///
/// `step` is the single per-step entry point. Once a terminal side effect
/// (reload or advance) has been emitted the level stops stepping.
pub struct Level<P: PhysicsAdapter> {
    pub ctx: EngineContext<P>,
    player: PlayerController,
    spawners: Vec<PlatformSpawner>,
    platforms: PlatformBehaviors,
    projection: Box<dyn ScreenProjection>,
    input: InputQueue,
    outcome: Option<SideEffect>,
    fixed_dt: f32,
}

impl<P: PhysicsAdapter> Level<P> {
    pub fn new(
        config: LevelConfig,
        physics: P,
        projection: Box<dyn ScreenProjection>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut ctx = EngineContext::new(physics);

        for prop in &config.props {
            spawn_prop(&mut ctx, prop);
        }
        let player = PlayerController::spawn(&mut ctx, config.player, config.player_spawn)?;
        let spawners = config
            .spawners
            .into_iter()
            .map(PlatformSpawner::new)
            .collect::<Result<Vec<_>, _>>()?;

        log::info!(
            "level ready: {} props, {} drag sources",
            config.props.len(),
            spawners.len()
        );
        Ok(Self {
            ctx,
            player,
            spawners,
            platforms: PlatformBehaviors::new(),
            projection,
            input: InputQueue::new(),
            outcome: None,
            fixed_dt: config.fixed_dt,
        })
    }

    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    pub fn platforms(&self) -> &PlatformBehaviors {
        &self.platforms
    }

    pub fn spawners(&self) -> &[PlatformSpawner] {
        &self.spawners
    }

    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// The terminal side effect that ended this level, if any.
    pub fn outcome(&self) -> Option<&SideEffect> {
        self.outcome.as_ref()
    }

    /// Queue a gesture for the next step.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    pub fn drain_effects(&mut self) -> Vec<SideEffect> {
        self.ctx.drain_effects()
    }

    /// Advance the simulation by one step of `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        if self.outcome.is_some() {
            self.input.clear();
            return;
        }

        for event in self.input.drain() {
            self.route_gesture(event);
        }

        self.ctx.step_physics(dt);
        let contacts = self.ctx.take_contacts();
        self.platforms.handle_contacts(&contacts, &mut self.ctx);
        self.player.handle_contacts(&contacts, &mut self.ctx);
        self.player.update(&mut self.ctx);
        self.platforms.rotate(dt, &mut self.ctx);

        let fired = self.ctx.tick_scheduler(dt);
        self.apply(fired);
        self.platforms.prune(&self.ctx.scene);
        self.ctx.clock.advance(dt);
    }

    fn route_gesture(&mut self, event: InputEvent) {
        let source = event.source();
        let Some(spawner) = self.spawners.iter_mut().find(|s| s.source() == source) else {
            log::warn!("gesture for unknown drag source {:?}", source);
            return;
        };
        match event {
            InputEvent::PointerDown { .. } => spawner.pointer_down(),
            InputEvent::BeginDrag { delta, .. } => spawner.begin_drag(delta),
            InputEvent::Drag { delta, .. } => spawner.on_drag(delta),
            InputEvent::EndDrag { screen_pos, .. } => {
                if let Some(platform) =
                    spawner.end_drag(screen_pos, self.projection.as_ref(), &mut self.ctx)
                {
                    self.platforms.attach(platform, &mut self.ctx);
                }
            }
        }
    }

    /// Apply fired sequence actions in order. Actions whose owner was
    /// destroyed earlier in the batch are skipped, and nothing runs after a
    /// terminal effect.
    fn apply(&mut self, fired: Vec<Fired>) {
        let mut destroyed: Vec<EntityId> = Vec::new();
        for Fired { owner, action, .. } in fired {
            if self.outcome.is_some() {
                break;
            }
            if destroyed.contains(&owner) {
                continue;
            }
            match action {
                Action::Tint(color) => self.ctx.set_tint(owner, color),
                Action::Opacity(alpha) => self.ctx.set_opacity(owner, alpha),
                Action::Scale(scale) => self.ctx.set_scale(owner, scale),
                Action::VerticalVelocity { target, vy } => {
                    self.ctx.set_vertical_velocity(target, vy);
                    log::debug!("restored vertical velocity {:.2} on {:?}", vy, target);
                }
                Action::ResumeControl => {
                    if owner == self.player.id() {
                        self.player.resume(&mut self.ctx);
                    }
                }
                Action::Despawn => {
                    self.ctx.despawn(owner);
                    destroyed.push(owner);
                    log::debug!("platform {:?} faded out", owner);
                }
                Action::Emit(effect) => {
                    if effect.is_terminal() {
                        log::info!("level ending: {:?}", effect);
                        self.outcome = Some(effect.clone());
                    }
                    self.ctx.emit(effect);
                }
            }
        }
    }
}

fn spawn_prop<P: PhysicsAdapter>(ctx: &mut EngineContext<P>, prop: &PropConfig) -> EntityId {
    let id = ctx.next_id();
    let tag = Tag::from_name(&prop.tag);
    let shape = ColliderDesc::cuboid(prop.size);
    let desc = if prop.sensor {
        BodyDesc::trigger(shape)
    } else {
        BodyDesc::fixed(shape).with_layers(LayerMask::GROUND)
    };
    let entity = Entity::new(id)
        .with_tag(tag)
        .with_sprite(SpriteComponent::new(prop.size));
    ctx.spawn_with_body(entity, desc.with_position(prop.position), ColliderMaterial::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::physics::{ContactPhase, ScriptedPhysics};
    use crate::core::projection::OrthoProjection;
    use crate::input::queue::DragSourceId;
    use crate::components::platform::PlatformKind;
    use crate::systems::player::LifecycleState;

    const DT: f32 = 0.125;

    fn level(config: LevelConfig) -> Level<ScriptedPhysics> {
        let physics = ScriptedPhysics::new(config.gravity);
        let cam = OrthoProjection::new(Vec2::new(800.0, 600.0), 10.0);
        Level::new(config, physics, Box::new(cam)).unwrap()
    }

    fn find(level: &Level<ScriptedPhysics>, tag: Tag) -> EntityId {
        level.ctx.scene.find_all_by_tag(tag)[0].id
    }

    fn drop_platform(level: &mut Level<ScriptedPhysics>, source: DragSourceId, screen: Vec2) {
        level.push_input(InputEvent::PointerDown { source });
        level.push_input(InputEvent::BeginDrag { source, delta: Vec2::new(1.0, 1.0) });
        level.push_input(InputEvent::Drag { source, delta: Vec2::new(20.0, 5.0) });
        level.push_input(InputEvent::EndDrag { source, screen_pos: screen });
    }

    #[test]
    fn from_json_fills_defaults_and_maps_tags() {
        let json = r#"{
            "fixed_dt": 0.125,
            "player": { "target_min": 2.0 },
            "spawners": [ { "source": 1, "kind": "Fixed", "world_scale": [2.0, 2.0] } ],
            "props": [
                { "tag": "Food", "position": [3.0, 0.0], "size": [0.5, 0.5], "sensor": true },
                { "tag": "Lava", "position": [6.0, 0.0], "size": [1.0, 1.0] }
            ]
        }"#;
        let config = LevelConfig::from_json(json).unwrap();
        assert_eq!(config.fixed_dt, 0.125);
        assert_eq!(config.player.target_min, 2.0);
        assert_eq!(config.player.move_speed, 5.0);
        assert_eq!(config.spawners[0].kind, PlatformKind::Fixed);

        let level = level(config);
        assert_eq!(level.ctx.scene.find_all_by_tag(Tag::Food).len(), 1);
        assert_eq!(level.ctx.scene.find_all_by_tag(Tag::Untagged).len(), 1);
        assert_eq!(level.spawners().len(), 1);
    }

    #[test]
    fn from_json_rejects_bad_input() {
        assert!(matches!(LevelConfig::from_json("{ nope"), Err(ConfigError::Json(_))));
        let err = LevelConfig::from_json(r#"{ "player": { "min_scale": 4.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRange { .. }));
        let err = LevelConfig::from_json(r#"{ "player": { "ground_check": null } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCollaborator(_)));
    }

    #[test]
    fn drag_gesture_spawns_platform_that_fades() {
        let config = LevelConfig {
            spawners: vec![SpawnerConfig {
                source: DragSourceId(7),
                kind: PlatformKind::Fixed,
                ..SpawnerConfig::default()
            }],
            ..LevelConfig::default()
        };
        let mut level = level(config);
        drop_platform(&mut level, DragSourceId(7), Vec2::new(400.0, 300.0));
        level.step(DT);

        assert_eq!(level.platforms().len(), 1);
        let id = level.platforms().iter().next().unwrap().id;
        assert_eq!(level.ctx.scene.get(id).unwrap().pos, Vec2::ZERO);
        assert_eq!(level.spawners()[0].position(), Vec2::ZERO);

        for _ in 0..62 {
            level.step(DT);
        }
        assert!(level.ctx.scene.contains(id));
        level.step(DT);
        assert!(!level.ctx.scene.contains(id));
        assert!(level.platforms().is_empty());
    }

    #[test]
    fn unknown_drag_source_is_ignored() {
        let mut level = level(LevelConfig::default());
        drop_platform(&mut level, DragSourceId(99), Vec2::ZERO);
        level.step(DT);
        assert!(level.platforms().is_empty());
    }

    #[test]
    fn trap_reloads_once_and_level_stops() {
        let config = LevelConfig {
            props: vec![PropConfig {
                tag: "Trap".into(),
                position: Vec2::new(40.0, 0.0),
                size: Vec2::ONE,
                sensor: true,
            }],
            ..LevelConfig::default()
        };
        let mut level = level(config);
        let trap = find(&level, Tag::Trap);
        let player = level.player().id();
        level.ctx.physics.push_trigger(player, trap);
        level.step(DT);
        assert_eq!(level.player().state(), LifecycleState::Dying);

        let mut effects = level.drain_effects();
        for _ in 0..40 {
            level.ctx.physics.push_trigger(player, trap);
            level.step(DT);
            effects.extend(level.drain_effects());
        }
        let reloads = effects.iter().filter(|e| **e == SideEffect::ReloadLevel).count();
        assert_eq!(reloads, 1);
        assert_eq!(level.outcome(), Some(&SideEffect::ReloadLevel));
        let steps = level.ctx.clock.steps();
        level.step(DT);
        assert_eq!(level.ctx.clock.steps(), steps);
    }

    #[test]
    fn bounce_platform_boosts_before_player_moves() {
        let config = LevelConfig {
            gravity: Vec2::ZERO,
            spawners: vec![SpawnerConfig { source: DragSourceId(1), ..SpawnerConfig::default() }],
            ..LevelConfig::default()
        };
        let mut level = level(config);
        drop_platform(&mut level, DragSourceId(1), Vec2::new(400.0, 500.0));
        level.step(DT);
        let pad = level.platforms().iter().next().unwrap().id;
        assert_eq!(level.ctx.scene.tag_of(pad), Tag::BouncingPlatform);

        let player = level.player().id();
        level.ctx.physics.set_overlap_override(Some(false));
        level.ctx.set_velocity(player, Vec2::new(0.0, -4.0));
        level.ctx.physics.push_collision(player, pad, ContactPhase::Started, Vec2::Y);
        level.step(DT);

        // Solid contact with the pad means nothing to the player's dispatch:
        // only the bounce applies, then the walk sets the horizontal speed.
        assert_eq!(level.ctx.velocity(player), Vec2::new(5.0, -12.0));
        for _ in 0..8 {
            level.step(DT);
        }
        assert_eq!(level.ctx.velocity(player).y, -4.0);
    }

    #[test]
    fn bounce_stops_a_player_held_at_checkpoint() {
        let config = LevelConfig {
            gravity: Vec2::ZERO,
            spawners: vec![SpawnerConfig { source: DragSourceId(1), ..SpawnerConfig::default() }],
            props: vec![PropConfig {
                tag: "CheckPoint".into(),
                position: Vec2::new(40.0, 0.0),
                size: Vec2::ONE,
                sensor: true,
            }],
            ..LevelConfig::default()
        };
        let mut level = level(config);
        drop_platform(&mut level, DragSourceId(1), Vec2::new(400.0, 500.0));
        let cp = find(&level, Tag::CheckPoint);
        let player = level.player().id();
        level.ctx.physics.push_trigger(player, cp);
        level.step(DT);
        assert_eq!(level.player().state(), LifecycleState::AtCheckpoint);

        let pad = level.platforms().iter().next().unwrap().id;
        level.ctx.set_velocity(player, Vec2::new(5.0, -4.0));
        level.ctx.physics.push_collision(player, pad, ContactPhase::Started, Vec2::Y);
        level.step(DT);
        assert_eq!(level.ctx.velocity(player), Vec2::new(0.0, -12.0));
    }

    #[test]
    fn gestures_after_the_level_ends_are_discarded() {
        let config = LevelConfig {
            spawners: vec![SpawnerConfig { source: DragSourceId(1), ..SpawnerConfig::default() }],
            props: vec![PropConfig {
                tag: "Trap".into(),
                position: Vec2::new(40.0, 0.0),
                size: Vec2::ONE,
                sensor: true,
            }],
            ..LevelConfig::default()
        };
        let mut level = level(config);
        let trap = find(&level, Tag::Trap);
        let player = level.player().id();
        level.ctx.physics.push_trigger(player, trap);
        for _ in 0..40 {
            level.step(DT);
        }
        assert_eq!(level.outcome(), Some(&SideEffect::ReloadLevel));

        drop_platform(&mut level, DragSourceId(1), Vec2::new(400.0, 300.0));
        level.step(DT);
        assert!(level.input.is_empty());
        assert!(level.platforms().is_empty());
    }

    #[test]
    fn checkpoint_success_advances_level() {
        let config = LevelConfig {
            props: vec![PropConfig {
                tag: "CheckPoint".into(),
                position: Vec2::new(40.0, 0.0),
                size: Vec2::ONE,
                sensor: true,
            }],
            ..LevelConfig::default()
        };
        let mut level = level(config);
        let cp = find(&level, Tag::CheckPoint);
        let player = level.player().id();
        level.ctx.physics.push_trigger(player, cp);
        for _ in 0..24 {
            level.step(DT);
        }
        assert_eq!(level.outcome(), Some(&SideEffect::AdvanceToNextLevel));
    }
}
