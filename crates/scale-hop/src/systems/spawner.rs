// systems/spawner.rs
//
// Drag-to-spawn: a UI drag source follows the pointer while dragged, and on
// release a platform of the source's kind is placed at the projected drop
// point. The source always snaps back to its anchor afterwards.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::context::EngineContext;
use crate::api::error::{ensure_positive, ConfigError};
use crate::components::entity::Entity;
use crate::components::layer::LayerMask;
use crate::components::platform::{
    BounceConfig, BounceEffect, FadeConfig, PlatformBehavior, PlatformKind, RotateConfig,
    RotateEffect, SpawnedPlatform,
};
use crate::components::sprite::SpriteComponent;
use crate::core::physics::{BodyDesc, ColliderDesc, ColliderMaterial, PhysicsAdapter};
use crate::core::projection::ScreenProjection;
use crate::input::queue::DragSourceId;

/// One draggable platform button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    pub source: DragSourceId,
    pub kind: PlatformKind,
    /// Transform scale given to spawned platforms.
    pub world_scale: Vec2,
    /// UI canvas scale; drag deltas are divided by it.
    pub canvas_scale_factor: f32,
    /// Bounds of the dragged visual in world units at `world_scale`.
    pub visual_bounds: Vec2,
    /// Opacity of the source while dragging.
    pub drag_alpha: f32,
    /// Resting position of the source in canvas units.
    pub anchored_position: Vec2,
    pub bounce: BounceConfig,
    pub rotate: RotateConfig,
    pub fade: FadeConfig,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            source: DragSourceId(0),
            kind: PlatformKind::Bounce,
            world_scale: Vec2::ONE,
            canvas_scale_factor: 1.0,
            visual_bounds: Vec2::new(2.0, 0.5),
            drag_alpha: 0.6,
            anchored_position: Vec2::ZERO,
            bounce: BounceConfig::default(),
            rotate: RotateConfig::default(),
            fade: FadeConfig::default(),
        }
    }
}

impl SpawnerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("world scale x", self.world_scale.x)?;
        ensure_positive("world scale y", self.world_scale.y)?;
        ensure_positive("canvas scale factor", self.canvas_scale_factor)?;
        match self.kind {
            PlatformKind::Bounce => {
                self.bounce.validate()?;
                self.fade.validate()
            }
            PlatformKind::Fixed => self.fade.validate(),
            PlatformKind::Rotate => Ok(()),
        }
    }

    /// Local collider size: the visual bounds divided by the x component of
    /// the world scale, on both axes.
    pub fn collider_size(&self) -> Vec2 {
        self.visual_bounds / self.world_scale.x
    }
}

/// Gesture state of a drag source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging,
}

/// A drag source and the platforms it creates.
#[derive(Debug, Clone)]
pub struct PlatformSpawner {
    config: SpawnerConfig,
    state: DragState,
    /// Current position of the UI element, canvas units.
    position: Vec2,
    alpha: f32,
    blocks_raycasts: bool,
}

impl PlatformSpawner {
    pub fn new(config: SpawnerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            position: config.anchored_position,
            config,
            state: DragState::Idle,
            alpha: 1.0,
            blocks_raycasts: true,
        })
    }

    pub fn source(&self) -> DragSourceId {
        self.config.source
    }

    pub fn config(&self) -> &SpawnerConfig {
        &self.config
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn blocks_raycasts(&self) -> bool {
        self.blocks_raycasts
    }

    pub fn pointer_down(&mut self) {
        log::debug!("pointer down on {:?}", self.config.source);
    }

    /// Start dragging: the source turns translucent and stops catching rays.
    pub fn begin_drag(&mut self, _delta: Vec2) {
        log::debug!("begin drag on {:?}", self.config.source);
        self.state = DragState::Dragging;
        self.alpha = self.config.drag_alpha;
        self.blocks_raycasts = false;
    }

    /// Move the source by a screen delta, converted to canvas units.
    pub fn on_drag(&mut self, delta: Vec2) {
        if self.state != DragState::Dragging {
            return;
        }
        self.position += delta / self.config.canvas_scale_factor;
    }

    /// Release: project the drop point, spawn a platform there, and restore
    /// the source. A failed projection drops the gesture but still restores.
    pub fn end_drag<P: PhysicsAdapter>(
        &mut self,
        screen_pos: Vec2,
        projection: &dyn ScreenProjection,
        ctx: &mut EngineContext<P>,
    ) -> Option<SpawnedPlatform> {
        if self.state != DragState::Dragging {
            log::debug!("end drag on {:?} without a drag in progress", self.config.source);
            return None;
        }
        log::debug!("end drag on {:?}", self.config.source);

        let spawned = match projection.screen_to_world(screen_pos) {
            Some(world) => Some(self.spawn_platform(world, ctx)),
            None => {
                log::warn!(
                    "dropped gesture on {:?}: {:?} has no world position",
                    self.config.source,
                    screen_pos
                );
                None
            }
        };
        self.restore();
        spawned
    }

    fn restore(&mut self) {
        self.state = DragState::Idle;
        self.position = self.config.anchored_position;
        self.alpha = 1.0;
        self.blocks_raycasts = true;
    }

    /// Create the platform entity and its static body at `world`.
    pub fn spawn_platform<P: PhysicsAdapter>(
        &self,
        world: Vec2,
        ctx: &mut EngineContext<P>,
    ) -> SpawnedPlatform {
        let cfg = &self.config;
        let collider_size = cfg.collider_size();

        let id = ctx.next_id();
        let entity = Entity::new(id)
            .with_tag(cfg.kind.tag())
            .with_scale(cfg.world_scale)
            .with_sprite(SpriteComponent::new(cfg.visual_bounds / cfg.world_scale));
        // The body lives in world space, so the local collider is scaled by
        // the transform per axis.
        let desc = BodyDesc::fixed(ColliderDesc::cuboid(collider_size * cfg.world_scale))
            .with_position(world)
            .with_layers(LayerMask::GROUND);
        ctx.spawn_with_body(entity, desc, ColliderMaterial::default());

        let behavior = match cfg.kind {
            PlatformKind::Bounce => PlatformBehavior::Bounce {
                bounce: BounceEffect::new(cfg.bounce, cfg.world_scale),
                fade: cfg.fade,
            },
            PlatformKind::Fixed => PlatformBehavior::Fixed { fade: cfg.fade },
            PlatformKind::Rotate => PlatformBehavior::Rotate(RotateEffect { config: cfg.rotate }),
        };

        log::info!(
            "spawned {:?} platform {:?} at {:?}, collider {:?}",
            cfg.kind,
            id,
            world,
            collider_size
        );
        SpawnedPlatform {
            id,
            behavior,
            collider_size,
        }
    }
}
