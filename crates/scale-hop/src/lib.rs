pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod input;
pub mod extensions;

// Re-export key types at crate root for convenience
pub use api::context::EngineContext;
pub use api::error::ConfigError;
pub use api::level::{Level, LevelConfig, PropConfig};
pub use api::runner::LevelRunner;
pub use api::types::{EntityId, Rgba, SideEffect, SoundEvent, TextLabel};
pub use components::entity::Entity;
pub use components::layer::LayerMask;
pub use components::platform::{
    BounceConfig, BounceEffect, FadeConfig, PlatformBehavior, PlatformKind, RotateConfig,
    RotateEffect, SpawnedPlatform,
};
pub use components::scale::{apply_scale_delta, Limits, ScaleRules, ScaleState};
pub use components::sprite::SpriteComponent;
pub use components::tag::Tag;
pub use core::physics::{
    BodyDesc, BodyType, ColliderDesc, ColliderMaterial, ContactEvent, ContactKind, ContactPhase,
    PhysicsAdapter, ScriptedPhysics,
};
pub use core::projection::{OrthoProjection, ScreenProjection};
pub use core::scene::Scene;
pub use core::scheduler::{Action, Channel, Fired, Ramp, Scheduler, SequenceKey, Stage};
pub use core::time::{FixedTimestep, SimClock};
pub use input::queue::{DragSourceId, InputEvent, InputQueue};
pub use systems::platforms::PlatformBehaviors;
pub use systems::player::{GroundCheck, LifecycleState, PlayerConfig, PlayerController};
pub use systems::spawner::{DragState, PlatformSpawner, SpawnerConfig};

#[cfg(feature = "physics")]
pub use core::physics::PhysicsWorld;

// Extensions: decoupled optional helpers
pub use extensions::lerp;
