use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Unique identifier for an entity in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// A sound cue emitted by the game logic.
/// The numeric value maps to a clip in the host's audio layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(transparent)]
pub struct SoundEvent(pub u32);

impl SoundEvent {
    /// Played once when the player crosses the finish line.
    pub const FINISH: SoundEvent = SoundEvent(1);
}

/// Linear RGBA color, components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::WHITE
    }
}

/// UI text sinks the core writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextLabel {
    /// The "Scale: 1.00x" readout, also used for checkpoint messages.
    ScaleText,
}

/// Fire-and-forget calls into the presentation and scene-lifecycle layers.
///
/// The core never consumes a return value from these; the host drains them
/// after each frame and forwards them to its renderer, audio and scene loader.
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    SetText { label: TextLabel, text: String },
    SetTint { entity: EntityId, color: Rgba },
    SetOpacity { entity: EntityId, alpha: f32 },
    SetScale { entity: EntityId, scale: Vec2 },
    PlaySound(SoundEvent),
    /// Terminal: restart the current level.
    ReloadLevel,
    /// Terminal: load the next level.
    AdvanceToNextLevel,
}

impl SideEffect {
    /// Whether this effect ends the core's interest in the current level.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SideEffect::ReloadLevel | SideEffect::AdvanceToNextLevel)
    }
}
