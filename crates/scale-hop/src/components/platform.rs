// components/platform.rs
//
// Data for user-spawned platforms. Each platform is a kind-tagged variant
// built once at spawn time; the behavior logic lives in systems/platforms.rs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::error::{ensure_positive, ConfigError};
use crate::api::types::EntityId;
use crate::components::tag::Tag;

/// Which platform a drag source spawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlatformKind {
    /// Bounces the player, pulses its scale, fades out.
    #[default]
    Bounce,
    /// Plain ground that fades out.
    Fixed,
    /// Permanent spinning obstacle.
    Rotate,
}

impl PlatformKind {
    /// Collision tag the spawned platform carries.
    pub fn tag(self) -> Tag {
        match self {
            PlatformKind::Bounce => Tag::BouncingPlatform,
            PlatformKind::Fixed => Tag::Ground,
            PlatformKind::Rotate => Tag::Obstacle,
        }
    }
}

/// Bounce tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BounceConfig {
    /// Multiplier applied to the player's vertical velocity on contact.
    pub bounce_multiplier: f32,
    /// Seconds until the pre-bounce vertical velocity is restored.
    pub effect_duration: f32,
    /// Hold time of each scale-pulse stage.
    pub scale_effect_duration: f32,
    /// Scale multiplier while pressed (wide, flat).
    pub pressed_mul: Vec2,
    /// Scale multiplier on release (narrow, tall).
    pub released_mul: Vec2,
}

impl Default for BounceConfig {
    fn default() -> Self {
        Self {
            bounce_multiplier: 3.0,
            effect_duration: 1.0,
            scale_effect_duration: 0.5,
            pressed_mul: Vec2::new(1.5, 0.5),
            released_mul: Vec2::new(0.5, 1.5),
        }
    }
}

impl BounceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("bounce effect duration", self.effect_duration)?;
        ensure_positive("bounce scale effect duration", self.scale_effect_duration)?;
        Ok(())
    }
}

/// Rotation tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotateConfig {
    pub speed_degrees: f32,
    pub clockwise: bool,
}

impl Default for RotateConfig {
    fn default() -> Self {
        Self {
            speed_degrees: 100.0,
            clockwise: true,
        }
    }
}

impl RotateConfig {
    /// Signed angular velocity in radians per second. Clockwise is negative.
    pub fn angular_velocity(&self) -> f32 {
        let dir = if self.clockwise { -1.0 } else { 1.0 };
        self.speed_degrees.to_radians() * dir
    }
}

/// Delayed fade-out ending in destruction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FadeConfig {
    /// Seconds after creation before the fade starts.
    pub delay: f32,
    /// Length of the linear fade to zero.
    pub duration: f32,
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            delay: 7.0,
            duration: 1.0,
        }
    }
}

impl FadeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.delay >= 0.0) {
            return Err(ConfigError::NonPositive { field: "fade delay", value: self.delay });
        }
        ensure_positive("fade duration", self.duration)
    }

    /// Total lifetime from creation to destruction.
    pub fn lifetime(&self) -> f32 {
        self.delay + self.duration
    }
}

/// Per-platform bounce state.
#[derive(Debug, Clone, PartialEq)]
pub struct BounceEffect {
    pub config: BounceConfig,
    /// Scale at creation. Every pulse starts from and returns to this.
    pub original_scale: Vec2,
    /// Vertical velocity recorded by the contact that started the pending
    /// restore.
    pub baseline_vy: Option<f32>,
}

impl BounceEffect {
    pub fn new(config: BounceConfig, original_scale: Vec2) -> Self {
        Self {
            config,
            original_scale,
            baseline_vy: None,
        }
    }

    pub fn pressed_scale(&self) -> Vec2 {
        self.original_scale * self.config.pressed_mul
    }

    pub fn released_scale(&self) -> Vec2 {
        self.original_scale * self.config.released_mul
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RotateEffect {
    pub config: RotateConfig,
}

/// Behaviors attached to a platform, one variant per kind.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformBehavior {
    Bounce { bounce: BounceEffect, fade: FadeConfig },
    Fixed { fade: FadeConfig },
    Rotate(RotateEffect),
}

impl PlatformBehavior {
    pub fn kind(&self) -> PlatformKind {
        match self {
            PlatformBehavior::Bounce { .. } => PlatformKind::Bounce,
            PlatformBehavior::Fixed { .. } => PlatformKind::Fixed,
            PlatformBehavior::Rotate(_) => PlatformKind::Rotate,
        }
    }

    /// The fade lifecycle, if this kind has one. Rotate platforms are permanent.
    pub fn fade(&self) -> Option<FadeConfig> {
        match self {
            PlatformBehavior::Bounce { fade, .. } | PlatformBehavior::Fixed { fade } => Some(*fade),
            PlatformBehavior::Rotate(_) => None,
        }
    }
}

/// A platform placed in the world by a drag gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnedPlatform {
    pub id: EntityId,
    pub behavior: PlatformBehavior,
    /// Collider size in the platform's local space.
    pub collider_size: Vec2,
}

impl SpawnedPlatform {
    pub fn kind(&self) -> PlatformKind {
        self.behavior.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_tags() {
        assert_eq!(PlatformKind::Bounce.tag(), Tag::BouncingPlatform);
        assert_eq!(PlatformKind::Fixed.tag(), Tag::Ground);
        assert_eq!(PlatformKind::Rotate.tag(), Tag::Obstacle);
    }

    #[test]
    fn clockwise_rotation_is_negative() {
        let cw = RotateConfig::default();
        assert!((cw.angular_velocity() + 100f32.to_radians()).abs() < 1e-6);
        let ccw = RotateConfig { clockwise: false, ..cw };
        assert!(ccw.angular_velocity() > 0.0);
    }

    #[test]
    fn only_rotate_is_permanent() {
        let fade = FadeConfig::default();
        let bounce = PlatformBehavior::Bounce {
            bounce: BounceEffect::new(BounceConfig::default(), Vec2::ONE),
            fade,
        };
        assert_eq!(bounce.fade(), Some(fade));
        assert_eq!(PlatformBehavior::Fixed { fade }.fade(), Some(fade));
        let rotate = PlatformBehavior::Rotate(RotateEffect { config: RotateConfig::default() });
        assert_eq!(rotate.fade(), None);
        assert_eq!(rotate.kind(), PlatformKind::Rotate);
        assert_eq!(fade.lifetime(), 8.0);
    }

    #[test]
    fn pulse_scales_derive_from_original() {
        let effect = BounceEffect::new(BounceConfig::default(), Vec2::new(2.0, 1.0));
        assert_eq!(effect.pressed_scale(), Vec2::new(3.0, 0.5));
        assert_eq!(effect.released_scale(), Vec2::new(1.0, 1.5));
    }

    #[test]
    fn invalid_durations_rejected() {
        let bad = FadeConfig { delay: -1.0, duration: 1.0 };
        assert!(bad.validate().is_err());
        let bad = BounceConfig { effect_duration: 0.0, ..BounceConfig::default() };
        assert!(bad.validate().is_err());
        assert!(FadeConfig::default().validate().is_ok());
    }
}
