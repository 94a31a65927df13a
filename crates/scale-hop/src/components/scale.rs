// components/scale.rs
//
// Scale factor and the physical parameters derived from it.
// Pure data + derivation rules; the caller pushes the result into physics.

use serde::{Deserialize, Serialize};
use crate::api::error::{ensure_positive, ensure_range, ConfigError};

/// Inclusive `[min, max]` bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    pub min: f32,
    pub max: f32,
}

impl Limits {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        ensure_range(field, self.min, self.max)
    }
}

/// Clamp `current + delta` into `[min, max]`. Out-of-range input is clamped,
/// never rejected.
#[inline]
pub fn apply_scale_delta(current: f32, delta: f32, min: f32, max: f32) -> f32 {
    (current + delta).clamp(min, max)
}

/// `clamp(base / factor, limits)`: larger scale gives a weaker response.
#[inline]
pub fn derive(base: f32, factor: f32, limits: Limits) -> f32 {
    limits.clamp(base / factor)
}

/// Player scale together with its derived parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleState {
    pub factor: f32,
    pub gravity_scale: f32,
    pub jump_speed: f32,
}

/// Derivation rules: bounds on the scale factor and on each derived value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleRules {
    pub scale: Limits,
    pub base_gravity: f32,
    pub gravity: Limits,
    pub base_jump: f32,
    pub jump: Limits,
}

impl Default for ScaleRules {
    fn default() -> Self {
        Self {
            scale: Limits::new(0.25, 3.0),
            base_gravity: 1.0,
            gravity: Limits::new(0.2, 5.0),
            base_jump: 7.0,
            jump: Limits::new(2.0, 20.0),
        }
    }
}

impl ScaleRules {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scale.validate("scale")?;
        ensure_positive("min scale", self.scale.min)?;
        self.gravity.validate("gravity scale")?;
        self.jump.validate("jump speed")?;
        Ok(())
    }

    /// Full state for a given scale factor (clamped into the scale bounds).
    pub fn derive(&self, factor: f32) -> ScaleState {
        let factor = self.scale.clamp(factor);
        ScaleState {
            factor,
            gravity_scale: derive(self.base_gravity, factor, self.gravity),
            jump_speed: derive(self.base_jump, factor, self.jump),
        }
    }

    /// Apply a scale delta and recompute the derived parameters.
    pub fn apply_delta(&self, current: &ScaleState, delta: f32) -> ScaleState {
        let factor = apply_scale_delta(current.factor, delta, self.scale.min, self.scale.max);
        self.derive(factor)
    }

    pub fn at_max(&self, state: &ScaleState) -> bool {
        state.factor >= self.scale.max
    }

    pub fn at_min(&self, state: &ScaleState) -> bool {
        state.factor <= self.scale.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn delta_is_clamped_not_rejected() {
        assert!((apply_scale_delta(2.9, 0.25, 0.25, 3.0) - 3.0).abs() < EPS);
        assert!((apply_scale_delta(0.3, -0.25, 0.25, 3.0) - 0.25).abs() < EPS);
        assert!((apply_scale_delta(1.0, 0.25, 0.25, 3.0) - 1.25).abs() < EPS);
    }

    #[test]
    fn derived_values_follow_inverse_rule() {
        let rules = ScaleRules::default();
        let s = rules.derive(2.0);
        assert!((s.gravity_scale - 0.5).abs() < EPS);
        assert!((s.jump_speed - 3.5).abs() < EPS);

        // 7 / 0.25 = 28 is capped at 20, 1 / 0.25 = 4 stays.
        let s = rules.derive(0.25);
        assert!((s.jump_speed - 20.0).abs() < EPS);
        assert!((s.gravity_scale - 4.0).abs() < EPS);
    }

    #[test]
    fn derived_values_are_non_increasing_over_the_range() {
        let rules = ScaleRules::default();
        let mut prev = rules.derive(rules.scale.min);
        let steps = 200;
        for i in 1..=steps {
            let f = rules.scale.min + (rules.scale.max - rules.scale.min) * i as f32 / steps as f32;
            let next = rules.derive(f);
            assert!(next.gravity_scale <= prev.gravity_scale + EPS, "gravity rose at {f}");
            assert!(next.jump_speed <= prev.jump_speed + EPS, "jump rose at {f}");
            prev = next;
        }
        let top = rules.derive(rules.scale.max);
        assert!(top.gravity_scale <= rules.derive(rules.scale.min).gravity_scale);
    }

    #[test]
    fn apply_delta_stays_within_bounds() {
        let rules = ScaleRules::default();
        let mut s = rules.derive(1.0);
        for _ in 0..50 {
            s = rules.apply_delta(&s, 0.25);
            assert!(s.factor <= rules.scale.max);
        }
        assert!(rules.at_max(&s));
        for _ in 0..50 {
            s = rules.apply_delta(&s, -0.25);
            assert!(s.factor >= rules.scale.min);
        }
        assert!(rules.at_min(&s));
    }

    #[test]
    fn validate_catches_bad_bounds() {
        let mut rules = ScaleRules::default();
        assert!(rules.validate().is_ok());
        rules.scale = Limits::new(0.0, 3.0);
        assert!(rules.validate().is_err());
        rules.scale = Limits::new(0.25, 3.0);
        rules.jump = Limits::new(20.0, 2.0);
        assert!(rules.validate().is_err());
    }
}
