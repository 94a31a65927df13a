// extensions/easing.rs
//
// Interpolation for ramped sequence stages (fades).
// No dependencies on Entity/Scene, just math.

/// Linearly interpolate between two values, with `t` clamped into [0, 1].
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}
