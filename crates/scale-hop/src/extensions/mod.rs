// extensions/mod.rs
//
// Optional helpers decoupled from Entity/Scene.

pub mod easing;

pub use easing::lerp;
