pub mod entity;
pub mod layer;
pub mod platform;
pub mod scale;
pub mod sprite;
pub mod tag;
