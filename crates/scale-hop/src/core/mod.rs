pub mod physics;
pub mod projection;
pub mod scene;
pub mod scheduler;
pub mod time;
