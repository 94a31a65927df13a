pub mod context;
pub mod error;
pub mod level;
pub mod runner;
pub mod types;
