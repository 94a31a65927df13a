pub mod platforms;
pub mod player;
pub mod spawner;
