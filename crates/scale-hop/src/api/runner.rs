use crate::api::level::Level;
use crate::api::types::SideEffect;
use crate::core::physics::PhysicsAdapter;
use crate::core::time::FixedTimestep;
use crate::input::queue::InputEvent;

/// Host-facing loop driver.
///
/// The host calls `tick` once per rendered frame with the frame's wall-clock
/// delta; the runner turns it into whole fixed steps of the level and hands
/// back the side effects those steps produced.
pub struct LevelRunner<P: PhysicsAdapter> {
    level: Level<P>,
    timestep: FixedTimestep,
}

impl<P: PhysicsAdapter> LevelRunner<P> {
    pub fn new(level: Level<P>) -> Self {
        let timestep = FixedTimestep::new(level.fixed_dt());
        Self { level, timestep }
    }

    pub fn level(&self) -> &Level<P> {
        &self.level
    }

    pub fn level_mut(&mut self) -> &mut Level<P> {
        &mut self.level
    }

    /// Push a gesture; it is routed at the start of the next fixed step.
    pub fn push_input(&mut self, event: InputEvent) {
        self.level.push_input(event);
    }

    /// Run one frame: as many fixed steps as the accumulated time allows
    /// (at most 10), then drain the frame's side effects.
    pub fn tick(&mut self, frame_dt: f32) -> Vec<SideEffect> {
        let steps = self.timestep.accumulate(frame_dt);
        for _ in 0..steps {
            self.level.step(self.timestep.dt());
        }
        self.level.drain_effects()
    }

    /// Interpolation alpha for rendering between steps.
    pub fn alpha(&self) -> f32 {
        self.timestep.alpha()
    }

    /// Whether the level has ended and the host should load another.
    pub fn is_finished(&self) -> bool {
        self.level.outcome().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::level::LevelConfig;
    use crate::api::types::TextLabel;
    use crate::core::physics::ScriptedPhysics;
    use crate::core::projection::OrthoProjection;
    use glam::Vec2;

    fn runner() -> LevelRunner<ScriptedPhysics> {
        let config = LevelConfig { fixed_dt: 0.125, ..LevelConfig::default() };
        let physics = ScriptedPhysics::new(config.gravity);
        let cam = OrthoProjection::new(Vec2::new(800.0, 600.0), 10.0);
        LevelRunner::new(Level::new(config, physics, Box::new(cam)).unwrap())
    }

    #[test]
    fn frame_time_becomes_whole_steps() {
        let mut r = runner();
        let effects = r.tick(0.0625);
        assert_eq!(r.level().ctx.clock.steps(), 0);
        // The spawn-time scale readout is still waiting for the host.
        assert!(matches!(&effects[..], [SideEffect::SetText { label: TextLabel::ScaleText, .. }]));

        r.tick(0.0625);
        assert_eq!(r.level().ctx.clock.steps(), 1);
        r.tick(0.5);
        assert_eq!(r.level().ctx.clock.steps(), 5);
        assert!((r.alpha()).abs() < 1e-6);
    }

    #[test]
    fn long_stall_is_capped() {
        let mut r = runner();
        r.tick(100.0);
        assert_eq!(r.level().ctx.clock.steps(), 10);
        assert!(!r.is_finished());
    }
}
