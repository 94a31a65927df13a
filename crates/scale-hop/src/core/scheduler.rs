// core/scheduler.rs
//
// Timed sequence scheduler: staged, cooperative effects keyed by the entity
// that owns them. Advanced once per simulation step; never blocks.
//
// Usage:
//   let mut seqs = Scheduler::new();
//   seqs.schedule_after(key, 3.0, vec![Action::Emit(SideEffect::AdvanceToNextLevel)]);
//   for fired in seqs.tick(dt, |id| scene.contains(id)) { apply(fired) }
//
// Firing is reported back as data; the caller owns the world and applies it.

use glam::Vec2;

use crate::api::types::{EntityId, Rgba, SideEffect};
use crate::extensions::easing::lerp;

/// Logical slot a sequence occupies on its owner. Scheduling into an occupied
/// slot replaces the pending sequence, so one logical event never double-fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Trap tint, hold and fade, then reload.
    Death,
    /// Checkpoint hold before advance or retry.
    Checkpoint,
    /// Finish-line delay before advancing.
    Finish,
    /// Platform fade-out and destruction.
    Lifetime,
    /// Restore the player's pre-bounce vertical velocity.
    BounceRestore,
    /// Platform squash-and-stretch.
    ScalePulse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequenceKey {
    pub owner: EntityId,
    pub channel: Channel,
}

impl SequenceKey {
    pub fn new(owner: EntityId, channel: Channel) -> Self {
        Self { owner, channel }
    }
}

/// What a fired stage asks the world to do. Targets the owner unless the
/// variant names another entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Tint(Rgba),
    Opacity(f32),
    Scale(Vec2),
    /// Set another entity's vertical velocity, keeping its horizontal one.
    VerticalVelocity { target: EntityId, vy: f32 },
    /// Hand control back to the player after a checkpoint retry.
    ResumeControl,
    /// Destroy the owner.
    Despawn,
    Emit(SideEffect),
}

/// Property a ramp interpolates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampProperty {
    Opacity,
}

/// Continuous interpolation over a stage's hold, sampled once per step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ramp {
    pub property: RampProperty,
    pub from: f32,
    pub to: f32,
}

impl Ramp {
    pub fn opacity(from: f32, to: f32) -> Self {
        Self {
            property: RampProperty::Opacity,
            from,
            to,
        }
    }

    fn sample(&self, t: f32) -> Action {
        let value = lerp(self.from, self.to, t);
        match self.property {
            RampProperty::Opacity => Action::Opacity(value),
        }
    }
}

/// One stage: an action fired on entry, an optional ramp, then a hold.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub enter: Option<Action>,
    pub ramp: Option<Ramp>,
    pub hold: f32,
}

impl Stage {
    /// Fire `action` immediately, then hold.
    pub fn instant(action: Action, hold: f32) -> Self {
        Self { enter: Some(action), ramp: None, hold }
    }

    pub fn wait(hold: f32) -> Self {
        Self { enter: None, ramp: None, hold }
    }

    pub fn ramp(ramp: Ramp, duration: f32) -> Self {
        Self { enter: None, ramp: Some(ramp), hold: duration }
    }
}

/// An action reported by `tick`.
#[derive(Debug, Clone, PartialEq)]
pub struct Fired {
    pub owner: EntityId,
    pub channel: Channel,
    pub action: Action,
}

#[derive(Debug, Clone)]
struct Sequence {
    key: SequenceKey,
    stages: Vec<Stage>,
    on_complete: Vec<Action>,
    current: usize,
    elapsed: f32,
    entered: bool,
}

impl Sequence {
    fn emit(&self, action: Action, out: &mut Vec<Fired>) {
        out.push(Fired {
            owner: self.key.owner,
            channel: self.key.channel,
            action,
        });
    }

    /// Advance by `dt`, carrying leftover time into later stages.
    /// Returns true once `on_complete` has fired.
    fn advance(&mut self, dt: f32, out: &mut Vec<Fired>) -> bool {
        let mut budget = dt;
        loop {
            let Some(stage) = self.stages.get(self.current) else {
                for action in std::mem::take(&mut self.on_complete) {
                    self.emit(action, out);
                }
                return true;
            };
            let (enter, ramp, hold) = (stage.enter.clone(), stage.ramp, stage.hold);

            if !self.entered {
                self.entered = true;
                if let Some(action) = enter {
                    self.emit(action, out);
                }
            }

            let remaining = hold - self.elapsed;
            if budget < remaining {
                self.elapsed += budget;
                if let (Some(ramp), true) = (ramp, budget > 0.0) {
                    self.emit(ramp.sample(self.elapsed / hold), out);
                }
                return false;
            }

            budget -= remaining.max(0.0);
            if let Some(ramp) = ramp {
                self.emit(ramp.sample(1.0), out);
            }
            self.current += 1;
            self.elapsed = 0.0;
            self.entered = false;
        }
    }
}

/// Owns every pending timed sequence.
#[derive(Debug, Default)]
pub struct Scheduler {
    sequences: Vec<Sequence>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `stages` in order, then `on_complete`. Replaces any sequence
    /// pending under the same key.
    pub fn schedule_staged(&mut self, key: SequenceKey, stages: Vec<Stage>, on_complete: Vec<Action>) {
        let seq = Sequence {
            key,
            stages,
            on_complete,
            current: 0,
            elapsed: 0.0,
            entered: false,
        };
        match self.sequences.iter_mut().find(|s| s.key == key) {
            Some(slot) => *slot = seq,
            None => self.sequences.push(seq),
        }
    }

    /// Fire `actions` once `duration` has elapsed.
    pub fn schedule_after(&mut self, key: SequenceKey, duration: f32, actions: Vec<Action>) {
        self.schedule_staged(key, vec![Stage::wait(duration)], actions);
    }

    pub fn cancel(&mut self, key: SequenceKey) -> bool {
        let before = self.sequences.len();
        self.sequences.retain(|s| s.key != key);
        self.sequences.len() != before
    }

    /// Drop every sequence owned by `owner` without firing it.
    pub fn cancel_owner(&mut self, owner: EntityId) {
        self.sequences.retain(|s| s.key.owner != owner);
    }

    pub fn is_pending(&self, key: SequenceKey) -> bool {
        self.sequences.iter().any(|s| s.key == key)
    }

    /// Advance every sequence by `dt`. Sequences whose owner is no longer
    /// alive are discarded first, without firing.
    pub fn tick(&mut self, dt: f32, is_alive: impl Fn(EntityId) -> bool) -> Vec<Fired> {
        self.sequences.retain(|s| is_alive(s.key.owner));

        let mut fired = Vec::new();
        let mut done = Vec::new();
        for (idx, seq) in self.sequences.iter_mut().enumerate() {
            if seq.advance(dt, &mut fired) {
                done.push(idx);
            }
        }
        for idx in done.into_iter().rev() {
            self.sequences.remove(idx);
        }
        fired
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn clear(&mut self) {
        self.sequences.clear();
    }
}
