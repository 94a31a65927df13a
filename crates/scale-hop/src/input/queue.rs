use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Identifies one draggable UI element (a platform spawner button).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DragSourceId(pub u32);

/// Gesture events the core understands.
/// Screen-space deltas and positions are in pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A touch/click began on a drag source.
    PointerDown { source: DragSourceId },
    /// A drag started; `delta` is the first movement.
    BeginDrag { source: DragSourceId, delta: Vec2 },
    /// The pointer moved by `delta` while dragging.
    Drag { source: DragSourceId, delta: Vec2 },
    /// The drag was released at `screen_pos`.
    EndDrag { source: DragSourceId, screen_pos: Vec2 },
}

impl InputEvent {
    pub fn source(&self) -> DragSourceId {
        match *self {
            InputEvent::PointerDown { source }
            | InputEvent::BeginDrag { source, .. }
            | InputEvent::Drag { source, .. }
            | InputEvent::EndDrag { source, .. } => source,
        }
    }
}

/// A queue of gesture events.
/// The host's input dispatcher writes events; the level drains them each step.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    /// Discard pending events.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_drain() {
        let mut q = InputQueue::new();
        q.push(InputEvent::PointerDown { source: DragSourceId(1) });
        q.push(InputEvent::Drag { source: DragSourceId(1), delta: Vec2::new(4.0, -2.0) });
        assert_eq!(q.len(), 2);
        let events = q.drain();
        assert_eq!(events.len(), 2);
        assert!(q.is_empty());

        q.push(InputEvent::PointerDown { source: DragSourceId(2) });
        q.clear();
        assert!(q.is_empty());
    }

    #[test]
    fn events_report_their_source() {
        let ev = InputEvent::EndDrag { source: DragSourceId(3), screen_pos: Vec2::new(10.0, 20.0) };
        assert_eq!(ev.source(), DragSourceId(3));
        match ev {
            InputEvent::EndDrag { screen_pos, .. } => assert_eq!(screen_pos, Vec2::new(10.0, 20.0)),
            _ => panic!("Expected EndDrag event"),
        }
    }
}
