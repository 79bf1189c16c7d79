#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Held-direction input repeat for the player.
//!
//! A host reports which direction is currently held. Pressing emits a step
//! request immediately; holding re-emits on a fixed cadence measured in
//! simulated time. The world's own cooldown decides which requests become
//! actual steps.

use std::time::Duration;

use glade_core::{Command, Direction, Event, INPUT_REPEAT_INTERVAL};

/// Pure system that converts a held direction into step requests.
#[derive(Debug, Default)]
pub struct PlayerControl {
    held: Option<Direction>,
    fire_now: bool,
    accumulator: Duration,
}

impl PlayerControl {
    /// Creates the system with no direction held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the direction the host currently reports as held.
    ///
    /// A fresh press fires on the next `handle` call without waiting for
    /// the repeat interval. Re-reporting the same direction is a no-op.
    pub fn set_held(&mut self, direction: Option<Direction>) {
        if direction == self.held {
            return;
        }
        self.held = direction;
        self.fire_now = direction.is_some();
        self.accumulator = Duration::ZERO;
    }

    /// Consumes world events and emits step requests for the held direction.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                self.accumulator = self.accumulator.saturating_add(*dt);
            }
        }

        let Some(direction) = self.held else {
            self.accumulator = Duration::ZERO;
            return;
        };

        if self.fire_now {
            self.fire_now = false;
            self.accumulator = Duration::ZERO;
            out.push(Command::MovePlayer { direction });
            return;
        }

        while self.accumulator >= INPUT_REPEAT_INTERVAL {
            self.accumulator -= INPUT_REPEAT_INTERVAL;
            out.push(Command::MovePlayer { direction });
        }
    }
}
