#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level lifecycle scheduling.
//!
//! Death and victory do not restart the level instantly; the attempt stays
//! frozen on screen for a grace period first. This system watches for the
//! terminal events, counts the delay down in simulated time, and then
//! emits the single reset or advance command.

use std::time::Duration;

use glade_core::{Command, Event, DEATH_RESET_DELAY, WIN_ADVANCE_DELAY};

#[derive(Clone, Copy, Debug)]
enum Pending {
    Reset { remaining: Duration },
    Advance { remaining: Duration },
}

impl Pending {
    fn remaining_mut(&mut self) -> &mut Duration {
        match self {
            Pending::Reset { remaining } | Pending::Advance { remaining } => remaining,
        }
    }

    fn command(self) -> Command {
        match self {
            Pending::Reset { .. } => Command::ResetLevel,
            Pending::Advance { .. } => Command::AdvanceLevel,
        }
    }
}

/// Pure system that schedules level resets and advances.
#[derive(Debug, Default)]
pub struct Lifecycle {
    pending: Option<Pending>,
}

impl Lifecycle {
    /// Creates the system with nothing scheduled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes world events and emits the due lifecycle command, if any.
    ///
    /// A level load cancels whatever was scheduled, so a host-driven reset
    /// never races a pending one.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::PlayerDied { .. } => {
                    self.pending = Some(Pending::Reset {
                        remaining: DEATH_RESET_DELAY,
                    });
                }
                Event::LevelWon { .. } => {
                    self.pending = Some(Pending::Advance {
                        remaining: WIN_ADVANCE_DELAY,
                    });
                }
                Event::LevelLoaded { .. } => self.pending = None,
                Event::TimeAdvanced { dt } => {
                    let due = match self.pending.as_mut() {
                        Some(pending) => {
                            let remaining = pending.remaining_mut();
                            if *remaining > *dt {
                                *remaining -= *dt;
                                false
                            } else {
                                true
                            }
                        }
                        None => false,
                    };
                    if due {
                        if let Some(pending) = self.pending.take() {
                            out.push(pending.command());
                        }
                    }
                }
                _ => {}
            }
        }
    }
}
