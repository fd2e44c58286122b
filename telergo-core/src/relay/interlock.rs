//! Two-relay interlock sequencer
//!
//! The switch has a primary relay carrying the load and an auxiliary
//! relay for a secondary switching function. The two must never change
//! together: closing energizes the auxiliary first, then the primary
//! after a dwell delay; opening releases the primary first, then the
//! auxiliary after the same dwell.
//!
//! # Usage
//!
//! The sequencer is advanced by calling `run()` with the current
//! timestamp, typically every millisecond:
//!
//! ```ignore
//! let mut interlock = RelayInterlock::new(actuator, DEFAULT_DWELL_MS);
//! interlock.begin();
//! interlock.set(true);
//!
//! // In the driver loop:
//! interlock.run(now);
//! ```
//!
//! `set()` and `toggle()` only record intent; every output change happens
//! inside `run()`. Poll faster than the dwell time to keep the completion
//! latency within one poll interval of the dwell.

use crate::clock::Millis;
use crate::traits::{RelayActuator, RelayChannel};

/// Default dwell between the two relay edges (ms)
pub const DEFAULT_DWELL_MS: u32 = 1000;

/// Sequencer phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Phase {
    /// Outputs settled, waiting for a command
    Idle,
    /// Auxiliary energized, waiting out the dwell before the primary
    DwellClosing,
    /// Primary released, waiting out the dwell before the auxiliary
    DwellOpening,
}

/// Latched command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Command {
    None,
    Close,
    Open,
}

/// Dwell-sequenced controller for the two relay outputs.
///
/// Holds the actuator capability; the logical state flips only when a
/// transition completes its dwell, never at command time.
pub struct RelayInterlock<A> {
    actuator: A,
    /// Delay between the two relay edges (ms)
    dwell_ms: u32,
    phase: Phase,
    pending: Command,
    /// Logical switch state: true = closed/energized
    closed: bool,
    /// When the current dwell started
    dwell_started: Millis,
}

impl<A: RelayActuator> RelayInterlock<A> {
    /// Create a sequencer around an actuator. `dwell_ms` is the delay
    /// enforced between the two relay edges.
    pub fn new(actuator: A, dwell_ms: u32) -> Self {
        Self {
            actuator,
            dwell_ms,
            phase: Phase::Idle,
            pending: Command::None,
            closed: false,
            dwell_started: Millis::new(0),
        }
    }

    /// Drive both outputs to the released state. Call once before polling.
    pub fn begin(&mut self) {
        self.actuator.set_output(RelayChannel::Primary, false);
        self.actuator.set_output(RelayChannel::Auxiliary, false);
    }

    /// Request the switch closed (`true`) or open (`false`).
    ///
    /// Records intent only; the outputs change inside `run()`. A no-op
    /// when the switch is already settled in the requested state. A new
    /// command issued while one is in flight replaces it but never
    /// interrupts a dwell already underway.
    pub fn set(&mut self, closed: bool) {
        if self.pending == Command::None && self.closed == closed {
            return;
        }
        self.pending = if closed { Command::Close } else { Command::Open };
    }

    /// Request the opposite of the current logical state. Returns the
    /// state the switch will be in once the transition completes, which
    /// is not necessarily its state at the instant of the call.
    pub fn toggle(&mut self) -> bool {
        let target = !self.closed;
        self.set(target);
        target
    }

    /// Logical switch state; changes only when a transition completes.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// True when no transition is in progress and no command is latched.
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle && self.pending == Command::None
    }

    /// Advance the sequencer by at most one transition.
    pub fn run(&mut self, now: Millis) {
        match self.phase {
            Phase::Idle => match self.pending {
                Command::Close => {
                    self.actuator.set_output(RelayChannel::Auxiliary, true);
                    self.dwell_started = now;
                    self.phase = Phase::DwellClosing;
                }
                Command::Open => {
                    self.actuator.set_output(RelayChannel::Primary, false);
                    self.dwell_started = now;
                    self.phase = Phase::DwellOpening;
                }
                Command::None => {}
            },
            Phase::DwellClosing => {
                if now.has_elapsed(self.dwell_started, self.dwell_ms) {
                    self.actuator.set_output(RelayChannel::Primary, true);
                    self.finish(Command::Close, true);
                }
            }
            Phase::DwellOpening => {
                if now.has_elapsed(self.dwell_started, self.dwell_ms) {
                    self.actuator.set_output(RelayChannel::Auxiliary, false);
                    self.finish(Command::Open, false);
                }
            }
        }
    }

    /// Complete a transition. The command is consumed only if it is still
    /// the one that started this dwell; a replacement latched mid-dwell
    /// stays pending and starts its own sequence on the next `run()`.
    fn finish(&mut self, completed: Command, closed: bool) {
        if self.pending == completed {
            self.pending = Command::None;
        }
        self.closed = closed;
        self.phase = Phase::Idle;
    }
}
