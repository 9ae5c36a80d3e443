//! World clock for the Recharge simulation.
//!
//! The tick number is the only notion of time the simulation has. Claims
//! are stamped with it, debug entries carry it, and the runner's limits are
//! expressed in it. Advancing uses checked arithmetic.

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,
}

/// Monotonic tick counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldClock {
    /// Current tick number (0 before the first tick runs).
    tick: u64,
}

impl WorldClock {
    /// Create a clock at tick 0.
    pub const fn new() -> Self {
        Self { tick: 0 }
    }

    /// Create a clock at an arbitrary tick (restoring state, tests).
    pub const fn from_tick(tick: u64) -> Self {
        Self { tick }
    }

    /// Advance the clock by one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub const fn advance(&mut self) -> Result<u64, ClockError> {
        match self.tick.checked_add(1) {
            Some(next) => {
                self.tick = next;
                Ok(next)
            }
            None => Err(ClockError::TickOverflow),
        }
    }

    /// Return the current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }
}
