//! Run bounds and the stop signal for the simulation loop.
//!
//! An [`OperatorState`] is shared between [`run_simulation`] and whatever
//! may end the run early (the engine's Ctrl-C handler, tests). A stop
//! request is a flag the loop checks before every tick plus a wakeup that
//! cuts the sleep between ticks short.
//!
//! [`run_simulation`]: crate::runner::run_simulation

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::Notify;
use tokio::time::Duration;

use crate::config::SimulationBoundsConfig;

/// Reason why the simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// Reached the configured `max_real_time_seconds` limit.
    MaxRealTimeReached,
    /// A stop was requested.
    OperatorStop,
    /// Every drone is out of energy and none is being charged.
    AllDronesStranded,
}

/// Shared stop flag and run bounds.
#[derive(Debug)]
pub struct OperatorState {
    stop_requested: AtomicBool,
    /// Holds a permit once a stop is requested, so a sleep that starts
    /// after the request returns at once.
    stop_notify: Notify,
    tick_interval_ms: u64,
    started_at: DateTime<Utc>,
    /// 0 = unlimited.
    max_ticks: u64,
    /// 0 = unlimited.
    max_real_time_seconds: u64,
}

impl OperatorState {
    /// Create the state for one run.
    pub fn new(tick_interval_ms: u64, bounds: &SimulationBoundsConfig) -> Self {
        Self {
            stop_requested: AtomicBool::new(false),
            stop_notify: Notify::new(),
            tick_interval_ms,
            started_at: Utc::now(),
            max_ticks: bounds.max_ticks,
            max_real_time_seconds: bounds.max_real_time_seconds,
        }
    }

    /// Ask the loop to stop before its next tick.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.stop_notify.notify_one();
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Sleep for one tick interval, returning early if a stop is requested.
    pub async fn wait_tick_interval(&self) {
        if self.tick_interval_ms == 0 || self.is_stop_requested() {
            return;
        }
        tokio::select! {
            () = tokio::time::sleep(Duration::from_millis(self.tick_interval_ms)) => {}
            () = self.stop_notify.notified() => {}
        }
    }

    /// Milliseconds slept between ticks.
    pub const fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms
    }

    /// Whether `max_ticks > 0` and `current_tick >= max_ticks`.
    pub const fn tick_limit_reached(&self, current_tick: u64) -> bool {
        self.max_ticks > 0 && current_tick >= self.max_ticks
    }

    /// Whether `max_real_time_seconds > 0` and that much wall-clock time has
    /// passed since start.
    pub fn time_limit_reached(&self) -> bool {
        self.max_real_time_seconds > 0 && self.elapsed_seconds() >= self.max_real_time_seconds
    }

    /// Seconds since the state was created.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        // Negative if the wall clock stepped backwards.
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }

    /// The configured tick limit.
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// The configured wall-clock limit in seconds.
    pub const fn max_real_time_seconds(&self) -> u64 {
        self.max_real_time_seconds
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    const fn bounds(max_ticks: u64) -> SimulationBoundsConfig {
        SimulationBoundsConfig {
            max_ticks,
            max_real_time_seconds: 0,
        }
    }

    #[test]
    fn tick_limit() {
        assert!(!OperatorState::new(250, &bounds(0)).tick_limit_reached(999_999));
        let state = OperatorState::new(250, &bounds(100));
        assert!(!state.tick_limit_reached(99));
        assert!(state.tick_limit_reached(100));
    }

    #[test]
    fn time_limit_zero_means_unlimited() {
        let state = OperatorState::new(250, &bounds(0));
        assert!(!state.time_limit_reached());
        assert!(!state.is_stop_requested());
    }

    #[tokio::test]
    async fn stop_cuts_the_tick_sleep_short() {
        let state = Arc::new(OperatorState::new(60_000, &bounds(0)));
        let remote = Arc::clone(&state);
        let stopper = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            remote.request_stop();
        });
        let waited = tokio::time::timeout(Duration::from_secs(5), state.wait_tick_interval()).await;
        assert!(waited.is_ok());
        assert!(state.is_stop_requested());
        assert!(stopper.await.is_ok());
    }

    #[tokio::test]
    async fn sleep_after_stop_returns_at_once() {
        let state = OperatorState::new(60_000, &bounds(0));
        state.request_stop();
        let waited = tokio::time::timeout(Duration::from_secs(5), state.wait_tick_interval()).await;
        assert!(waited.is_ok());
    }
}
