//! Simulation loop runner.
//!
//! [`run_simulation`] drives [`run_tick`] until one of these happens:
//!
//! - a stop is requested,
//! - the tick limit or the wall-clock limit is reached,
//! - every drone is stranded with an empty tank.
//!
//! Between ticks it sleeps for the tick interval; a stop request wakes it.
//!
//! [`run_tick`]: crate::tick::run_tick

use std::sync::Arc;

use tracing::info;

use crate::operator::{OperatorState, SimulationEndReason};
use crate::tick::{self, SimulationState, TickError, TickSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Run the simulation loop until a termination condition is met.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick execution fails.
pub async fn run_simulation(
    state: &mut SimulationState,
    operator: &Arc<OperatorState>,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        max_ticks = operator.max_ticks(),
        max_real_time_seconds = operator.max_real_time_seconds(),
        tick_interval_ms = operator.tick_interval_ms(),
        drones = state.drones.len(),
        stations = state.world.station_count(),
        "Simulation starting"
    );

    loop {
        // --- Checks before the tick ---
        let early = if operator.is_stop_requested() {
            info!("Operator stop requested");
            Some(SimulationEndReason::OperatorStop)
        } else if operator.time_limit_reached() {
            info!(
                max_seconds = operator.max_real_time_seconds(),
                elapsed = operator.elapsed_seconds(),
                "Real-time limit reached"
            );
            Some(SimulationEndReason::MaxRealTimeReached)
        } else {
            None
        };
        if let Some(reason) = early {
            return Ok(SimulationResult {
                end_reason: reason,
                final_summary: last_summary,
                total_ticks,
            });
        }

        let summary = tick::run_tick(state)?;
        total_ticks = total_ticks.saturating_add(1);

        // --- Checks after the tick ---
        let late = if summary.drones_total > 0 && summary.drones_stranded == summary.drones_total
        {
            info!(tick = summary.tick, "Every drone stranded");
            Some(SimulationEndReason::AllDronesStranded)
        } else if operator.tick_limit_reached(summary.tick) {
            info!(
                tick = summary.tick,
                max_ticks = operator.max_ticks(),
                "Tick limit reached"
            );
            Some(SimulationEndReason::MaxTicksReached)
        } else {
            None
        };
        if let Some(reason) = late {
            return Ok(SimulationResult {
                end_reason: reason,
                final_summary: Some(summary),
                total_ticks,
            });
        }

        last_summary = Some(summary);
        operator.wait_tick_interval().await;
    }
}

/// Log the outcome of a finished run.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        final_live_claims = result.final_summary.as_ref().map(|s| s.live_claims),
        final_stranded = result.final_summary.as_ref().map(|s| s.drones_stranded),
        "Simulation ended"
    );
}
