//! Error types for the recharge-agents crate.
//!
//! Behaviors recover locally from everything a running world throws at them
//! (stale claims, unreachable stations, immobility). What remains here are
//! construction faults: a drone wired up without the capabilities its
//! behaviors were built to rely on.

use recharge_types::AgentId;

/// Errors that can occur while polling drone behaviors.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The drone has no energy store, yet a behavior that reads energy is
    /// running on it. This is a wiring bug, never a runtime condition.
    #[error("drone {agent} has no energy store")]
    MissingEnergyStore {
        /// The misconfigured drone.
        agent: AgentId,
    },

    /// Drone with the given ID was not found.
    #[error("drone not found: {0}")]
    AgentNotFound(AgentId),
}
