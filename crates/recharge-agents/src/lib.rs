//! Drones and their behaviors for the Recharge simulation.
//!
//! This crate holds the per-drone logic layer: the capabilities a drone
//! exposes to behaviors, the behaviors themselves, and the debug log that
//! explains their decisions. It sits between `recharge-world` (shared
//! stations and claims) and `recharge-core` (tick orchestration).
//!
//! # Modules
//!
//! - [`behavior`] -- The [`Behavior`] trait and its per-poll [`BehaviorContext`].
//! - [`charging`] -- [`ChargingGoal`]: find, claim, and use a charging station.
//! - [`config`] -- Charging thresholds ([`ChargingConfig`]).
//! - [`debugger`] -- [`DroneDebugger`], the bounded skipped-station log.
//! - [`drone`] -- Drone capability traits and the in-memory [`Drone`].
//! - [`error`] -- Error types for behavior polling ([`AgentError`]).
//! - [`patrol`] -- [`PatrolGoal`]: waypoint loop between charges.

pub mod behavior;
pub mod charging;
pub mod config;
pub mod debugger;
pub mod drone;
pub mod error;
pub mod patrol;

// Re-export primary types at crate root for convenience.
pub use behavior::{Behavior, BehaviorContext};
pub use charging::{Candidate, ChargingGoal};
pub use config::ChargingConfig;
pub use debugger::{DEFAULT_DEBUG_CAPACITY, DebugEntry, DebugSink, DroneDebugger};
pub use drone::{Drone, DroneControl, EnergyStore, EnergyTank, NavigationLimits, Navigator};
pub use error::AgentError;
pub use patrol::PatrolGoal;
