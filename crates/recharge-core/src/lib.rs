//! World clock, behavior scheduling, and the tick cycle for the Recharge
//! simulation.
//!
//! This crate ties the world and the drones together: it owns the clock,
//! polls each drone's behaviors in priority order, moves energy between
//! stations and drones, and runs the bounded async loop the engine drives.
//!
//! # Modules
//!
//! - [`clock`] -- Monotonic tick counter ([`WorldClock`]).
//! - [`config`] -- Configuration loading from `recharge-config.yaml`.
//! - [`operator`] -- Run bounds and the stop signal.
//! - [`runner`] -- [`run_simulation`], the async tick loop.
//! - [`scheduler`] -- [`BehaviorScheduler`], per-drone behavior arbitration.
//! - [`tick`] -- [`run_tick`] and the [`SimulationState`] it advances.
//!
//! [`WorldClock`]: clock::WorldClock
//! [`run_simulation`]: runner::run_simulation
//! [`BehaviorScheduler`]: scheduler::BehaviorScheduler
//! [`run_tick`]: tick::run_tick
//! [`SimulationState`]: tick::SimulationState

pub mod clock;
pub mod config;
pub mod operator;
pub mod runner;
pub mod scheduler;
pub mod tick;
