//! The behavior capability polled by the scheduler.
//!
//! A behavior is one self-contained thing a drone can do (charge, patrol,
//! ...). The scheduler offers it control with [`Behavior::try_select`] and,
//! once it is running, asks every tick whether it wants to keep control
//! with [`Behavior::tick`]. Returning `false` from `tick` is the only way a
//! behavior ends; there is no external cancel.
//!
//! Both calls receive a [`BehaviorContext`] borrowing the drone, the world,
//! the drone's region claim registry, and its debug sink for the duration
//! of the poll. Behaviors keep identifiers between ticks, never references.

use recharge_world::{ClaimRegistry, WorldView};

use crate::debugger::DebugSink;
use crate::drone::DroneControl;
use crate::error::AgentError;

/// Everything a behavior may touch during one poll.
pub struct BehaviorContext<'a> {
    /// The current simulation tick.
    pub tick: u64,
    /// The drone being controlled.
    pub drone: &'a mut dyn DroneControl,
    /// Read-only view of the world.
    pub world: &'a dyn WorldView,
    /// Claim registry for the drone's region.
    pub claims: &'a ClaimRegistry,
    /// Where skipped-station diagnostics go.
    pub debug: &'a mut dyn DebugSink,
}

/// A schedulable drone behavior.
pub trait Behavior: Send + core::fmt::Debug {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Whether this behavior must run alone.
    ///
    /// The scheduler never starts an exclusive behavior while any other is
    /// active, nor any behavior while an exclusive one is active.
    fn is_exclusive(&self) -> bool {
        true
    }

    /// Try to take control. Returns `true` if the behavior started.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] only for construction faults.
    fn try_select(&mut self, ctx: &mut BehaviorContext<'_>) -> Result<bool, AgentError>;

    /// Continue for one tick. Returns `false` once the behavior is done.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] only for construction faults.
    fn tick(&mut self, ctx: &mut BehaviorContext<'_>) -> Result<bool, AgentError>;

    /// Called by the scheduler after `tick` returned `false`.
    fn stop(&mut self) {}
}
