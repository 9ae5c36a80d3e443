//! A simple waypoint patrol.
//!
//! [`PatrolGoal`] keeps a drone busy between charges. It flies the waypoint
//! loop while the drone has energy above the low-energy threshold and steps
//! aside as soon as it does not, which lets the charging goal take over.

use recharge_types::Vec3;
use tracing::debug;

use crate::behavior::{Behavior, BehaviorContext};
use crate::error::AgentError;

/// Cycles a drone through a fixed list of waypoints.
#[derive(Debug, Clone)]
pub struct PatrolGoal {
    waypoints: Vec<Vec3>,
    next: usize,
    low_energy_threshold: f64,
}

impl PatrolGoal {
    /// Create a patrol over `waypoints` that yields at or below
    /// `low_energy_threshold`.
    pub const fn new(waypoints: Vec<Vec3>, low_energy_threshold: f64) -> Self {
        Self {
            waypoints,
            next: 0,
            low_energy_threshold,
        }
    }

    /// The waypoint the drone is currently heading to.
    pub fn current_waypoint(&self) -> Option<Vec3> {
        self.waypoints.get(self.next).copied()
    }

    fn has_energy(&self, ctx: &BehaviorContext<'_>) -> bool {
        ctx.drone
            .energy()
            .is_some_and(|store| store.level() > self.low_energy_threshold)
    }

    fn advance(&mut self) {
        self.next = self
            .next
            .saturating_add(1)
            .checked_rem(self.waypoints.len())
            .unwrap_or(0);
    }

    /// Ask the navigator for a path to the next reachable waypoint, trying
    /// each waypoint at most once.
    fn head_to_next(&mut self, ctx: &mut BehaviorContext<'_>) -> bool {
        for _ in 0..self.waypoints.len() {
            let Some(target) = self.current_waypoint() else {
                return false;
            };
            if ctx.drone.move_to(target) {
                return true;
            }
            debug!(agent = %ctx.drone.id(), %target, "Waypoint unreachable, skipping");
            self.advance();
        }
        false
    }
}

impl Behavior for PatrolGoal {
    fn name(&self) -> &'static str {
        "patrol"
    }

    fn try_select(&mut self, ctx: &mut BehaviorContext<'_>) -> Result<bool, AgentError> {
        if !self.has_energy(ctx) {
            return Ok(false);
        }
        Ok(self.head_to_next(ctx))
    }

    fn tick(&mut self, ctx: &mut BehaviorContext<'_>) -> Result<bool, AgentError> {
        if !self.has_energy(ctx) {
            debug!(agent = %ctx.drone.id(), "Patrol yielding, energy low");
            return Ok(false);
        }
        if ctx.drone.has_pending_path() || ctx.drone.is_going_to_teleport() {
            return Ok(true);
        }
        self.advance();
        Ok(self.head_to_next(ctx))
    }
}
