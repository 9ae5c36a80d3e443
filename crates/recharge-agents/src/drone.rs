//! The drone: capabilities behaviors rely on, and an in-memory implementation.
//!
//! Behaviors see a drone only through [`DroneControl`] (identity, position,
//! standby) and its [`Navigator`] supertrait (movement requests). Energy is
//! an optional capability reached through [`DroneControl::energy`]; a drone
//! built without one is a wiring error that energy-reading behaviors
//! surface as [`AgentError::MissingEnergyStore`].
//!
//! [`Drone`] is the concrete drone the tick cycle moves around. Its
//! navigation is a straight line at fixed speed with an optional teleport
//! for targets beyond path range. That is enough to exercise the behaviors;
//! real path planning is outside this crate.
//!
//! [`AgentError::MissingEnergyStore`]: crate::error::AgentError::MissingEnergyStore

use recharge_types::{AgentId, BlockPos, OwnerId, RegionId, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// Read access to a drone's energy storage.
pub trait EnergyStore {
    /// Current stored energy.
    fn level(&self) -> f64;

    /// Maximum storable energy.
    fn capacity(&self) -> f64;
}

/// Movement requests. Every call returns immediately.
pub trait Navigator {
    /// Start moving towards `target`. Returns whether a path was accepted.
    fn move_to(&mut self, target: Vec3) -> bool;

    /// Whether the drone will relocate instantly on its next movement step
    /// instead of following a path.
    fn is_going_to_teleport(&self) -> bool;

    /// Whether a path (finished or not) is currently set.
    fn has_path(&self) -> bool;

    /// Whether the current path has been walked to its end.
    fn path_complete(&self) -> bool;

    /// Drop the current path and any pending teleport.
    fn clear_path(&mut self);

    /// Whether there is a path with ground still to cover.
    fn has_pending_path(&self) -> bool {
        self.has_path() && !self.path_complete()
    }
}

/// Everything a behavior may ask of the drone it controls.
pub trait DroneControl: Navigator {
    /// The drone's identity (the claim holder).
    fn id(&self) -> AgentId;

    /// The identity the drone acts under for protection checks.
    fn owner(&self) -> OwnerId;

    /// The region the drone is in.
    fn region(&self) -> RegionId;

    /// Current position.
    fn position(&self) -> Vec3;

    /// The block containing the drone.
    fn block_position(&self) -> BlockPos {
        BlockPos::containing(self.position())
    }

    /// The drone's energy store, if it has one.
    fn energy(&self) -> Option<&dyn EnergyStore>;

    /// Force the drone into (or out of) standby.
    fn set_standby(&mut self, standby: bool);

    /// Whether the drone is idling in standby.
    fn is_standby(&self) -> bool;

    /// Whether the drone is actively flying under its own power.
    fn is_accelerating(&self) -> bool;
}

// ---------------------------------------------------------------------------
// Energy tank
// ---------------------------------------------------------------------------

/// A plain clamped energy buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyTank {
    level: f64,
    capacity: f64,
}

impl EnergyTank {
    /// Create a tank. `level` is clamped to `0..=capacity`.
    pub fn new(level: f64, capacity: f64) -> Self {
        let capacity = capacity.max(0.0);
        Self {
            level: level.clamp(0.0, capacity),
            capacity,
        }
    }

    /// Add energy. Returns the amount actually stored.
    pub fn fill(&mut self, amount: f64) -> f64 {
        let accepted = amount.max(0.0).min(self.capacity - self.level).max(0.0);
        self.level += accepted;
        accepted
    }

    /// Remove energy. Returns the amount actually removed.
    pub fn drain(&mut self, amount: f64) -> f64 {
        let removed = amount.max(0.0).min(self.level);
        self.level -= removed;
        removed
    }

    /// Whether the tank is completely empty.
    pub fn is_empty(&self) -> bool {
        self.level <= 0.0
    }
}

impl EnergyStore for EnergyTank {
    fn level(&self) -> f64 {
        self.level
    }

    fn capacity(&self) -> f64 {
        self.capacity
    }
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// Movement limits for a drone's navigation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavigationLimits {
    /// Distance covered per tick while flying.
    pub speed: f64,
    /// Longest straight path the navigator will accept.
    pub max_path_distance: f64,
    /// Whether targets beyond `max_path_distance` are reached by teleport.
    pub can_teleport: bool,
}

impl Default for NavigationLimits {
    fn default() -> Self {
        Self {
            speed: 1.0,
            max_path_distance: 64.0,
            can_teleport: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Path {
    target: Vec3,
    done: bool,
}

/// Straight-line navigation state.
#[derive(Debug, Clone, PartialEq)]
struct Navigation {
    limits: NavigationLimits,
    path: Option<Path>,
    teleport_to: Option<Vec3>,
}

impl Navigation {
    const fn new(limits: NavigationLimits) -> Self {
        Self {
            limits,
            path: None,
            teleport_to: None,
        }
    }

    fn plan(&mut self, from: Vec3, target: Vec3) -> bool {
        if from.distance(target) <= self.limits.max_path_distance {
            self.path = Some(Path {
                target,
                done: false,
            });
            self.teleport_to = None;
            true
        } else if self.limits.can_teleport {
            self.path = None;
            self.teleport_to = Some(target);
            false
        } else {
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Drone
// ---------------------------------------------------------------------------

/// An in-memory drone.
#[derive(Debug, Clone, PartialEq)]
pub struct Drone {
    id: AgentId,
    owner: OwnerId,
    region: RegionId,
    position: Vec3,
    energy: Option<EnergyTank>,
    navigation: Navigation,
    standby: bool,
}

impl Drone {
    /// Create a drone with the given energy tank.
    pub fn new(owner: OwnerId, region: RegionId, position: Vec3, energy: EnergyTank) -> Self {
        Self {
            id: AgentId::new(),
            owner,
            region,
            position,
            energy: Some(energy),
            navigation: Navigation::new(NavigationLimits::default()),
            standby: false,
        }
    }

    /// Create a drone with no energy store at all.
    pub fn without_energy(owner: OwnerId, region: RegionId, position: Vec3) -> Self {
        Self {
            energy: None,
            ..Self::new(owner, region, position, EnergyTank::new(0.0, 0.0))
        }
    }

    /// Override the navigation limits.
    #[must_use]
    pub const fn with_limits(mut self, limits: NavigationLimits) -> Self {
        self.navigation.limits = limits;
        self
    }

    /// Mutable access to the energy tank.
    pub const fn energy_mut(&mut self) -> Option<&mut EnergyTank> {
        self.energy.as_mut()
    }

    /// Current energy level, or zero without a tank.
    pub fn energy_level(&self) -> f64 {
        self.energy.map_or(0.0, |tank| tank.level)
    }

    /// Whether the drone can fly: it has energy left, or no tank to run dry.
    pub fn is_powered(&self) -> bool {
        self.energy.is_none_or(|tank| !tank.is_empty())
    }

    /// Where the current path leads, if anywhere.
    pub fn path_target(&self) -> Option<Vec3> {
        self.navigation.path.map(|p| p.target)
    }

    /// Advance the drone one movement step. Returns the distance flown.
    ///
    /// A pending teleport resolves first and costs no distance. A drone in
    /// standby does not move.
    pub fn step(&mut self) -> f64 {
        if let Some(target) = self.navigation.teleport_to.take() {
            debug!(agent = %self.id, to = %target, "Drone teleported");
            self.position = target;
            self.navigation.path = Some(Path { target, done: true });
            return 0.0;
        }
        if self.standby {
            return 0.0;
        }
        let Some(path) = self.navigation.path.as_mut() else {
            return 0.0;
        };
        if path.done {
            return 0.0;
        }
        let next = self
            .position
            .step_towards(path.target, self.navigation.limits.speed);
        let flown = self.position.distance(next);
        self.position = next;
        if next.distance_sqr(path.target) <= f64::EPSILON {
            path.done = true;
        }
        flown
    }
}

impl Navigator for Drone {
    fn move_to(&mut self, target: Vec3) -> bool {
        let accepted = self.navigation.plan(self.position, target);
        if accepted {
            self.standby = false;
        }
        accepted
    }

    fn is_going_to_teleport(&self) -> bool {
        self.navigation.teleport_to.is_some()
    }

    fn has_path(&self) -> bool {
        self.navigation.path.is_some()
    }

    fn clear_path(&mut self) {
        self.navigation.path = None;
        self.navigation.teleport_to = None;
    }

    fn path_complete(&self) -> bool {
        self.navigation.path.is_some_and(|p| p.done)
    }
}

impl DroneControl for Drone {
    fn id(&self) -> AgentId {
        self.id
    }

    fn owner(&self) -> OwnerId {
        self.owner
    }

    fn region(&self) -> RegionId {
        self.region
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn energy(&self) -> Option<&dyn EnergyStore> {
        self.energy.as_ref().map(|tank| tank as &dyn EnergyStore)
    }

    fn set_standby(&mut self, standby: bool) {
        if standby != self.standby {
            debug!(agent = %self.id, standby, "Drone standby changed");
        }
        self.standby = standby;
    }

    fn is_standby(&self) -> bool {
        self.standby
    }

    fn is_accelerating(&self) -> bool {
        self.is_powered()
            && !self.standby
            && (self.has_pending_path() || self.is_going_to_teleport())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn drone_at(position: Vec3) -> Drone {
        Drone::new(
            OwnerId::new(),
            RegionId::new(),
            position,
            EnergyTank::new(5.0, 10.0),
        )
    }

    #[test]
    fn tank_clamps() {
        let mut tank = EnergyTank::new(12.0, 10.0);
        assert!(approx(tank.level(), 10.0));
        assert!(approx(tank.fill(1.0), 0.0));
        assert!(approx(tank.drain(3.0), 3.0));
        assert!(approx(tank.drain(100.0), 7.0));
        assert!(tank.is_empty());
    }

    #[test]
    fn move_within_range_is_accepted_and_walked() {
        let mut drone = drone_at(Vec3::ZERO);
        assert!(drone.move_to(Vec3::new(3.0, 0.0, 0.0)));
        assert!(drone.has_pending_path());
        assert!(drone.is_accelerating());
        assert!(approx(drone.step(), 1.0));
        assert!(approx(drone.step(), 1.0));
        assert!(approx(drone.step(), 1.0));
        assert!(drone.path_complete());
        assert!(!drone.has_pending_path());
        assert!(!drone.is_accelerating());
        assert!(approx(drone.step(), 0.0));
    }

    #[test]
    fn move_beyond_range_is_rejected() {
        let mut drone = drone_at(Vec3::ZERO);
        assert!(!drone.move_to(Vec3::new(100.0, 0.0, 0.0)));
        assert!(!drone.is_going_to_teleport());
        assert!(!drone.has_path());
    }

    #[test]
    fn teleport_capable_drone_relocates_next_step() {
        let limits = NavigationLimits {
            can_teleport: true,
            ..NavigationLimits::default()
        };
        let mut drone = drone_at(Vec3::ZERO).with_limits(limits);
        let far = Vec3::new(500.0, 70.0, 0.0);
        assert!(!drone.move_to(far));
        assert!(drone.is_going_to_teleport());
        assert!(drone.is_accelerating());
        assert!(approx(drone.step(), 0.0));
        assert_eq!(drone.position(), far);
        assert!(!drone.is_going_to_teleport());
        assert!(drone.path_complete());
    }

    #[test]
    fn standby_halts_movement_until_next_path() {
        let mut drone = drone_at(Vec3::ZERO);
        assert!(drone.move_to(Vec3::new(5.0, 0.0, 0.0)));
        drone.set_standby(true);
        assert!(!drone.is_accelerating());
        assert!(approx(drone.step(), 0.0));
        assert!(drone.move_to(Vec3::new(0.0, 0.0, 5.0)));
        assert!(!drone.is_standby());
    }

    #[test]
    fn empty_tank_stops_acceleration_mid_path() {
        let mut drone = drone_at(Vec3::ZERO);
        assert!(drone.move_to(Vec3::new(8.0, 0.0, 0.0)));
        assert!(drone.is_accelerating());
        if let Some(tank) = drone.energy_mut() {
            tank.drain(5.0);
        }
        assert!(!drone.is_powered());
        assert!(drone.has_pending_path());
        assert!(!drone.is_accelerating());
    }

    #[test]
    fn clearing_path_cancels_teleport() {
        let limits = NavigationLimits {
            can_teleport: true,
            ..NavigationLimits::default()
        };
        let mut drone = drone_at(Vec3::ZERO).with_limits(limits);
        assert!(!drone.move_to(Vec3::new(500.0, 70.0, 0.0)));
        drone.clear_path();
        assert!(!drone.is_going_to_teleport());
        assert!(!drone.has_path());
        assert!(approx(drone.step(), 0.0));
        assert_eq!(drone.position(), Vec3::ZERO);
    }

    #[test]
    fn drone_without_energy_store() {
        let drone = Drone::without_energy(OwnerId::new(), RegionId::new(), Vec3::ZERO);
        assert!(drone.energy().is_none());
        assert!(approx(drone.energy_level(), 0.0));
    }
}
