//! Tick cycle: the engine loop that drives the Recharge simulation.
//!
//! Each tick runs these phases in order:
//!
//! 1. **Clock** -- advance the world clock.
//! 2. **Movement** -- every drone with energy takes one navigation step and
//!    pays for it (per block flown plus a flat idle cost).
//! 3. **Charging** -- every drone hovering in the block directly above a
//!    usable station receives that station's dispense for the tick.
//! 4. **Supply** -- stations regenerate energy.
//! 5. **Behaviors** -- every drone's scheduler is polled against its
//!    region's claim registry.
//! 6. **Housekeeping** -- stale claims are pruned and removed stations are
//!    purged.
//!
//! Drones are visited in [`AgentId`] order, so a tick is deterministic
//! given the same starting state.

use std::collections::{BTreeMap, HashMap};

use recharge_agents::{
    AgentError, BehaviorContext, Drone, DroneControl, DroneDebugger, EnergyStore,
};
use recharge_types::{AgentId, BlockPos, RegionId, StationId};
use recharge_world::{ClaimDirectory, World, WorldError, WorldView};
use tracing::{debug, info};

use crate::clock::WorldClock;
use crate::config::SimulationConfig;
use crate::scheduler::BehaviorScheduler;

/// Name under which the charging behavior reports itself.
const CHARGING: &str = "charging";

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: crate::clock::ClockError,
    },

    /// A drone behavior failed.
    #[error("agent error for {agent_id}: {source}")]
    Agent {
        /// The drone whose behavior failed.
        agent_id: AgentId,
        /// The underlying agent error.
        source: AgentError,
    },

    /// A world operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}

/// Per-tick energy accounting rates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyRates {
    /// Energy a drone spends per block flown.
    pub flight_drain_per_block: f64,
    /// Energy a drone spends every tick.
    pub idle_drain_per_tick: f64,
    /// Energy every station gains per tick.
    pub station_supply_per_tick: f64,
}

impl EnergyRates {
    /// Rates from the drone and station sections of the configuration.
    pub const fn from_config(config: &SimulationConfig) -> Self {
        Self {
            flight_drain_per_block: config.drones.flight_drain_per_block,
            idle_drain_per_tick: config.drones.idle_drain_per_tick,
            station_supply_per_tick: config.stations.supply_per_tick,
        }
    }
}

/// A drone together with its behaviors and debug log.
#[derive(Debug)]
pub struct DroneSlot {
    /// The drone itself.
    pub drone: Drone,
    /// Its behaviors, in priority order.
    pub scheduler: BehaviorScheduler,
    /// Why it passed over stations.
    pub debugger: DroneDebugger,
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Drones whose charging behavior is active after this tick.
    pub drones_charging: u32,
    /// Drones that received energy from a station this tick.
    pub drones_docked: u32,
    /// Drones in standby after this tick.
    pub drones_standby: u32,
    /// Drones with an empty tank that received nothing this tick.
    pub drones_stranded: u32,
    /// Total drones in the simulation.
    pub drones_total: u32,
    /// Energy moved from stations into drones this tick.
    pub energy_dispensed: f64,
    /// Live claims across every region after this tick.
    pub live_claims: usize,
    /// Stale claims pruned this tick.
    pub pruned_claims: usize,
}

/// The mutable simulation state passed through the tick cycle.
#[derive(Debug)]
pub struct SimulationState {
    /// The world clock.
    pub clock: WorldClock,
    /// Regions and stations.
    pub world: World,
    /// Claim registries, one per region.
    pub claims: ClaimDirectory,
    /// Every drone, keyed by id.
    pub drones: BTreeMap<AgentId, DroneSlot>,
    /// Energy accounting rates.
    pub rates: EnergyRates,
}

impl SimulationState {
    /// Create a state at tick 0 with no drones.
    pub fn new(world: World, staleness_window: u64, rates: EnergyRates) -> Self {
        Self {
            clock: WorldClock::new(),
            world,
            claims: ClaimDirectory::new(staleness_window),
            drones: BTreeMap::new(),
            rates,
        }
    }

    /// Add a drone with its behaviors. Returns its id.
    pub fn add_drone(&mut self, drone: Drone, scheduler: BehaviorScheduler) -> AgentId {
        let id = drone.id();
        self.drones.insert(
            id,
            DroneSlot {
                drone,
                scheduler,
                debugger: DroneDebugger::new(id),
            },
        );
        id
    }

    /// A drone slot by id.
    pub fn drone(&self, id: AgentId) -> Option<&DroneSlot> {
        self.drones.get(&id)
    }

    /// Mutable access to a drone slot.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AgentNotFound`] if no such drone exists.
    pub fn drone_mut(&mut self, id: AgentId) -> Result<&mut DroneSlot, AgentError> {
        self.drones.get_mut(&id).ok_or(AgentError::AgentNotFound(id))
    }

    /// Unload a region: its stations, its drones, and its claim registry.
    ///
    /// Returns the number of drones removed.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::World`] if the region does not exist.
    pub fn unload_region(&mut self, region: RegionId) -> Result<usize, TickError> {
        let stations = self.world.remove_region(region)?;
        let before = self.drones.len();
        self.drones.retain(|_, slot| slot.drone.region() != region);
        let drones = before.saturating_sub(self.drones.len());
        self.claims.unload(region);
        info!(%region, stations, drones, "Region unloaded");
        Ok(drones)
    }
}

/// Execute one complete tick of the simulation.
///
/// # Errors
///
/// Returns [`TickError`] if the clock overflows, a station lookup fails, or
/// a behavior reports a construction fault.
pub fn run_tick(state: &mut SimulationState) -> Result<TickSummary, TickError> {
    let tick = state.clock.advance()?;
    debug!(tick, "Tick started");

    phase_movement(state);
    let (drones_docked, energy_dispensed) = phase_charging(state)?;
    phase_supply(state);
    phase_behaviors(state, tick)?;

    let pruned_claims = state.claims.prune_all(tick);
    let purged = state.world.purge_removed();
    if purged > 0 {
        debug!(tick, purged, "Removed stations purged");
    }

    let summary = TickSummary {
        tick,
        drones_charging: count_drones(state, |s| s.scheduler.is_active(CHARGING)),
        drones_docked,
        drones_standby: count_drones(state, |s| s.drone.is_standby()),
        drones_stranded: count_drones(state, |s| {
            s.drone.energy().is_some_and(|e| e.level() <= 0.0)
        }),
        drones_total: u32::try_from(state.drones.len()).unwrap_or(u32::MAX),
        energy_dispensed,
        live_claims: state.claims.live_claims(tick),
        pruned_claims,
    };

    info!(
        tick,
        charging = summary.drones_charging,
        docked = summary.drones_docked,
        standby = summary.drones_standby,
        live_claims = summary.live_claims,
        "Tick completed"
    );
    Ok(summary)
}

fn count_drones(state: &SimulationState, pred: impl Fn(&DroneSlot) -> bool) -> u32 {
    u32::try_from(state.drones.values().filter(|s| pred(s)).count()).unwrap_or(u32::MAX)
}

/// Move every drone that still has energy and bill it for the flight.
fn phase_movement(state: &mut SimulationState) {
    let rates = state.rates;
    for slot in state.drones.values_mut() {
        let drone = &mut slot.drone;
        if !drone.is_powered() {
            continue;
        }
        let flown = drone.step();
        if let Some(tank) = drone.energy_mut() {
            tank.drain(flown.mul_add(rates.flight_drain_per_block, rates.idle_drain_per_tick));
        }
    }
}

/// Charge drones hovering directly above a usable station.
///
/// Returns the number of drones charged and the total energy moved.
fn phase_charging(state: &mut SimulationState) -> Result<(u32, f64), TickError> {
    let pads: HashMap<(RegionId, BlockPos), StationId> = state
        .world
        .stations()
        .filter(|st| !st.is_removed() && st.has_dispenser())
        .map(|st| ((st.region(), st.pos().above()), st.id()))
        .collect();

    let mut docked: u32 = 0;
    let mut total = 0.0;
    for slot in state.drones.values_mut() {
        let drone = &mut slot.drone;
        let Some(&station_id) = pads.get(&(drone.region(), drone.block_position())) else {
            continue;
        };
        let Some((level, capacity)) = drone.energy().map(|e| (e.level(), e.capacity())) else {
            continue;
        };
        let amount = state
            .world
            .station_mut(station_id)?
            .dispense_to(level, capacity);
        if amount <= 0.0 {
            continue;
        }
        if let Some(tank) = drone.energy_mut() {
            tank.fill(amount);
        }
        docked = docked.saturating_add(1);
        total += amount;
    }
    Ok((docked, total))
}

fn phase_supply(state: &mut SimulationState) {
    let supply = state.rates.station_supply_per_tick;
    for station in state.world.stations_mut().filter(|st| !st.is_removed()) {
        station.supply(supply);
    }
}

/// Poll every drone's behaviors against its region's claim registry.
fn phase_behaviors(state: &mut SimulationState, tick: u64) -> Result<(), TickError> {
    let world = &state.world;
    for (&agent_id, slot) in &mut state.drones {
        let claims = state.claims.registry(slot.drone.region());
        slot.debugger.begin_tick(tick);
        let mut ctx = BehaviorContext {
            tick,
            drone: &mut slot.drone,
            world,
            claims: &claims,
            debug: &mut slot.debugger,
        };
        slot.scheduler
            .poll(&mut ctx)
            .map_err(|source| TickError::Agent { agent_id, source })?;
    }
    Ok(())
}
