//! World and fleet spawner.
//!
//! Builds the starting [`SimulationState`] from configuration: one loaded
//! area per region, stations scattered across it, and drones with random
//! starting energy and a random patrol loop. Everything random is drawn
//! from a single [`StdRng`] seeded with `world.seed`, so the same config
//! always yields the same world.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use recharge_agents::{ChargingGoal, Drone, EnergyTank, NavigationLimits, PatrolGoal};
use recharge_core::config::SimulationConfig;
use recharge_core::scheduler::BehaviorScheduler;
use recharge_core::tick::{EnergyRates, SimulationState};
use recharge_types::{BlockPos, CHUNK_SIZE, OwnerId, RegionId, UpgradeKind, Vec3};
use recharge_world::{ChargingStation, World};
use tracing::{debug, info};

use crate::error::EngineError;

/// Height stations are placed at.
const GROUND_Y: i32 = 64;

/// Height drones start and patrol at.
const FLIGHT_Y: f64 = 66.0;

/// Build the starting simulation state.
///
/// # Errors
///
/// Returns [`EngineError::World`] if a region or station cannot be added.
pub fn spawn_world(config: &SimulationConfig) -> Result<SimulationState, EngineError> {
    let mut rng = StdRng::seed_from_u64(config.world.seed);
    let mut world = World::new();
    let owner = OwnerId::new();
    let origin = BlockPos::new(0, GROUND_Y, 0);
    let spread = config
        .world
        .loaded_radius_chunks
        .max(0)
        .saturating_mul(CHUNK_SIZE);

    let mut regions = Vec::new();
    for index in 1..=config.world.regions {
        let region = world.add_region(format!("{} #{index}", config.world.name));
        world.load_area(region, origin, config.world.loaded_radius_chunks)?;
        for _ in 0..config.stations.count {
            let pos = BlockPos::new(
                rng.random_range(spread.saturating_neg()..=spread),
                GROUND_Y,
                rng.random_range(spread.saturating_neg()..=spread),
            );
            let station = ChargingStation::new(region, pos)
                .with_capacity(config.stations.capacity)
                .with_energy(config.stations.initial_energy)
                .with_dispense_rate(config.stations.dispense_rate)
                .with_upgrade(UpgradeKind::Dispenser, config.stations.dispensers);
            let id = world.add_station(station)?;
            debug!(%region, station = %id, %pos, "Station spawned");
        }
        regions.push(region);
    }

    let mut state = SimulationState::new(
        world,
        config.claims.staleness_window_ticks,
        EnergyRates::from_config(config),
    );

    for region in regions {
        for _ in 0..config.drones.count {
            spawn_drone(&mut state, &mut rng, config, region, owner);
        }
    }

    info!(
        seed = config.world.seed,
        regions = config.world.regions,
        stations = state.world.station_count(),
        drones = state.drones.len(),
        "World spawned"
    );
    Ok(state)
}

fn spawn_drone(
    state: &mut SimulationState,
    rng: &mut StdRng,
    config: &SimulationConfig,
    region: RegionId,
    owner: OwnerId,
) {
    let drones = &config.drones;
    let radius = drones.patrol_radius.abs();
    let max_energy = config.charging.max_energy.max(0.0);
    let min_energy = drones.initial_energy_min.clamp(0.0, max_energy);

    let random_point = |rng: &mut StdRng| {
        Vec3::new(
            rng.random_range(-radius..=radius),
            FLIGHT_Y,
            rng.random_range(-radius..=radius),
        )
    };

    let position = random_point(rng);
    let energy = rng.random_range(min_energy..=max_energy);
    let waypoints = (0..drones.patrol_waypoints)
        .map(|_| random_point(rng))
        .collect();

    let drone = Drone::new(owner, region, position, EnergyTank::new(energy, max_energy))
        .with_limits(NavigationLimits {
            speed: drones.speed,
            max_path_distance: drones.max_path_distance,
            can_teleport: drones.can_teleport,
        });
    let scheduler = BehaviorScheduler::new()
        .with(ChargingGoal::new(config.charging.clone()))
        .with(PatrolGoal::new(waypoints, config.charging.low_energy_threshold));
    let id = state.add_drone(drone, scheduler);
    debug!(agent = %id, %region, %position, energy, "Drone spawned");
}
