//! Finding, reserving, and using a charging station.
//!
//! [`ChargingGoal`] is an exclusive [`Behavior`]. Selection runs only for
//! drones that are low on energy but not completely empty:
//!
//! 1. Every station in the drone's region that is loaded, within search
//!    range, unclaimed, stocked above the low-energy threshold, and fitted
//!    with a dispenser is a candidate. Rejections past the region/range
//!    check are written to the debug sink.
//! 2. Candidates are tried nearest first. A candidate is taken if it is not
//!    protected against the drone's owner, the navigator accepts a path to
//!    the hover point above it (or will teleport there), and the claim on
//!    its position is won. If every candidate fails after the drone was
//!    already sent towards one of them, its path is cleared again.
//!
//! While running, each tick falls into one of three cases:
//!
//! - **Abort**: the station is gone, removed, or lost its last dispenser.
//! - **Docked** (no pending path, no teleport): keep going while the drone
//!   is below full and the station still leads it on energy. After
//!   `dock_retry_ticks` docked ticks the drone is nudged onto the station;
//!   if that cannot produce a path it is forced into standby, once.
//! - **In transit**: keep going while the drone is flying.
//!
//! The station's claim is re-asserted on every docked or in-transit tick.
//! If it turns out another drone now holds it, the goal aborts.

use recharge_types::{BlockPos, DebugReason, StationId};
use recharge_world::{ChargingStation, ClaimOutcome};
use tracing::{debug, info};

use crate::behavior::{Behavior, BehaviorContext};
use crate::config::ChargingConfig;
use crate::drone::DroneControl;
use crate::error::AgentError;

/// Hover point above a station used when approaching it.
const APPROACH_OFFSET: (f64, f64, f64) = (0.5, 1.0, 0.5);

/// Hover point used to nudge a stuck drone onto the station.
const DOCK_OFFSET: (f64, f64, f64) = (0.5, 1.5, 0.5);

/// A station that passed every eligibility filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// The station.
    pub station: StationId,
    /// Its block position.
    pub pos: BlockPos,
    /// Squared distance from the drone's block, used for ordering.
    pub distance_sqr: f64,
}

/// The charging behavior and its per-drone state.
#[derive(Debug, Clone)]
pub struct ChargingGoal {
    config: ChargingConfig,
    is_executing: bool,
    current_station: Option<StationId>,
    dock_timer: u32,
    standby_forced: bool,
}

impl ChargingGoal {
    /// Create an idle charging goal.
    pub const fn new(config: ChargingConfig) -> Self {
        Self {
            config,
            is_executing: false,
            current_station: None,
            dock_timer: 0,
            standby_forced: false,
        }
    }

    /// Whether the goal considers itself active.
    pub const fn is_executing(&self) -> bool {
        self.is_executing
    }

    /// The station being approached or used.
    pub const fn current_station(&self) -> Option<StationId> {
        self.current_station
    }

    /// Consecutive docked ticks since the last nudge.
    pub const fn dock_timer(&self) -> u32 {
        self.dock_timer
    }

    /// The thresholds this goal compares against.
    pub const fn config(&self) -> &ChargingConfig {
        &self.config
    }

    /// Whether the drone's energy is in the range that warrants a search.
    ///
    /// Strictly between zero and the low-energy threshold. A drone with no
    /// energy store never searches.
    pub fn wants_charge(&self, drone: &dyn DroneControl) -> bool {
        drone.energy().is_some_and(|store| {
            let level = store.level();
            level < self.config.low_energy_threshold && level > 0.0
        })
    }

    /// Stations eligible for the drone, nearest first.
    ///
    /// Rejections after the region/loaded/range checks are recorded in the
    /// debug sink.
    pub fn candidates(&self, ctx: &mut BehaviorContext<'_>) -> Vec<Candidate> {
        let region = ctx.drone.region();
        let position = ctx.drone.position();
        let block = ctx.drone.block_position();
        let range_sqr = self.config.search_range_sqr();
        let world = ctx.world;

        let mut candidates: Vec<Candidate> = world
            .stations()
            .filter(|st| st.region() == region && world.is_loaded(region, st.pos()))
            .filter(|st| position.distance_sqr(st.pos().center()) <= range_sqr)
            .filter(|st| match self.rejection(st, ctx.claims.is_claimed(st.pos(), ctx.tick)) {
                Some(reason) => {
                    ctx.debug.record(reason, st.pos());
                    false
                }
                None => true,
            })
            .map(|st| Candidate {
                station: st.id(),
                pos: st.pos(),
                distance_sqr: st.pos().distance_sqr(block),
            })
            .collect();

        candidates.sort_by(|a, b| a.distance_sqr.total_cmp(&b.distance_sqr));
        candidates
    }

    /// The first eligibility filter a station fails, if any.
    fn rejection(&self, station: &ChargingStation, claimed: bool) -> Option<DebugReason> {
        if claimed {
            Some(DebugReason::Claimed)
        } else if station.energy() <= self.config.low_energy_threshold {
            Some(DebugReason::NotEnoughEnergy)
        } else if !station.has_dispenser() {
            Some(DebugReason::NoDispenserUpgrades)
        } else {
            None
        }
    }

    /// Re-assert the claim on `pos`. Returns `false` (and deactivates) if
    /// another drone holds it now.
    fn reassert_claim(&mut self, ctx: &mut BehaviorContext<'_>, pos: BlockPos) -> bool {
        match ctx.claims.claim(pos, ctx.drone.id(), ctx.tick) {
            ClaimOutcome::Contested { holder } => {
                debug!(
                    agent = %ctx.drone.id(),
                    %holder,
                    %pos,
                    tick = ctx.tick,
                    "Charging station claim lost"
                );
                ctx.debug.record(DebugReason::ClaimLost, pos);
                self.is_executing = false;
                false
            }
            ClaimOutcome::Acquired | ClaimOutcome::Refreshed => true,
        }
    }

    const fn abort(&mut self) -> bool {
        self.is_executing = false;
        false
    }
}

impl Behavior for ChargingGoal {
    fn name(&self) -> &'static str {
        "charging"
    }

    fn try_select(&mut self, ctx: &mut BehaviorContext<'_>) -> Result<bool, AgentError> {
        let candidates = if self.wants_charge(&*ctx.drone) {
            self.candidates(ctx)
        } else {
            Vec::new()
        };

        let agent = ctx.drone.id();
        let mut redirected = false;
        for candidate in candidates {
            let pos = candidate.pos;
            if ctx
                .world
                .is_protected(ctx.drone.region(), ctx.drone.owner(), pos)
            {
                ctx.debug.record(DebugReason::Protected, pos);
                continue;
            }

            let (dx, dy, dz) = APPROACH_OFFSET;
            let accepted = ctx.drone.move_to(pos.offset(dx, dy, dz));
            if !(accepted || ctx.drone.is_going_to_teleport()) {
                ctx.debug.record(DebugReason::CantNavigate, pos);
                continue;
            }

            if let ClaimOutcome::Contested { holder } = ctx.claims.claim(pos, agent, ctx.tick) {
                debug!(%agent, %holder, %pos, "Lost race for charging station");
                ctx.debug.record(DebugReason::Claimed, pos);
                redirected = true;
                continue;
            }

            self.is_executing = true;
            self.current_station = Some(candidate.station);
            self.dock_timer = 0;
            self.standby_forced = false;
            info!(
                %agent,
                station = %candidate.station,
                %pos,
                distance_sqr = candidate.distance_sqr,
                tick = ctx.tick,
                "Heading to charging station"
            );
            return Ok(true);
        }

        if redirected {
            ctx.drone.clear_path();
        }
        self.is_executing = false;
        Ok(false)
    }

    fn tick(&mut self, ctx: &mut BehaviorContext<'_>) -> Result<bool, AgentError> {
        let Some(station) = self.current_station.and_then(|id| ctx.world.station(id)) else {
            return Ok(self.abort());
        };
        if !station.has_dispenser() || station.is_removed() {
            debug!(agent = %ctx.drone.id(), station = %station.id(), "Charging station unusable, aborting");
            return Ok(self.abort());
        }
        let pos = station.pos();
        let station_energy = station.energy();

        if !ctx.drone.is_going_to_teleport() && !ctx.drone.has_pending_path() {
            let agent = ctx.drone.id();
            let level = ctx
                .drone
                .energy()
                .ok_or(AgentError::MissingEnergyStore { agent })?
                .level();
            self.is_executing = level < self.config.full_level()
                && station_energy > level + self.config.energy_edge;

            if self.is_executing {
                self.dock_timer = self.dock_timer.saturating_add(1);
                if self.dock_timer > self.config.dock_retry_ticks && !self.standby_forced {
                    let (dx, dy, dz) = DOCK_OFFSET;
                    let accepted = ctx.drone.move_to(pos.offset(dx, dy, dz));
                    if accepted && ctx.drone.has_pending_path() {
                        self.dock_timer = 0;
                    } else {
                        debug!(%agent, %pos, "Drone cannot dock, forcing standby");
                        ctx.drone.set_standby(true);
                        self.standby_forced = true;
                    }
                }
                if !self.reassert_claim(ctx, pos) {
                    return Ok(false);
                }
            } else {
                info!(%agent, level, station_energy, tick = ctx.tick, "Charging finished");
            }
            Ok(self.is_executing)
        } else {
            self.dock_timer = 0;
            self.standby_forced = false;
            if !self.reassert_claim(ctx, pos) {
                return Ok(false);
            }
            Ok(ctx.drone.is_accelerating())
        }
    }

    fn stop(&mut self) {
        self.is_executing = false;
        self.current_station = None;
        self.dock_timer = 0;
        self.standby_forced = false;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use recharge_types::{AgentId, OwnerId, RegionId, UpgradeKind, Vec3};
    use recharge_world::{ClaimRegistry, ProtectedArea, World, WorldView};

    use super::*;
    use crate::debugger::DroneDebugger;
    use crate::drone::{EnergyStore, EnergyTank, Navigator};

    // -----------------------------------------------------------------------
    // Scripted drone
    // -----------------------------------------------------------------------

    /// A drone whose navigator answers from a script and records every call.
    #[derive(Debug)]
    struct ScriptedDrone {
        id: AgentId,
        owner: OwnerId,
        region: RegionId,
        position: Vec3,
        energy: Option<EnergyTank>,
        accept_moves: bool,
        arrive_instantly: bool,
        teleports: bool,
        teleport_pending: bool,
        path: Option<bool>,
        accelerating: bool,
        standby: bool,
        standby_calls: u32,
        path_clears: u32,
        moves: Vec<Vec3>,
        /// Simulates another drone grabbing the station during our move.
        race: Option<(Arc<ClaimRegistry>, AgentId, u64)>,
    }

    impl ScriptedDrone {
        fn new(region: RegionId, position: Vec3, energy: f64) -> Self {
            Self {
                id: AgentId::new(),
                owner: OwnerId::new(),
                region,
                position,
                energy: Some(EnergyTank::new(energy, 100.0)),
                accept_moves: true,
                arrive_instantly: false,
                teleports: false,
                teleport_pending: false,
                path: None,
                accelerating: false,
                standby: false,
                standby_calls: 0,
                path_clears: 0,
                moves: Vec::new(),
                race: None,
            }
        }

        fn arrive(&mut self) {
            self.path = Some(true);
            self.accelerating = false;
        }

        fn set_level(&mut self, level: f64) {
            self.energy = Some(EnergyTank::new(level, 100.0));
        }
    }

    impl Navigator for ScriptedDrone {
        fn move_to(&mut self, target: Vec3) -> bool {
            self.moves.push(target);
            if let Some((claims, rival, tick)) = self.race.take() {
                claims.claim(BlockPos::containing(target.offset(0.0, -1.0, 0.0)), rival, tick);
            }
            if self.accept_moves {
                self.path = Some(self.arrive_instantly);
                self.accelerating = !self.arrive_instantly;
                true
            } else {
                self.teleport_pending = self.teleports;
                false
            }
        }

        fn is_going_to_teleport(&self) -> bool {
            self.teleport_pending
        }

        fn has_path(&self) -> bool {
            self.path.is_some()
        }

        fn path_complete(&self) -> bool {
            self.path == Some(true)
        }

        fn clear_path(&mut self) {
            self.path_clears = self.path_clears.saturating_add(1);
            self.path = None;
            self.teleport_pending = false;
            self.accelerating = false;
        }
    }

    impl DroneControl for ScriptedDrone {
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
            self.energy.as_ref().map(|t| t as &dyn EnergyStore)
        }

        fn set_standby(&mut self, standby: bool) {
            self.standby_calls = self.standby_calls.saturating_add(1);
            self.standby = standby;
        }

        fn is_standby(&self) -> bool {
            self.standby
        }

        fn is_accelerating(&self) -> bool {
            self.accelerating
        }
    }

    // -----------------------------------------------------------------------
    // Fixture
    // -----------------------------------------------------------------------

    struct Fixture {
        world: World,
        region: RegionId,
        claims: Arc<ClaimRegistry>,
        debug: DroneDebugger,
        goal: ChargingGoal,
    }

    impl Fixture {
        fn new() -> Self {
            let mut world = World::new();
            let region = world.add_region("test");
            world.load_area(region, BlockPos::new(0, 64, 0), 8).unwrap();
            let config = ChargingConfig {
                low_energy_threshold: 5.0,
                max_energy: 100.0,
                ..ChargingConfig::default()
            };
            Self {
                world,
                region,
                claims: Arc::new(ClaimRegistry::new(region, 4)),
                debug: DroneDebugger::new(AgentId::new()),
                goal: ChargingGoal::new(config),
            }
        }

        fn station(&mut self, pos: BlockPos, energy: f64, dispensers: u32) -> StationId {
            let st = ChargingStation::new(self.region, pos)
                .with_capacity(100.0)
                .with_energy(energy)
                .with_upgrade(UpgradeKind::Dispenser, dispensers);
            self.world.add_station(st).unwrap()
        }

        fn drone(&self, energy: f64) -> ScriptedDrone {
            ScriptedDrone::new(self.region, Vec3::new(0.5, 64.0, 0.5), energy)
        }

        fn select(&mut self, drone: &mut ScriptedDrone, tick: u64) -> Result<bool, AgentError> {
            let mut ctx = BehaviorContext {
                tick,
                drone,
                world: &self.world,
                claims: &self.claims,
                debug: &mut self.debug,
            };
            self.goal.try_select(&mut ctx)
        }

        fn tick(&mut self, drone: &mut ScriptedDrone, tick: u64) -> Result<bool, AgentError> {
            let mut ctx = BehaviorContext {
                tick,
                drone,
                world: &self.world,
                claims: &self.claims,
                debug: &mut self.debug,
            };
            self.goal.tick(&mut ctx)
        }

        fn candidates(&mut self, drone: &mut ScriptedDrone, tick: u64) -> Vec<Candidate> {
            let mut ctx = BehaviorContext {
                tick,
                drone,
                world: &self.world,
                claims: &self.claims,
                debug: &mut self.debug,
            };
            self.goal.candidates(&mut ctx)
        }

        fn reasons(&self) -> Vec<DebugReason> {
            self.debug.entries().map(|e| e.reason).collect()
        }
    }

    fn hover(pos: BlockPos) -> Vec3 {
        pos.offset(0.5, 1.0, 0.5)
    }

    // -----------------------------------------------------------------------
    // Selection preconditions
    // -----------------------------------------------------------------------

    #[test]
    fn empty_drone_never_searches() {
        let mut fx = Fixture::new();
        fx.station(BlockPos::new(3, 64, 0), 50.0, 1);
        let mut drone = fx.drone(0.0);
        assert!(!fx.select(&mut drone, 1).unwrap());
        assert!(drone.moves.is_empty());
        assert!(!fx.goal.is_executing());
    }

    #[test]
    fn drone_at_threshold_never_searches() {
        let mut fx = Fixture::new();
        fx.station(BlockPos::new(3, 64, 0), 50.0, 1);
        let mut drone = fx.drone(5.0);
        assert!(!fx.select(&mut drone, 1).unwrap());
        assert!(drone.moves.is_empty());
    }

    #[test]
    fn drone_just_above_zero_searches() {
        let mut fx = Fixture::new();
        fx.station(BlockPos::new(3, 64, 0), 50.0, 1);
        let mut drone = fx.drone(0.001);
        assert!(fx.select(&mut drone, 1).unwrap());
    }

    #[test]
    fn drone_without_energy_store_never_searches() {
        let mut fx = Fixture::new();
        fx.station(BlockPos::new(3, 64, 0), 50.0, 1);
        let mut drone = fx.drone(2.0);
        drone.energy = None;
        assert!(!fx.select(&mut drone, 1).unwrap());
        assert!(drone.moves.is_empty());
    }

    // -----------------------------------------------------------------------
    // Filtering and ordering
    // -----------------------------------------------------------------------

    #[test]
    fn nearer_station_attempted_first() {
        let mut fx = Fixture::new();
        let a = BlockPos::new(10, 64, 0);
        let b = BlockPos::new(5, 64, 0);
        fx.station(a, 50.0, 1);
        let b_id = fx.station(b, 80.0, 1);

        let mut drone = fx.drone(2.0);
        drone.accept_moves = false;
        assert!(!fx.select(&mut drone, 1).unwrap());
        assert_eq!(drone.moves, vec![hover(b), hover(a)]);
        assert_eq!(
            fx.reasons(),
            vec![DebugReason::CantNavigate, DebugReason::CantNavigate]
        );

        drone.accept_moves = true;
        assert!(fx.select(&mut drone, 2).unwrap());
        assert_eq!(fx.goal.current_station(), Some(b_id));
        assert_eq!(fx.claims.holder_of(b, 2), Some(drone.id));
    }

    #[test]
    fn candidates_sorted_by_distance() {
        let mut fx = Fixture::new();
        for (x, z) in [(20, 3), (-4, 1), (9, -9), (2, 2), (-15, 0), (7, 0)] {
            fx.station(BlockPos::new(x, 64, z), 50.0, 1);
        }
        let mut drone = fx.drone(2.0);
        let found = fx.candidates(&mut drone, 1);
        assert_eq!(found.len(), 6);
        assert!(found
            .windows(2)
            .all(|w| w[0].distance_sqr <= w[1].distance_sqr));
    }

    #[test]
    fn station_claimed_by_other_is_excluded() {
        let mut fx = Fixture::new();
        let near = BlockPos::new(2, 64, 0);
        let far = BlockPos::new(12, 64, 0);
        fx.station(near, 50.0, 1);
        let far_id = fx.station(far, 50.0, 1);
        fx.claims.claim(near, AgentId::new(), 1);

        let mut drone = fx.drone(2.0);
        let found = fx.candidates(&mut drone, 1);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].station, far_id);

        assert!(fx.select(&mut drone, 1).unwrap());
        assert_eq!(drone.moves, vec![hover(far)]);
        assert!(fx.reasons().contains(&DebugReason::Claimed));
    }

    #[test]
    fn own_stale_claim_from_previous_tick_still_excludes() {
        let mut fx = Fixture::new();
        let pos = BlockPos::new(2, 64, 0);
        fx.station(pos, 50.0, 1);
        let mut drone = fx.drone(2.0);
        fx.claims.claim(pos, drone.id, 1);
        assert!(!fx.select(&mut drone, 2).unwrap());
        assert_eq!(fx.reasons(), vec![DebugReason::Claimed]);
    }

    #[test]
    fn ineligible_stations_record_first_failure() {
        let mut fx = Fixture::new();
        // At the threshold exactly: not enough energy.
        fx.station(BlockPos::new(1, 64, 0), 5.0, 1);
        // No dispenser.
        fx.station(BlockPos::new(2, 64, 0), 50.0, 0);
        // Both low energy and no dispenser: energy reported first.
        fx.station(BlockPos::new(3, 64, 0), 1.0, 0);

        let mut drone = fx.drone(2.0);
        assert!(!fx.select(&mut drone, 1).unwrap());
        let mut reasons = fx.reasons();
        reasons.sort();
        assert_eq!(
            reasons,
            vec![
                DebugReason::NotEnoughEnergy,
                DebugReason::NotEnoughEnergy,
                DebugReason::NoDispenserUpgrades,
            ]
        );
        assert!(drone.moves.is_empty());
    }

    #[test]
    fn foreign_region_and_unloaded_stations_are_silently_ignored() {
        let mut fx = Fixture::new();
        let other = fx.world.add_region("elsewhere");
        fx.world.load_area(other, BlockPos::new(0, 64, 0), 2).unwrap();
        fx.world
            .add_station(
                ChargingStation::new(other, BlockPos::new(1, 64, 0))
                    .with_energy(15.0)
                    .with_upgrade(UpgradeKind::Dispenser, 1),
            )
            .unwrap();
        // Far outside the loaded area of our region.
        fx.station(BlockPos::new(1000, 64, 0), 50.0, 1);

        let mut drone = fx.drone(2.0);
        assert!(!fx.select(&mut drone, 1).unwrap());
        assert!(fx.debug.is_empty());
    }

    #[test]
    fn range_check_includes_boundary() {
        let mut fx = Fixture::new();
        fx.goal = ChargingGoal::new(ChargingConfig {
            search_range: 16,
            low_energy_threshold: 5.0,
            max_energy: 100.0,
            ..ChargingConfig::default()
        });
        let pos = BlockPos::new(0, 64, 0);
        fx.station(pos, 50.0, 1);

        let mut on_edge = fx.drone(2.0);
        on_edge.position = pos.center().offset(16.0, 0.0, 0.0);
        assert_eq!(fx.candidates(&mut on_edge, 1).len(), 1);

        let mut beyond = fx.drone(2.0);
        beyond.position = pos.center().offset(16.1, 0.0, 0.0);
        assert!(fx.candidates(&mut beyond, 1).is_empty());
    }

    // -----------------------------------------------------------------------
    // Candidate attempts
    // -----------------------------------------------------------------------

    #[test]
    fn protected_station_skipped_for_next() {
        let mut fx = Fixture::new();
        let guarded = BlockPos::new(2, 64, 0);
        let open = BlockPos::new(6, 64, 0);
        fx.station(guarded, 50.0, 1);
        let open_id = fx.station(open, 50.0, 1);
        fx.world
            .protect(fx.region, ProtectedArea::new(guarded, guarded))
            .unwrap();

        let mut drone = fx.drone(2.0);
        assert!(fx.select(&mut drone, 1).unwrap());
        assert_eq!(fx.goal.current_station(), Some(open_id));
        assert_eq!(drone.moves, vec![hover(open)]);
        assert_eq!(fx.reasons(), vec![DebugReason::Protected]);
        assert!(!fx.claims.is_claimed(guarded, 1));
    }

    #[test]
    fn teleport_counts_as_accepted() {
        let mut fx = Fixture::new();
        let pos = BlockPos::new(4, 64, 0);
        fx.station(pos, 50.0, 1);
        let mut drone = fx.drone(2.0);
        drone.accept_moves = false;
        drone.teleports = true;
        assert!(fx.select(&mut drone, 1).unwrap());
        assert!(fx.claims.is_claimed(pos, 1));
    }

    #[test]
    fn lost_claim_race_moves_to_next_candidate() {
        let mut fx = Fixture::new();
        let near = BlockPos::new(2, 64, 0);
        let far = BlockPos::new(8, 64, 0);
        fx.station(near, 50.0, 1);
        let far_id = fx.station(far, 50.0, 1);
        let rival = AgentId::new();

        let mut drone = fx.drone(2.0);
        drone.race = Some((Arc::clone(&fx.claims), rival, 1));
        assert!(fx.select(&mut drone, 1).unwrap());
        assert_eq!(fx.goal.current_station(), Some(far_id));
        assert_eq!(fx.claims.holder_of(near, 1), Some(rival));
        assert_eq!(fx.claims.holder_of(far, 1), Some(drone.id));
        assert_eq!(fx.reasons(), vec![DebugReason::Claimed]);
    }

    #[test]
    fn lost_race_on_only_candidate_clears_path() {
        let mut fx = Fixture::new();
        let pos = BlockPos::new(2, 64, 0);
        fx.station(pos, 50.0, 1);
        let rival = AgentId::new();

        let mut drone = fx.drone(2.0);
        drone.race = Some((Arc::clone(&fx.claims), rival, 1));
        assert!(!fx.select(&mut drone, 1).unwrap());
        assert_eq!(drone.moves, vec![hover(pos)]);
        assert_eq!(drone.path_clears, 1);
        assert!(!drone.has_path());
        assert!(!drone.is_accelerating());
        assert_eq!(fx.claims.holder_of(pos, 1), Some(rival));
        assert!(!fx.goal.is_executing());
    }

    #[test]
    fn failed_search_without_redirect_keeps_path() {
        let mut fx = Fixture::new();
        fx.station(BlockPos::new(2, 64, 0), 50.0, 1);
        let mut drone = fx.drone(2.0);
        drone.accept_moves = false;
        drone.path = Some(false);
        assert!(!fx.select(&mut drone, 1).unwrap());
        assert_eq!(drone.path_clears, 0);
        assert!(drone.has_pending_path());
    }

    #[test]
    fn second_drone_picks_a_different_station() {
        let mut fx = Fixture::new();
        let a = BlockPos::new(2, 64, 0);
        let b = BlockPos::new(4, 64, 0);
        let a_id = fx.station(a, 50.0, 1);
        let b_id = fx.station(b, 50.0, 1);

        let mut first = fx.drone(2.0);
        assert!(fx.select(&mut first, 1).unwrap());
        assert_eq!(fx.goal.current_station(), Some(a_id));

        let mut second_goal = fx.goal.clone();
        second_goal.stop();
        fx.goal = second_goal;
        let mut second = fx.drone(2.0);
        assert!(fx.select(&mut second, 1).unwrap());
        assert_eq!(fx.goal.current_station(), Some(b_id));
    }

    // -----------------------------------------------------------------------
    // Continuation
    // -----------------------------------------------------------------------

    fn selected(fx: &mut Fixture, energy: f64) -> (ScriptedDrone, StationId, BlockPos) {
        let pos = BlockPos::new(3, 64, 0);
        let id = fx.station(pos, 80.0, 1);
        let mut drone = fx.drone(energy);
        assert!(fx.select(&mut drone, 1).unwrap());
        (drone, id, pos)
    }

    #[test]
    fn in_transit_follows_acceleration() {
        let mut fx = Fixture::new();
        let (mut drone, _, pos) = selected(&mut fx, 2.0);
        assert!(fx.tick(&mut drone, 2).unwrap());
        assert_eq!(fx.claims.holder_of(pos, 2), Some(drone.id));

        drone.accelerating = false;
        assert!(!fx.tick(&mut drone, 3).unwrap());
    }

    #[test]
    fn pending_teleport_counts_as_in_transit() {
        let mut fx = Fixture::new();
        let (mut drone, _, pos) = selected(&mut fx, 2.0);
        drone.arrive();
        for tick in 2..=4 {
            assert!(fx.tick(&mut drone, tick).unwrap());
        }
        assert_eq!(fx.goal.dock_timer(), 3);

        drone.path = None;
        drone.teleport_pending = true;
        drone.accelerating = true;
        assert!(fx.tick(&mut drone, 5).unwrap());
        assert_eq!(fx.goal.dock_timer(), 0);
        assert_eq!(fx.claims.holder_of(pos, 9), Some(drone.id));

        drone.accelerating = false;
        assert!(!fx.tick(&mut drone, 6).unwrap());
        assert_eq!(fx.goal.dock_timer(), 0);
        assert_eq!(drone.moves.len(), 1);
    }

    #[test]
    fn docked_drone_keeps_charging_and_claim() {
        let mut fx = Fixture::new();
        let (mut drone, _, pos) = selected(&mut fx, 2.0);
        drone.arrive();
        for tick in 2..=15 {
            assert!(fx.tick(&mut drone, tick).unwrap());
        }
        // Refreshed every tick, so still live well past the window.
        assert_eq!(fx.claims.holder_of(pos, 19), Some(drone.id));
        assert_eq!(fx.goal.dock_timer(), 14);
    }

    #[test]
    fn near_full_drone_stops() {
        let mut fx = Fixture::new();
        let (mut drone, _, _) = selected(&mut fx, 2.0);
        drone.arrive();
        assert!(fx.tick(&mut drone, 2).unwrap());
        drone.set_level(99.95);
        assert!(!fx.tick(&mut drone, 3).unwrap());
        assert!(!fx.goal.is_executing());
    }

    #[test]
    fn station_without_energy_edge_stops() {
        let mut fx = Fixture::new();
        let (mut drone, id, _) = selected(&mut fx, 2.0);
        drone.arrive();
        drone.set_level(79.95);
        assert!(!fx.tick(&mut drone, 2).unwrap());
        fx.world.station_mut(id).unwrap().supply(10.0);
        drone.set_level(70.0);
        assert!(fx.tick(&mut drone, 3).unwrap());
    }

    #[test]
    fn losing_dispenser_aborts_next_tick() {
        let mut fx = Fixture::new();
        let (mut drone, id, _) = selected(&mut fx, 2.0);
        drone.arrive();
        assert!(fx.tick(&mut drone, 2).unwrap());
        fx.world
            .station_mut(id)
            .unwrap()
            .remove_upgrade(UpgradeKind::Dispenser)
            .unwrap();
        assert!(!fx.tick(&mut drone, 3).unwrap());
        assert!(!fx.goal.is_executing());
    }

    #[test]
    fn removed_or_purged_station_aborts() {
        let mut fx = Fixture::new();
        let (mut drone, id, _) = selected(&mut fx, 2.0);
        fx.world.remove_station(id).unwrap();
        assert!(!fx.tick(&mut drone, 2).unwrap());

        let mut fx = Fixture::new();
        let (mut drone, id, _) = selected(&mut fx, 2.0);
        fx.world.remove_station(id).unwrap();
        fx.world.purge_removed();
        assert!(fx.world.station(id).is_none());
        assert!(!fx.tick(&mut drone, 2).unwrap());
    }

    #[test]
    fn stuck_drone_forced_into_standby_once() {
        let mut fx = Fixture::new();
        let (mut drone, _, pos) = selected(&mut fx, 2.0);
        drone.arrive();
        drone.accept_moves = false;
        for tick in 2..=21 {
            assert!(fx.tick(&mut drone, tick).unwrap());
        }
        assert_eq!(drone.standby_calls, 0);
        assert_eq!(fx.goal.dock_timer(), 20);

        // 21st docked tick: nudge rejected, standby forced.
        assert!(fx.tick(&mut drone, 22).unwrap());
        assert_eq!(drone.standby_calls, 1);
        assert!(drone.standby);
        assert_eq!(drone.moves.last().copied(), Some(pos.offset(0.5, 1.5, 0.5)));

        let nudges = drone.moves.len();
        for tick in 23..=60 {
            assert!(fx.tick(&mut drone, tick).unwrap());
        }
        assert_eq!(drone.standby_calls, 1);
        assert_eq!(drone.moves.len(), nudges);
    }

    #[test]
    fn successful_nudge_resets_dock_timer() {
        let mut fx = Fixture::new();
        let (mut drone, _, _) = selected(&mut fx, 2.0);
        drone.arrive();
        for tick in 2..=22 {
            assert!(fx.tick(&mut drone, tick).unwrap());
        }
        assert_eq!(fx.goal.dock_timer(), 0);
        assert_eq!(drone.standby_calls, 0);
        assert!(drone.has_pending_path());
    }

    #[test]
    fn accepted_nudge_without_path_forces_standby() {
        let mut fx = Fixture::new();
        let (mut drone, _, _) = selected(&mut fx, 2.0);
        drone.arrive();
        // The navigator accepts the nudge but reports the path done at once.
        drone.arrive_instantly = true;
        for tick in 2..=22 {
            assert!(fx.tick(&mut drone, tick).unwrap());
        }
        assert_eq!(drone.standby_calls, 1);
    }

    #[test]
    fn moving_again_rearms_standby_latch() {
        let mut fx = Fixture::new();
        let (mut drone, _, _) = selected(&mut fx, 2.0);
        drone.arrive();
        drone.accept_moves = false;
        for tick in 2..=22 {
            assert!(fx.tick(&mut drone, tick).unwrap());
        }
        assert_eq!(drone.standby_calls, 1);

        // Knocked off the pad: in transit again, then docked again.
        drone.path = Some(false);
        drone.accelerating = true;
        assert!(fx.tick(&mut drone, 23).unwrap());
        assert_eq!(fx.goal.dock_timer(), 0);
        drone.arrive();
        for tick in 24..=44 {
            assert!(fx.tick(&mut drone, tick).unwrap());
        }
        assert_eq!(drone.standby_calls, 2);
    }

    #[test]
    fn missing_energy_store_while_docked_is_fatal() {
        let mut fx = Fixture::new();
        let (mut drone, _, _) = selected(&mut fx, 2.0);
        drone.arrive();
        drone.energy = None;
        assert!(matches!(
            fx.tick(&mut drone, 2),
            Err(AgentError::MissingEnergyStore { agent }) if agent == drone.id
        ));
    }

    #[test]
    fn claim_taken_after_expiry_aborts() {
        let mut fx = Fixture::new();
        let (mut drone, _, pos) = selected(&mut fx, 2.0);
        let rival = AgentId::new();
        // Our claim from tick 1 is stale by tick 10; a rival takes it.
        assert_eq!(fx.claims.claim(pos, rival, 10), ClaimOutcome::Acquired);
        assert!(!fx.tick(&mut drone, 10).unwrap());
        assert!(!fx.goal.is_executing());
        assert_eq!(fx.reasons(), vec![DebugReason::ClaimLost]);
        assert_eq!(fx.claims.holder_of(pos, 10), Some(rival));
    }

    #[test]
    fn stop_clears_state() {
        let mut fx = Fixture::new();
        let (mut drone, _, _) = selected(&mut fx, 2.0);
        drone.arrive();
        assert!(fx.tick(&mut drone, 2).unwrap());
        fx.goal.stop();
        assert!(!fx.goal.is_executing());
        assert_eq!(fx.goal.current_station(), None);
        assert_eq!(fx.goal.dock_timer(), 0);
        assert!(!fx.tick(&mut drone, 3).unwrap());
    }
}
