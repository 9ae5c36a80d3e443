//! Read-only world queries consumed by drone behaviors.
//!
//! Behaviors never own the world. Each poll receives a `&dyn WorldView`,
//! which keeps the station index, loadedness, and protection lookups behind
//! one narrow seam that tests can replace wholesale.

use recharge_types::{BlockPos, OwnerId, RegionId, StationId};

use crate::station::ChargingStation;

/// The world as seen by a drone behavior during a single poll.
pub trait WorldView {
    /// Every station known to the world, across all regions.
    ///
    /// Callers filter by region themselves.
    fn stations(&self) -> Box<dyn Iterator<Item = &ChargingStation> + '_>;

    /// Look up a single station by identifier.
    ///
    /// Returns `None` once the station has been purged from the world.
    fn station(&self, id: StationId) -> Option<&ChargingStation>;

    /// Whether the block at `pos` in `region` is currently loaded.
    fn is_loaded(&self, region: RegionId, pos: BlockPos) -> bool;

    /// Whether `pos` in `region` is protected against actions by `owner`.
    fn is_protected(&self, region: RegionId, owner: OwnerId, pos: BlockPos) -> bool;
}
