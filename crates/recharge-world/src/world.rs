//! In-memory world: regions, loaded chunks, stations, and protected areas.
//!
//! [`World`] is the reference [`WorldView`] implementation driven by the
//! tick cycle. Regions are independent slices of the world; each keeps its
//! own set of loaded chunk columns and protected areas. Stations live in a
//! single index keyed by [`StationId`].

use std::collections::{BTreeMap, BTreeSet};

use recharge_types::{BlockPos, ChunkPos, OwnerId, RegionId, StationId};
use tracing::debug;

use crate::error::WorldError;
use crate::station::ChargingStation;
use crate::view::WorldView;

/// An axis-aligned box of blocks guarded against everyone but its trusted owners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedArea {
    /// Inclusive lower corner.
    pub min: BlockPos,
    /// Inclusive upper corner.
    pub max: BlockPos,
    /// Owners allowed to act inside the area.
    pub trusted: BTreeSet<OwnerId>,
}

impl ProtectedArea {
    /// Build an area from two opposite corners, in any order.
    pub fn new(a: BlockPos, b: BlockPos) -> Self {
        Self {
            min: BlockPos::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: BlockPos::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
            trusted: BTreeSet::new(),
        }
    }

    /// Add a trusted owner.
    #[must_use]
    pub fn trusting(mut self, owner: OwnerId) -> Self {
        self.trusted.insert(owner);
        self
    }

    /// Whether the area contains the block.
    pub const fn contains(&self, pos: BlockPos) -> bool {
        pos.x >= self.min.x
            && pos.x <= self.max.x
            && pos.y >= self.min.y
            && pos.y <= self.max.y
            && pos.z >= self.min.z
            && pos.z <= self.max.z
    }

    /// Whether `owner` is kept out of `pos` by this area.
    pub fn denies(&self, owner: OwnerId, pos: BlockPos) -> bool {
        self.contains(pos) && !self.trusted.contains(&owner)
    }
}

/// Mutable runtime state for a single region.
#[derive(Debug, Clone, Default)]
struct RegionState {
    name: String,
    loaded_chunks: BTreeSet<ChunkPos>,
    protected: Vec<ProtectedArea>,
}

/// The simulated world.
#[derive(Debug, Clone, Default)]
pub struct World {
    regions: BTreeMap<RegionId, RegionState>,
    stations: BTreeMap<StationId, ChargingStation>,
}

impl World {
    /// Create an empty world with no regions.
    pub const fn new() -> Self {
        Self {
            regions: BTreeMap::new(),
            stations: BTreeMap::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Regions
    // -----------------------------------------------------------------------

    /// Register a new region. Nothing in it is loaded yet.
    pub fn add_region(&mut self, name: impl Into<String>) -> RegionId {
        let id = RegionId::new();
        self.regions.insert(
            id,
            RegionState {
                name: name.into(),
                ..RegionState::default()
            },
        );
        id
    }

    /// Drop a region along with every station placed in it.
    ///
    /// Returns the number of stations discarded.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::RegionNotFound`] if the region does not exist.
    pub fn remove_region(&mut self, region: RegionId) -> Result<usize, WorldError> {
        self.regions
            .remove(&region)
            .ok_or(WorldError::RegionNotFound(region))?;
        let before = self.stations.len();
        self.stations.retain(|_, st| st.region() != region);
        Ok(before.saturating_sub(self.stations.len()))
    }

    /// Identifiers of all regions, in creation order.
    pub fn regions(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.regions.keys().copied()
    }

    /// Human-readable region name.
    pub fn region_name(&self, region: RegionId) -> Option<&str> {
        self.regions.get(&region).map(|r| r.name.as_str())
    }

    fn region_mut(&mut self, region: RegionId) -> Result<&mut RegionState, WorldError> {
        self.regions
            .get_mut(&region)
            .ok_or(WorldError::RegionNotFound(region))
    }

    /// Mark a chunk column as loaded.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::RegionNotFound`] if the region does not exist.
    pub fn load_chunk(&mut self, region: RegionId, chunk: ChunkPos) -> Result<(), WorldError> {
        self.region_mut(region)?.loaded_chunks.insert(chunk);
        Ok(())
    }

    /// Mark a chunk column as unloaded.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::RegionNotFound`] if the region does not exist.
    pub fn unload_chunk(&mut self, region: RegionId, chunk: ChunkPos) -> Result<(), WorldError> {
        self.region_mut(region)?.loaded_chunks.remove(&chunk);
        Ok(())
    }

    /// Load every chunk column within `radius` chunks of `center`.
    ///
    /// Returns the region's total loaded chunk count afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::RegionNotFound`] if the region does not exist.
    pub fn load_area(
        &mut self,
        region: RegionId,
        center: BlockPos,
        radius: i32,
    ) -> Result<usize, WorldError> {
        let origin = center.chunk();
        let state = self.region_mut(region)?;
        let radius = radius.max(0);
        for dx in radius.saturating_neg()..=radius {
            for dz in radius.saturating_neg()..=radius {
                state.loaded_chunks.insert(ChunkPos::new(
                    origin.x.saturating_add(dx),
                    origin.z.saturating_add(dz),
                ));
            }
        }
        Ok(state.loaded_chunks.len())
    }

    /// Add a protected area to a region.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::RegionNotFound`] if the region does not exist.
    pub fn protect(&mut self, region: RegionId, area: ProtectedArea) -> Result<(), WorldError> {
        self.region_mut(region)?.protected.push(area);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Stations
    // -----------------------------------------------------------------------

    /// Place a station in the world.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::RegionNotFound`] if the station's region is
    /// unknown, or [`WorldError::DuplicateStation`] if the id is taken.
    pub fn add_station(&mut self, station: ChargingStation) -> Result<StationId, WorldError> {
        if !self.regions.contains_key(&station.region()) {
            return Err(WorldError::RegionNotFound(station.region()));
        }
        let id = station.id();
        if self.stations.contains_key(&id) {
            return Err(WorldError::DuplicateStation(id));
        }
        debug!(station = %id, pos = %station.pos(), "Station placed");
        self.stations.insert(id, station);
        Ok(id)
    }

    /// Mark a station as removed. It stays visible (as removed) until
    /// [`purge_removed`](Self::purge_removed) runs.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::StationNotFound`] if the station does not exist.
    pub fn remove_station(&mut self, id: StationId) -> Result<(), WorldError> {
        self.station_mut(id)?.mark_removed();
        debug!(station = %id, "Station removed");
        Ok(())
    }

    /// Drop every station marked removed. Returns how many were dropped.
    pub fn purge_removed(&mut self) -> usize {
        let before = self.stations.len();
        self.stations.retain(|_, st| !st.is_removed());
        before.saturating_sub(self.stations.len())
    }

    /// Mutable access to a station.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::StationNotFound`] if the station does not exist.
    pub fn station_mut(&mut self, id: StationId) -> Result<&mut ChargingStation, WorldError> {
        self.stations
            .get_mut(&id)
            .ok_or(WorldError::StationNotFound(id))
    }

    /// Mutable iteration over every station.
    pub fn stations_mut(&mut self) -> impl Iterator<Item = &mut ChargingStation> {
        self.stations.values_mut()
    }

    /// Number of stations (including ones marked removed but not yet purged).
    pub fn station_count(&self) -> usize {
        self.stations.len()
    }
}

impl WorldView for World {
    fn stations(&self) -> Box<dyn Iterator<Item = &ChargingStation> + '_> {
        Box::new(self.stations.values())
    }

    fn station(&self, id: StationId) -> Option<&ChargingStation> {
        self.stations.get(&id)
    }

    fn is_loaded(&self, region: RegionId, pos: BlockPos) -> bool {
        self.regions
            .get(&region)
            .is_some_and(|r| r.loaded_chunks.contains(&pos.chunk()))
    }

    fn is_protected(&self, region: RegionId, owner: OwnerId, pos: BlockPos) -> bool {
        self.regions
            .get(&region)
            .is_some_and(|r| r.protected.iter().any(|area| area.denies(owner, pos)))
    }
}
