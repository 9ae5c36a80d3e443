//! Charging stations: position, energy buffer, upgrades, and dispensing.
//!
//! A station is a single block that stores energy and, when it has at least
//! one [`UpgradeKind::Dispenser`] installed, pushes that energy into drones
//! hovering directly above it. Energy flows like pressure: only from the
//! fuller side to the emptier side, and never past equalization.

use std::collections::BTreeMap;

use recharge_types::{BlockPos, RegionId, StationId, UpgradeKind};
use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// Default energy capacity of a station's internal buffer.
pub const DEFAULT_STATION_CAPACITY: f64 = 20.0;

/// Default energy transferred per dispenser upgrade per tick.
pub const DEFAULT_DISPENSE_RATE: f64 = 0.25;

/// A charging station placed in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargingStation {
    id: StationId,
    region: RegionId,
    pos: BlockPos,
    energy: f64,
    capacity: f64,
    dispense_rate: f64,
    upgrades: BTreeMap<UpgradeKind, u32>,
    removed: bool,
}

impl ChargingStation {
    /// Create an empty station with no upgrades.
    pub fn new(region: RegionId, pos: BlockPos) -> Self {
        Self {
            id: StationId::new(),
            region,
            pos,
            energy: 0.0,
            capacity: DEFAULT_STATION_CAPACITY,
            dispense_rate: DEFAULT_DISPENSE_RATE,
            upgrades: BTreeMap::new(),
            removed: false,
        }
    }

    /// Set the initial energy level (clamped to `0..=capacity`).
    #[must_use]
    pub fn with_energy(mut self, energy: f64) -> Self {
        self.energy = energy.clamp(0.0, self.capacity);
        self
    }

    /// Set the buffer capacity. The current level is clamped to fit.
    #[must_use]
    pub fn with_capacity(mut self, capacity: f64) -> Self {
        self.capacity = capacity.max(0.0);
        self.energy = self.energy.min(self.capacity);
        self
    }

    /// Set the per-dispenser transfer rate.
    #[must_use]
    pub const fn with_dispense_rate(mut self, rate: f64) -> Self {
        self.dispense_rate = rate;
        self
    }

    /// Install `count` upgrades of the given kind.
    #[must_use]
    pub fn with_upgrade(mut self, kind: UpgradeKind, count: u32) -> Self {
        self.install_upgrade(kind, count);
        self
    }

    /// The station's identifier.
    pub const fn id(&self) -> StationId {
        self.id
    }

    /// The region the station was placed in.
    pub const fn region(&self) -> RegionId {
        self.region
    }

    /// The block the station occupies.
    pub const fn pos(&self) -> BlockPos {
        self.pos
    }

    /// Current stored energy.
    pub const fn energy(&self) -> f64 {
        self.energy
    }

    /// Maximum stored energy.
    pub const fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Whether the station has been broken or otherwise taken out of the world.
    pub const fn is_removed(&self) -> bool {
        self.removed
    }

    /// Number of upgrades of the given kind installed.
    pub fn upgrade_count(&self, kind: UpgradeKind) -> u32 {
        self.upgrades.get(&kind).copied().unwrap_or(0)
    }

    /// Whether the station can dispense energy into drones at all.
    pub fn has_dispenser(&self) -> bool {
        self.upgrade_count(UpgradeKind::Dispenser) > 0
    }

    /// Install `count` more upgrades of the given kind. Returns the new count.
    pub fn install_upgrade(&mut self, kind: UpgradeKind, count: u32) -> u32 {
        let slot = self.upgrades.entry(kind).or_insert(0);
        *slot = slot.saturating_add(count);
        *slot
    }

    /// Remove one upgrade of the given kind. Returns the remaining count.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UpgradeNotInstalled`] if none are installed.
    pub fn remove_upgrade(&mut self, kind: UpgradeKind) -> Result<u32, WorldError> {
        let current = self.upgrade_count(kind);
        let remaining = current
            .checked_sub(1)
            .ok_or(WorldError::UpgradeNotInstalled {
                station: self.id,
                kind,
            })?;
        if remaining == 0 {
            self.upgrades.remove(&kind);
        } else {
            self.upgrades.insert(kind, remaining);
        }
        Ok(remaining)
    }

    /// Mark the station as removed from the world.
    pub const fn mark_removed(&mut self) {
        self.removed = true;
    }

    /// Add energy from the station's own supply. Returns the amount accepted.
    pub fn supply(&mut self, amount: f64) -> f64 {
        let accepted = amount.max(0.0).min(self.capacity - self.energy).max(0.0);
        self.energy += accepted;
        accepted
    }

    /// Compute and withdraw the energy to push into a docked drone this tick.
    ///
    /// `drone_level` and `drone_capacity` describe the receiving tank. The
    /// transfer is bounded by the dispenser rate, by half the level
    /// difference (so both sides converge rather than overshoot), and by
    /// the drone's headroom. Returns zero when the station is removed, has
    /// no dispenser, or is not fuller than the drone.
    pub fn dispense_to(&mut self, drone_level: f64, drone_capacity: f64) -> f64 {
        if self.removed || !self.has_dispenser() || self.energy <= drone_level {
            return 0.0;
        }
        let rate = self.dispense_rate * f64::from(self.upgrade_count(UpgradeKind::Dispenser));
        let amount = rate
            .min((self.energy - drone_level) / 2.0)
            .min(drone_capacity - drone_level)
            .max(0.0);
        self.energy -= amount;
        amount
    }
}
