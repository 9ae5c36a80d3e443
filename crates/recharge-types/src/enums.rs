//! Enumeration types for the Recharge simulation.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Station upgrades
// ---------------------------------------------------------------------------

/// An upgrade module that can be installed in a charging station.
///
/// Only [`UpgradeKind::Dispenser`] matters to drones looking for a charge:
/// a station without one cannot push energy into a docked drone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeKind {
    /// Allows the station to transfer energy into docked drones.
    Dispenser,
    /// Increases transfer rate (not used by the docking logic).
    Speed,
    /// Increases the station's internal buffer.
    Volume,
    /// Restricts use of the station to trusted owners.
    Security,
}

// ---------------------------------------------------------------------------
// Debug reasons
// ---------------------------------------------------------------------------

/// Why a drone passed over a charging station (or lost it).
///
/// Recorded into the drone's debug sink. Advisory only; nothing branches on
/// these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebugReason {
    /// Another drone (or this one, on an earlier tick) holds a live claim.
    Claimed,
    /// The station's energy is at or below the low-energy threshold.
    NotEnoughEnergy,
    /// The station has no dispenser upgrade installed.
    NoDispenserUpgrades,
    /// The station sits in an area protected against the drone's owner.
    Protected,
    /// The navigator rejected a path to the station.
    CantNavigate,
    /// The drone's claim expired and another drone took the station.
    ClaimLost,
}

impl DebugReason {
    /// Stable dotted key for this reason, suitable for translation tables.
    pub const fn debug_key(self) -> &'static str {
        match self {
            Self::Claimed => "recharge.charging_station.debug.claimed",
            Self::NotEnoughEnergy => "recharge.charging_station.debug.not_enough_energy",
            Self::NoDispenserUpgrades => "recharge.charging_station.debug.no_dispenser_upgrades",
            Self::Protected => "recharge.charging_station.debug.protected",
            Self::CantNavigate => "recharge.charging_station.debug.cant_navigate",
            Self::ClaimLost => "recharge.charging_station.debug.claim_lost",
        }
    }
}

impl core::fmt::Display for DebugReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.debug_key())
    }
}
