//! Tunables for the charging behavior.
//!
//! These map onto the `charging` section of `recharge-config.yaml`. The
//! [`ChargingConfig`] struct bundles every threshold the charging goal
//! compares against so that callers (tick cycle, tests) can override
//! defaults.

use serde::Deserialize;

/// Thresholds and limits for finding and using charging stations.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChargingConfig {
    /// Full energy level of a drone (default: 10.0).
    #[serde(default = "default_max_energy")]
    pub max_energy: f64,

    /// Drones below this level look for a station; stations at or below it
    /// are not worth visiting (default: 1.0).
    #[serde(default = "default_low_energy_threshold")]
    pub low_energy_threshold: f64,

    /// A docked drone stops charging once within this margin of
    /// `max_energy` (default: 0.1).
    #[serde(default = "default_full_margin")]
    pub full_margin: f64,

    /// A docked drone keeps charging only while the station leads it by more
    /// than this much energy (default: 0.1).
    #[serde(default = "default_energy_edge")]
    pub energy_edge: f64,

    /// Maximum distance, in blocks, to a candidate station (default: 80).
    #[serde(default = "default_search_range")]
    pub search_range: u32,

    /// Docked ticks without progress before nudging the drone (default: 20).
    #[serde(default = "default_dock_retry_ticks")]
    pub dock_retry_ticks: u32,
}

impl Default for ChargingConfig {
    fn default() -> Self {
        Self {
            max_energy: default_max_energy(),
            low_energy_threshold: default_low_energy_threshold(),
            full_margin: default_full_margin(),
            energy_edge: default_energy_edge(),
            search_range: default_search_range(),
            dock_retry_ticks: default_dock_retry_ticks(),
        }
    }
}

impl ChargingConfig {
    /// Squared search range, for comparing against squared distances.
    pub fn search_range_sqr(&self) -> f64 {
        let range = f64::from(self.search_range);
        range * range
    }

    /// Level at which a docked drone counts as full.
    pub fn full_level(&self) -> f64 {
        self.max_energy - self.full_margin
    }
}

const fn default_max_energy() -> f64 {
    10.0
}

const fn default_low_energy_threshold() -> f64 {
    1.0
}

const fn default_full_margin() -> f64 {
    0.1
}

const fn default_energy_edge() -> f64 {
    0.1
}

const fn default_search_range() -> u32 {
    80
}

const fn default_dock_retry_ticks() -> u32 {
    20
}
