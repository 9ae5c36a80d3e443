//! Configuration loading and typed config structures for the Recharge
//! simulation.
//!
//! The canonical configuration lives in `recharge-config.yaml` at the
//! project root. Every section and field is optional; anything missing
//! falls back to the defaults below.

use std::path::Path;

use recharge_agents::ChargingConfig;
use recharge_world::DEFAULT_STALENESS_WINDOW;
use serde::Deserialize;

/// Environment variable that overrides `logging.level`.
pub const LOG_LEVEL_ENV: &str = "RECHARGE_LOG";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `recharge-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings (name, seed, timing, extent).
    #[serde(default)]
    pub world: WorldConfig,

    /// Charging thresholds.
    #[serde(default)]
    pub charging: ChargingConfig,

    /// Station claim settings.
    #[serde(default)]
    pub claims: ClaimsConfig,

    /// Drone fleet parameters.
    #[serde(default)]
    pub drones: DronesConfig,

    /// Charging station parameters.
    #[serde(default)]
    pub stations: StationsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Simulation boundary parameters.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `RECHARGE_LOG`, when set, overrides `logging.level`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config
            .logging
            .override_level(std::env::var(LOG_LEVEL_ENV).ok());
        Ok(config)
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Real-time milliseconds between ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Number of regions to create.
    #[serde(default = "default_regions")]
    pub regions: u32,

    /// Radius, in chunks, of the loaded area around each region's origin.
    #[serde(default = "default_loaded_radius_chunks")]
    pub loaded_radius_chunks: i32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            tick_interval_ms: default_tick_interval_ms(),
            regions: default_regions(),
            loaded_radius_chunks: default_loaded_radius_chunks(),
        }
    }
}

/// Claim registry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ClaimsConfig {
    /// Ticks a claim survives without being refreshed.
    #[serde(default = "default_staleness_window_ticks")]
    pub staleness_window_ticks: u64,
}

impl Default for ClaimsConfig {
    fn default() -> Self {
        Self {
            staleness_window_ticks: default_staleness_window_ticks(),
        }
    }
}

/// Drone fleet configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DronesConfig {
    /// Drones spawned per region.
    #[serde(default = "default_drone_count")]
    pub count: u32,

    /// Blocks flown per tick.
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Longest path the navigator accepts.
    #[serde(default = "default_max_path_distance")]
    pub max_path_distance: f64,

    /// Whether drones teleport to targets beyond `max_path_distance`.
    #[serde(default)]
    pub can_teleport: bool,

    /// Energy spent per block flown.
    #[serde(default = "default_flight_drain_per_block")]
    pub flight_drain_per_block: f64,

    /// Energy spent per tick regardless of movement.
    #[serde(default = "default_idle_drain_per_tick")]
    pub idle_drain_per_tick: f64,

    /// Lowest starting energy level.
    #[serde(default = "default_initial_energy_min")]
    pub initial_energy_min: f64,

    /// Number of waypoints in each drone's patrol loop.
    #[serde(default = "default_patrol_waypoints")]
    pub patrol_waypoints: u32,

    /// Radius, in blocks, patrol waypoints are drawn from.
    #[serde(default = "default_patrol_radius")]
    pub patrol_radius: f64,
}

impl Default for DronesConfig {
    fn default() -> Self {
        Self {
            count: default_drone_count(),
            speed: default_speed(),
            max_path_distance: default_max_path_distance(),
            can_teleport: false,
            flight_drain_per_block: default_flight_drain_per_block(),
            idle_drain_per_tick: default_idle_drain_per_tick(),
            initial_energy_min: default_initial_energy_min(),
            patrol_waypoints: default_patrol_waypoints(),
            patrol_radius: default_patrol_radius(),
        }
    }
}

/// Charging station configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StationsConfig {
    /// Stations spawned per region.
    #[serde(default = "default_station_count")]
    pub count: u32,

    /// Energy buffer size.
    #[serde(default = "default_station_capacity")]
    pub capacity: f64,

    /// Energy each station starts with.
    #[serde(default = "default_station_initial_energy")]
    pub initial_energy: f64,

    /// Energy each station gains per tick.
    #[serde(default = "default_supply_per_tick")]
    pub supply_per_tick: f64,

    /// Energy moved per dispenser per tick.
    #[serde(default = "default_dispense_rate")]
    pub dispense_rate: f64,

    /// Dispenser upgrades installed on each station.
    #[serde(default = "default_dispensers")]
    pub dispensers: u32,
}

impl Default for StationsConfig {
    fn default() -> Self {
        Self {
            count: default_station_count(),
            capacity: default_station_capacity(),
            initial_energy: default_station_initial_energy(),
            supply_per_tick: default_supply_per_tick(),
            dispense_rate: default_dispense_rate(),
            dispensers: default_dispensers(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive (`info`, `recharge_agents=debug`, ...).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl LoggingConfig {
    /// Replace the level with `value` when it is present and non-empty.
    pub fn override_level(&mut self, value: Option<String>) {
        if let Some(level) = value.filter(|v| !v.trim().is_empty()) {
            self.level = level;
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Simulation boundary configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Stop after this many ticks (0 = unlimited).
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Stop after this many wall-clock seconds (0 = unlimited).
    #[serde(default)]
    pub max_real_time_seconds: u64,
}

impl Default for SimulationBoundsConfig {
    fn default() -> Self {
        Self {
            max_ticks: default_max_ticks(),
            max_real_time_seconds: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Recharge".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_tick_interval_ms() -> u64 {
    250
}

const fn default_regions() -> u32 {
    1
}

const fn default_loaded_radius_chunks() -> i32 {
    4
}

const fn default_staleness_window_ticks() -> u64 {
    DEFAULT_STALENESS_WINDOW
}

const fn default_drone_count() -> u32 {
    6
}

const fn default_speed() -> f64 {
    1.0
}

const fn default_max_path_distance() -> f64 {
    64.0
}

const fn default_flight_drain_per_block() -> f64 {
    0.02
}

const fn default_idle_drain_per_tick() -> f64 {
    0.005
}

const fn default_initial_energy_min() -> f64 {
    0.5
}

const fn default_patrol_waypoints() -> u32 {
    4
}

const fn default_patrol_radius() -> f64 {
    24.0
}

const fn default_station_count() -> u32 {
    2
}

const fn default_station_capacity() -> f64 {
    20.0
}

const fn default_station_initial_energy() -> f64 {
    20.0
}

const fn default_supply_per_tick() -> f64 {
    0.1
}

const fn default_dispense_rate() -> f64 {
    0.25
}

const fn default_dispensers() -> u32 {
    1
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_max_ticks() -> u64 {
    2_000
}
