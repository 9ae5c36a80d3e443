//! Regions, charging stations, and position claims for the Recharge simulation.
//!
//! This crate models the shared side of the world that many drones contend
//! over: the stations themselves, which parts of each region are loaded,
//! which areas are protected, and who currently intends to use which
//! station.
//!
//! # Modules
//!
//! - [`claims`] -- [`ClaimRegistry`] (per-region, self-expiring position
//!   claims) and the [`ClaimDirectory`] that scopes them per region.
//! - [`error`] -- Error types for world operations.
//! - [`station`] -- [`ChargingStation`]: energy buffer, upgrades, dispensing.
//! - [`view`] -- The [`WorldView`] trait behaviors query through.
//! - [`world`] -- [`World`], the in-memory [`WorldView`] implementation.

pub mod claims;
pub mod error;
pub mod station;
pub mod view;
pub mod world;

// Re-export primary types at crate root.
pub use claims::{Claim, ClaimDirectory, ClaimOutcome, ClaimRegistry, DEFAULT_STALENESS_WINDOW};
pub use error::WorldError;
pub use station::{ChargingStation, DEFAULT_DISPENSE_RATE, DEFAULT_STATION_CAPACITY};
pub use view::WorldView;
pub use world::{ProtectedArea, World};
