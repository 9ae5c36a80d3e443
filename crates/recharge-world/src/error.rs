//! Error types for the `recharge-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type alias.

use recharge_types::{RegionId, StationId, UpgradeKind};

/// Errors that can occur during world operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A station was not found in the world.
    #[error("station not found: {0}")]
    StationNotFound(StationId),

    /// A station with this identifier already exists.
    #[error("duplicate station id: {0}")]
    DuplicateStation(StationId),

    /// A region was not found in the world.
    #[error("region not found: {0}")]
    RegionNotFound(RegionId),

    /// Attempted to remove an upgrade the station does not have.
    #[error("station {station} has no {kind:?} upgrade installed")]
    UpgradeNotInstalled {
        /// The station.
        station: StationId,
        /// The missing upgrade kind.
        kind: UpgradeKind,
    },
}
