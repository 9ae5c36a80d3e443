//! Shared type definitions for the Recharge drone simulation.
//!
//! Every crate in the workspace speaks in these types: identifiers for
//! drones, stations, regions and owners; world geometry; and the small
//! enumerations shared between the world and the drone behaviors.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`geometry`] -- [`Vec3`], [`BlockPos`], and [`ChunkPos`]
//! - [`enums`] -- Upgrade kinds and debug reasons

pub mod enums;
pub mod geometry;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use enums::{DebugReason, UpgradeKind};
pub use geometry::{BlockPos, CHUNK_SIZE, ChunkPos, Vec3};
pub use ids::{AgentId, OwnerId, RegionId, StationId};
