//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Drones, stations, regions, and owners each carry a strongly-typed ID so
//! that a station identifier can never be handed to an API expecting a
//! drone. All IDs use UUID v7 (time-ordered), which keeps `BTreeMap`
//! iteration roughly in creation order.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a drone (the agent a behavior controls).
    AgentId
}

define_id! {
    /// Unique identifier for a charging station.
    StationId
}

define_id! {
    /// Unique identifier for a region (an independently loaded world slice).
    ///
    /// Claim registries are scoped per region.
    RegionId
}

define_id! {
    /// Identity a drone acts under for protection checks (its owner).
    OwnerId
}
