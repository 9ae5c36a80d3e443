//! World-space geometry: continuous positions, block positions, and chunks.
//!
//! Drones move in continuous space ([`Vec3`]); stations occupy a single
//! block ([`BlockPos`]). Claims are keyed by block position, loadedness is
//! tracked per [`ChunkPos`] (16x16 block columns).

use serde::{Deserialize, Serialize};

/// Width of a chunk column in blocks.
pub const CHUNK_SIZE: i32 = 16;

/// A point in continuous world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    /// East-west axis.
    pub x: f64,
    /// Vertical axis.
    pub y: f64,
    /// North-south axis.
    pub z: f64,
}

impl Vec3 {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Create a new point.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Squared euclidean distance to another point.
    pub fn distance_sqr(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dz.mul_add(dz, dx.mul_add(dx, dy * dy))
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Self) -> f64 {
        self.distance_sqr(other).sqrt()
    }

    /// Return this point shifted by the given deltas.
    pub fn offset(self, dx: f64, dy: f64, dz: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Move up to `max_step` towards `target`.
    ///
    /// Returns the target itself once it is within reach.
    pub fn step_towards(self, target: Self, max_step: f64) -> Self {
        let remaining = self.distance(target);
        if remaining <= max_step || remaining <= f64::EPSILON {
            return target;
        }
        let ratio = max_step / remaining;
        Self::new(
            (target.x - self.x).mul_add(ratio, self.x),
            (target.y - self.y).mul_add(ratio, self.y),
            (target.z - self.z).mul_add(ratio, self.z),
        )
    }
}

impl core::fmt::Display for Vec3 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// Integer coordinates of a single block.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct BlockPos {
    /// East-west axis.
    pub x: i32,
    /// Vertical axis.
    pub y: i32,
    /// North-south axis.
    pub z: i32,
}

impl BlockPos {
    /// Create a new block position.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The block containing a continuous point.
    #[allow(clippy::cast_possible_truncation)] // floor() output is clamped into i32 range first.
    pub fn containing(point: Vec3) -> Self {
        let axis = |v: f64| v.floor().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32;
        Self::new(axis(point.x), axis(point.y), axis(point.z))
    }

    /// The block's lower corner offset by the given fractions.
    ///
    /// `offset(0.5, 1.0, 0.5)` is the point hovering just above the block's
    /// top face, horizontally centered.
    pub fn offset(self, dx: f64, dy: f64, dz: f64) -> Vec3 {
        Vec3::new(
            f64::from(self.x) + dx,
            f64::from(self.y) + dy,
            f64::from(self.z) + dz,
        )
    }

    /// The geometric center of the block.
    pub fn center(self) -> Vec3 {
        self.offset(0.5, 0.5, 0.5)
    }

    /// The block directly above this one.
    pub const fn above(self) -> Self {
        Self::new(self.x, self.y.saturating_add(1), self.z)
    }

    /// Squared distance between block corners.
    pub fn distance_sqr(self, other: Self) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        let dz = f64::from(self.z) - f64::from(other.z);
        dz.mul_add(dz, dx.mul_add(dx, dy * dy))
    }

    /// The chunk column this block belongs to.
    pub const fn chunk(self) -> ChunkPos {
        ChunkPos::new(
            self.x.div_euclid(CHUNK_SIZE),
            self.z.div_euclid(CHUNK_SIZE),
        )
    }
}

impl core::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}

/// A 16x16 column of blocks, the unit of world loading.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct ChunkPos {
    /// Chunk column index on the x axis.
    pub x: i32,
    /// Chunk column index on the z axis.
    pub z: i32,
}

impl ChunkPos {
    /// Create a new chunk position.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}
