//! Core type definitions for the companion behavior.
//!
//! Positions are continuous `f64` world coordinates with `y` as the vertical
//! axis. Block positions are the integer voxel cells those coordinates fall in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Unique identifier for any entity in the world.
///
/// Identifiers are stable for the lifetime of an entity and totally ordered,
/// which lets two mutually-matching agents break symmetry by only following
/// entities with a lower id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type code of an entity, e.g. `"wolf-male"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityCode(pub String);

impl EntityCode {
    /// Create a type code from anything string-like.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// The code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Dimension (plane) an entity lives in. Entities in different dimensions
/// never see each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DimensionId(pub u32);

// ---------------------------------------------------------------------------
// Spatial
// ---------------------------------------------------------------------------

/// A continuous 3D position or offset in the game world.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate (vertical).
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

impl Vec3 {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Squared euclidean distance to `other`.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Squared distance to `other` on the horizontal (x/z) plane.
    #[must_use]
    pub fn horizontal_distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        dx * dx + dz * dz
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// Integer voxel cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockPos {
    /// X cell.
    pub x: i32,
    /// Y cell (vertical).
    pub y: i32,
    /// Z cell.
    pub z: i32,
}

impl BlockPos {
    /// Create a new block position.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The cell containing `pos`, flooring each component so that negative
    /// coordinates land in the correct cell.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn containing(pos: Vec3) -> Self {
        Self::new(pos.x.floor() as i32, pos.y.floor() as i32, pos.z.floor() as i32)
    }

    /// Minimum corner of the cell in world coordinates.
    #[must_use]
    pub fn min_corner(self) -> Vec3 {
        Vec3::new(f64::from(self.x), f64::from(self.y), f64::from(self.z))
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}

/// An axis-aligned collision volume in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cuboid {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Cuboid {
    /// The full unit cube occupying `cell`.
    #[must_use]
    pub fn unit(cell: BlockPos) -> Self {
        let min = cell.min_corner();
        Self {
            min,
            max: min + Vec3::new(1.0, 1.0, 1.0),
        }
    }

    /// Horizontal (x axis) extent.
    #[must_use]
    pub fn x_size(&self) -> f64 {
        self.max.x - self.min.x
    }
}

// ---------------------------------------------------------------------------
// Entity view
// ---------------------------------------------------------------------------

/// A read-only snapshot of an entity as the world reports it this tick.
///
/// The behavior never keeps one of these across ticks; it stores the
/// [`EntityId`] and re-resolves it, so a snapshot is never a stale handle.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot {
    /// Stable identifier.
    pub id: EntityId,
    /// Type code.
    pub code: EntityCode,
    /// Current position.
    pub position: Vec3,
    /// Dimension the entity lives in.
    pub dimension: DimensionId,
    /// Whether the entity is alive.
    pub alive: bool,
    /// Whether the entity has been flagged for removal.
    pub should_despawn: bool,
    /// Horizontal selection footprint (x size of the selection box).
    pub footprint: f64,
}

impl EntitySnapshot {
    /// Alive and not flagged for removal.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.alive && !self.should_despawn
    }
}
