//! Sparse voxel terrain.
//!
//! Only solid cells are stored; every other cell is air. A solid cell
//! reports one full-cube collision volume.

use std::collections::HashSet;

use companion_core::{BlockPos, CollisionQuery, Cuboid};

/// Solid blocks of a world.
#[derive(Debug, Clone, Default)]
pub struct Terrain {
    solid: HashSet<BlockPos>,
}

impl Terrain {
    /// Empty terrain (all air).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A single solid layer at height `y`, spanning `-half_extent..=half_extent`
    /// on x and z.
    #[must_use]
    pub fn flat(y: i32, half_extent: i32) -> Self {
        let mut terrain = Self::new();
        terrain.fill_box(
            BlockPos::new(-half_extent, y, -half_extent),
            BlockPos::new(half_extent, y, half_extent),
        );
        terrain
    }

    /// Make `cell` solid.
    pub fn set_solid(&mut self, cell: BlockPos) {
        self.solid.insert(cell);
    }

    /// Make `cell` air.
    pub fn clear(&mut self, cell: BlockPos) {
        self.solid.remove(&cell);
    }

    /// Make every cell of the inclusive box solid.
    pub fn fill_box(&mut self, min: BlockPos, max: BlockPos) {
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                for z in min.z..=max.z {
                    self.solid.insert(BlockPos::new(x, y, z));
                }
            }
        }
    }

    /// Clear every cell of the inclusive box.
    pub fn clear_box(&mut self, min: BlockPos, max: BlockPos) {
        self.solid.retain(|cell| {
            !(min.x..=max.x).contains(&cell.x)
                || !(min.y..=max.y).contains(&cell.y)
                || !(min.z..=max.z).contains(&cell.z)
        });
    }

    /// Number of solid cells.
    #[must_use]
    pub fn solid_count(&self) -> usize {
        self.solid.len()
    }
}

impl CollisionQuery for Terrain {
    fn collision_boxes(&self, cell: BlockPos) -> Vec<Cuboid> {
        if self.solid.contains(&cell) {
            vec![Cuboid::unit(cell)]
        } else {
            Vec::new()
        }
    }

    fn is_solid(&self, cell: BlockPos) -> bool {
        self.solid.contains(&cell)
    }
}
