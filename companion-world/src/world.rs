//! The combined world and its shared handle.
//!
//! [`World`] is what a single simulation thread owns and mutates.
//! [`SharedWorld`] wraps it in a `parking_lot::RwLock` so many agents'
//! queries can read it concurrently while the owner holds the write side
//! only between ticks.

use std::sync::Arc;

use companion_core::{
    BlockPos, CollisionQuery, Cuboid, DimensionId, EntityFilter, EntityId, EntityIndex,
    EntitySnapshot, Vec3,
};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::entities::EntityStore;
use crate::terrain::Terrain;

/// Entities, terrain and the tick counter.
#[derive(Debug, Clone, Default)]
pub struct World {
    /// All entities.
    pub entities: EntityStore,
    /// Collision terrain.
    pub terrain: Terrain,
    /// Ticks simulated so far.
    pub tick: u64,
}

impl World {
    /// A world with no entities over `terrain`.
    #[must_use]
    pub fn with_terrain(terrain: Terrain) -> Self {
        Self {
            entities: EntityStore::new(),
            terrain,
            tick: 0,
        }
    }
}

impl EntityIndex for World {
    fn resolve(&self, id: EntityId) -> Option<EntitySnapshot> {
        self.entities.resolve(id)
    }

    fn nearest_entity(
        &self,
        origin: Vec3,
        radius: f64,
        dimension: DimensionId,
        filter: &dyn EntityFilter,
    ) -> Option<EntitySnapshot> {
        self.entities.nearest_entity(origin, radius, dimension, filter)
    }
}

impl CollisionQuery for World {
    fn collision_boxes(&self, cell: BlockPos) -> Vec<Cuboid> {
        self.terrain.collision_boxes(cell)
    }

    fn is_solid(&self, cell: BlockPos) -> bool {
        self.terrain.is_solid(cell)
    }
}

/// A [`World`] shared between threads.
#[derive(Debug, Clone, Default)]
pub struct SharedWorld(Arc<RwLock<World>>);

impl SharedWorld {
    /// Share `world`.
    #[must_use]
    pub fn new(world: World) -> Self {
        Self(Arc::new(RwLock::new(world)))
    }

    /// Acquire a read guard.
    pub fn read(&self) -> RwLockReadGuard<'_, World> {
        self.0.read()
    }

    /// Acquire the write guard.
    pub fn write(&self) -> RwLockWriteGuard<'_, World> {
        self.0.write()
    }
}

impl EntityIndex for SharedWorld {
    fn resolve(&self, id: EntityId) -> Option<EntitySnapshot> {
        self.read().resolve(id)
    }

    fn nearest_entity(
        &self,
        origin: Vec3,
        radius: f64,
        dimension: DimensionId,
        filter: &dyn EntityFilter,
    ) -> Option<EntitySnapshot> {
        self.read().nearest_entity(origin, radius, dimension, filter)
    }
}

impl CollisionQuery for SharedWorld {
    fn collision_boxes(&self, cell: BlockPos) -> Vec<Cuboid> {
        self.read().collision_boxes(cell)
    }
}
