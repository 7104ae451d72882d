//! Entity storage and nearest-entity queries.
//!
//! Ids are handed out monotonically, so a newer entity always has a higher
//! id than an older one. The store is a flat ordered map; the nearest query
//! is a linear scan, which is plenty for the few hundred entities a loaded
//! area holds.

use std::collections::BTreeMap;

use companion_core::{
    AgentHandle, CompanionError, DimensionId, EntityCode, EntityFilter, EntityId, EntityIndex,
    EntitySnapshot, Vec3,
};
use companion_core::error::Result;
use ordered_float::OrderedFloat;

/// Default horizontal selection footprint for spawned entities.
pub const DEFAULT_FOOTPRINT: f64 = 0.6;

/// Spawn parameters for a new entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    /// Type code.
    pub code: EntityCode,
    /// Initial position.
    pub position: Vec3,
    /// Dimension.
    pub dimension: DimensionId,
    /// Horizontal selection footprint.
    pub footprint: f64,
}

impl EntityRecord {
    /// An entity of type `code` at `position` in the default dimension.
    #[must_use]
    pub fn new(code: impl Into<String>, position: Vec3) -> Self {
        Self {
            code: EntityCode::new(code),
            position,
            dimension: DimensionId::default(),
            footprint: DEFAULT_FOOTPRINT,
        }
    }

    /// Place the entity in `dimension`.
    #[must_use]
    pub fn in_dimension(mut self, dimension: DimensionId) -> Self {
        self.dimension = dimension;
        self
    }

    /// Override the selection footprint.
    #[must_use]
    pub fn with_footprint(mut self, footprint: f64) -> Self {
        self.footprint = footprint;
        self
    }
}

/// All entities in a world.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    entities: BTreeMap<EntityId, EntitySnapshot>,
    next_id: u64,
}

impl EntityStore {
    /// An empty store. The first entity gets id 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity, returning its id.
    pub fn spawn(&mut self, record: EntityRecord) -> EntityId {
        self.next_id += 1;
        let id = EntityId(self.next_id);
        self.entities.insert(
            id,
            EntitySnapshot {
                id,
                code: record.code,
                position: record.position,
                dimension: record.dimension,
                alive: true,
                should_despawn: false,
                footprint: record.footprint,
            },
        );
        id
    }

    /// Current snapshot of `id`.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntitySnapshot> {
        self.entities.get(&id)
    }

    /// Number of stored entities, dead ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the store holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Move an entity.
    ///
    /// # Errors
    /// Returns `CompanionError::EntityNotFound` for unknown ids.
    pub fn set_position(&mut self, id: EntityId, position: Vec3) -> Result<()> {
        self.entry(id)?.position = position;
        Ok(())
    }

    /// Mark an entity dead. It stays resolvable until removed.
    ///
    /// # Errors
    /// Returns `CompanionError::EntityNotFound` for unknown ids.
    pub fn kill(&mut self, id: EntityId) -> Result<()> {
        self.entry(id)?.alive = false;
        Ok(())
    }

    /// Flag an entity for removal.
    ///
    /// # Errors
    /// Returns `CompanionError::EntityNotFound` for unknown ids.
    pub fn mark_despawn(&mut self, id: EntityId) -> Result<()> {
        self.entry(id)?.should_despawn = true;
        Ok(())
    }

    /// Remove an entity outright, returning its last snapshot.
    pub fn remove(&mut self, id: EntityId) -> Option<EntitySnapshot> {
        self.entities.remove(&id)
    }

    /// Drop every entity that is dead or flagged for removal.
    pub fn sweep(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(|_, e| e.is_present());
        before - self.entities.len()
    }

    fn entry(&mut self, id: EntityId) -> Result<&mut EntitySnapshot> {
        self.entities
            .get_mut(&id)
            .ok_or(CompanionError::EntityNotFound(id))
    }
}

impl EntityIndex for EntityStore {
    fn resolve(&self, id: EntityId) -> Option<EntitySnapshot> {
        self.entities.get(&id).cloned()
    }

    fn nearest_entity(
        &self,
        origin: Vec3,
        radius: f64,
        dimension: DimensionId,
        filter: &dyn EntityFilter,
    ) -> Option<EntitySnapshot> {
        let radius_squared = radius * radius;
        self.entities
            .values()
            .filter(|e| e.dimension == dimension)
            .filter_map(|e| {
                let distance_squared = e.position.distance_squared(origin);
                (distance_squared <= radius_squared && filter.matches(e))
                    .then_some((OrderedFloat(distance_squared), e))
            })
            .min_by_key(|(distance_squared, e)| (*distance_squared, e.id))
            .map(|(_, e)| e.clone())
    }
}

// ---------------------------------------------------------------------------
// Agent body
// ---------------------------------------------------------------------------

/// The mutable body of an agent for the duration of one tick.
///
/// Copied out of the store before the task runs and written back after, the
/// way a system fetches a component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentBody {
    /// Agent id.
    pub id: EntityId,
    /// Position, updated by movement and teleports.
    pub position: Vec3,
    /// Dimension.
    pub dimension: DimensionId,
    /// Set when a teleport happened this tick.
    pub teleported: bool,
}

impl From<&EntitySnapshot> for AgentBody {
    fn from(snapshot: &EntitySnapshot) -> Self {
        Self {
            id: snapshot.id,
            position: snapshot.position,
            dimension: snapshot.dimension,
            teleported: false,
        }
    }
}

impl AgentHandle for AgentBody {
    fn id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn dimension(&self) -> DimensionId {
        self.dimension
    }

    fn teleport_to(&mut self, position: Vec3) {
        self.position = position;
        self.teleported = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CodeIs(&'static str);

    impl EntityFilter for CodeIs {
        fn matches(&self, candidate: &EntitySnapshot) -> bool {
            candidate.code.as_str() == self.0
        }
    }

    #[test]
    fn ids_are_monotonic() {
        let mut store = EntityStore::new();
        let a = store.spawn(EntityRecord::new("wolf", Vec3::ZERO));
        let b = store.spawn(EntityRecord::new("wolf", Vec3::ZERO));
        assert_eq!(a, EntityId(1));
        assert!(b > a);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn nearest_respects_radius_dimension_and_filter() {
        let mut store = EntityStore::new();
        let near_sheep = store.spawn(EntityRecord::new("sheep", Vec3::new(1.0, 0.0, 0.0)));
        let _far_wolf = store.spawn(EntityRecord::new("wolf", Vec3::new(9.0, 0.0, 0.0)));
        let _other_plane = store.spawn(
            EntityRecord::new("wolf", Vec3::new(2.0, 0.0, 0.0)).in_dimension(DimensionId(1)),
        );
        let wolf = store.spawn(EntityRecord::new("wolf", Vec3::new(4.0, 0.0, 0.0)));

        let found = store.nearest_entity(Vec3::ZERO, 8.0, DimensionId(0), &CodeIs("wolf"));
        assert_eq!(found.map(|e| e.id), Some(wolf));

        let sheep = store.nearest_entity(Vec3::ZERO, 8.0, DimensionId(0), &CodeIs("sheep"));
        assert_eq!(sheep.map(|e| e.id), Some(near_sheep));

        assert!(store.nearest_entity(Vec3::ZERO, 3.0, DimensionId(0), &CodeIs("wolf")).is_none());
    }

    #[test]
    fn equidistant_candidates_prefer_lower_id() {
        let mut store = EntityStore::new();
        let first = store.spawn(EntityRecord::new("wolf", Vec3::new(2.0, 0.0, 0.0)));
        let _second = store.spawn(EntityRecord::new("wolf", Vec3::new(-2.0, 0.0, 0.0)));
        let found = store.nearest_entity(Vec3::ZERO, 8.0, DimensionId(0), &CodeIs("wolf"));
        assert_eq!(found.map(|e| e.id), Some(first));
    }

    #[test]
    fn lifecycle_flags_and_sweep() {
        let mut store = EntityStore::new();
        let a = store.spawn(EntityRecord::new("wolf", Vec3::ZERO));
        let b = store.spawn(EntityRecord::new("wolf", Vec3::ZERO));
        let c = store.spawn(EntityRecord::new("wolf", Vec3::ZERO));

        store.kill(a).expect("kill");
        store.mark_despawn(b).expect("despawn");
        assert!(!store.get(a).expect("a").is_present());
        assert!(!store.get(b).expect("b").is_present());

        assert_eq!(store.sweep(), 2);
        assert!(store.resolve(a).is_none());
        assert!(store.resolve(c).is_some());
    }

    #[test]
    fn unknown_id_is_reported() {
        let mut store = EntityStore::new();
        let err = store.set_position(EntityId(99), Vec3::ZERO).expect_err("unknown");
        assert!(matches!(err, CompanionError::EntityNotFound(EntityId(99))));
    }

    #[test]
    fn body_teleport_marks_flag() {
        let mut store = EntityStore::new();
        let id = store.spawn(EntityRecord::new("wolf", Vec3::ZERO));
        let mut body = AgentBody::from(store.get(id).expect("spawned"));
        body.teleport_to(Vec3::new(3.0, 1.0, 3.0));
        assert!(body.teleported);
        assert_eq!(body.position(), Vec3::new(3.0, 1.0, 3.0));
    }
}
