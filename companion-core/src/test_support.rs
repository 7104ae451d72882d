//! In-memory collaborators for unit tests.

use std::collections::HashSet;

use crate::types::{BlockPos, Cuboid, DimensionId, EntityCode, EntityId, EntitySnapshot, Vec3};
use crate::world::{
    AgentHandle, CollisionQuery, EntityFilter, EntityIndex, NavigationRequest, PathEvent,
    PathFollower,
};

pub fn entity(id: u64, code: &str, position: Vec3) -> EntitySnapshot {
    EntitySnapshot {
        id: EntityId(id),
        code: EntityCode::new(code),
        position,
        dimension: DimensionId(0),
        alive: true,
        should_despawn: false,
        footprint: 0.6,
    }
}

#[derive(Debug, Default)]
pub struct FakeWorld {
    pub entities: Vec<EntitySnapshot>,
    pub solid: HashSet<BlockPos>,
}

impl FakeWorld {
    pub fn with_entities(entities: Vec<EntitySnapshot>) -> Self {
        Self {
            entities,
            solid: HashSet::new(),
        }
    }

    pub fn entity_mut(&mut self, id: u64) -> &mut EntitySnapshot {
        self.entities
            .iter_mut()
            .find(|e| e.id == EntityId(id))
            .expect("entity in fake world")
    }

    /// Fill every cell in the inclusive box with solid blocks.
    pub fn fill(&mut self, min: BlockPos, max: BlockPos) {
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                for z in min.z..=max.z {
                    self.solid.insert(BlockPos::new(x, y, z));
                }
            }
        }
    }
}

impl EntityIndex for FakeWorld {
    fn resolve(&self, id: EntityId) -> Option<EntitySnapshot> {
        self.entities.iter().find(|e| e.id == id).cloned()
    }

    fn nearest_entity(
        &self,
        origin: Vec3,
        radius: f64,
        dimension: DimensionId,
        filter: &dyn EntityFilter,
    ) -> Option<EntitySnapshot> {
        self.entities
            .iter()
            .filter(|e| e.dimension == dimension)
            .filter(|e| e.position.distance_squared(origin) <= radius * radius)
            .filter(|e| filter.matches(e))
            .min_by(|a, b| {
                a.position
                    .distance_squared(origin)
                    .total_cmp(&b.position.distance_squared(origin))
            })
            .cloned()
    }
}

impl CollisionQuery for FakeWorld {
    fn collision_boxes(&self, cell: BlockPos) -> Vec<Cuboid> {
        if self.solid.contains(&cell) {
            vec![Cuboid::unit(cell)]
        } else {
            Vec::new()
        }
    }
}

#[derive(Debug, Clone)]
pub struct FakeAgent {
    pub id: EntityId,
    pub position: Vec3,
    pub dimension: DimensionId,
    pub teleports: Vec<Vec3>,
}

impl FakeAgent {
    pub fn at(id: u64, position: Vec3) -> Self {
        Self {
            id: EntityId(id),
            position,
            dimension: DimensionId(0),
            teleports: Vec::new(),
        }
    }
}

impl AgentHandle for FakeAgent {
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
        self.teleports.push(position);
        self.position = position;
    }
}

/// Path follower that records requests and replays queued events.
#[derive(Debug, Default)]
pub struct ScriptedPath {
    pub requests: Vec<NavigationRequest>,
    pub events: Vec<PathEvent>,
    pub active: bool,
    pub target: Option<Vec3>,
    pub stops: usize,
}

impl PathFollower for ScriptedPath {
    fn navigate_to(&mut self, request: NavigationRequest) {
        self.requests.push(request);
        self.target = Some(request.destination);
        self.active = true;
    }

    fn poll(&mut self) -> PathEvent {
        if self.events.is_empty() {
            PathEvent::Active
        } else {
            self.events.remove(0)
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn current_target(&self) -> Option<Vec3> {
        self.target
    }

    fn set_current_target(&mut self, target: Vec3) {
        self.target = Some(target);
    }

    fn stop(&mut self) {
        self.stops += 1;
        self.active = false;
    }
}
