//! Collaborator interfaces the behavior drives but does not implement.
//!
//! The spatial index, collision geometry and path follower are provided by
//! the host game. Query services are shared read-only between many agents,
//! so implementations must tolerate concurrent readers; the behavior only
//! ever calls them through `&self`.

use crate::types::{BlockPos, Cuboid, DimensionId, EntityId, EntitySnapshot, Vec3};

// ---------------------------------------------------------------------------
// Entity queries
// ---------------------------------------------------------------------------

/// Predicate deciding whether a candidate entity qualifies for a query.
pub trait EntityFilter {
    /// Whether `candidate` passes the filter.
    fn matches(&self, candidate: &EntitySnapshot) -> bool;
}

/// Spatial index over the world's entities.
pub trait EntityIndex {
    /// Re-resolve an entity by id. `None` once it has been removed.
    fn resolve(&self, id: EntityId) -> Option<EntitySnapshot>;

    /// The nearest entity within `radius` of `origin` in `dimension` that
    /// satisfies `filter`, or `None`.
    fn nearest_entity(
        &self,
        origin: Vec3,
        radius: f64,
        dimension: DimensionId,
        filter: &dyn EntityFilter,
    ) -> Option<EntitySnapshot>;
}

// ---------------------------------------------------------------------------
// Collision
// ---------------------------------------------------------------------------

/// Collision geometry lookup.
pub trait CollisionQuery {
    /// Collision volumes occupying `cell`. Empty means passable.
    fn collision_boxes(&self, cell: BlockPos) -> Vec<Cuboid>;

    /// Whether anything solid occupies `cell`.
    fn is_solid(&self, cell: BlockPos) -> bool {
        !self.collision_boxes(cell).is_empty()
    }
}

/// Everything the behavior reads from the world in one tick.
pub trait WorldView: EntityIndex + CollisionQuery {}

impl<T: EntityIndex + CollisionQuery + ?Sized> WorldView for T {}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// The entity executing the behavior.
pub trait AgentHandle {
    /// Stable identifier.
    fn id(&self) -> EntityId;
    /// Current position.
    fn position(&self) -> Vec3;
    /// Dimension the agent lives in.
    fn dimension(&self) -> DimensionId;
    /// Instantly overwrite the agent's position.
    fn teleport_to(&mut self, position: Vec3);
}

// ---------------------------------------------------------------------------
// Path following
// ---------------------------------------------------------------------------

/// Parameters of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigationRequest {
    /// Where to walk to.
    pub destination: Vec3,
    /// Desired walking speed.
    pub speed: f64,
    /// Distance from the destination that counts as arrived.
    pub tolerance: f64,
    /// Whether the route may include drops.
    pub allow_falling: bool,
    /// Step budget before the follower gives up.
    pub step_limit: u32,
    /// Whether the destination may be moved while walking via
    /// [`PathFollower::set_current_target`].
    pub allow_live_retarget: bool,
}

/// Latest outcome reported by the path follower.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathEvent {
    /// Walking, or idle with nothing to report.
    Active,
    /// Arrived within tolerance of the destination.
    GoalReached,
    /// Could not make progress.
    Stuck,
    /// No route to the destination exists.
    NoPath,
}

/// External locomotion service that moves the agent over several ticks.
///
/// Results are polled rather than delivered by callback; `poll` returns and
/// clears the most recent event, yielding [`PathEvent::Active`] when nothing
/// new has happened.
pub trait PathFollower {
    /// Begin walking toward `request.destination`, replacing any prior route.
    fn navigate_to(&mut self, request: NavigationRequest);
    /// Take the latest event.
    fn poll(&mut self) -> PathEvent;
    /// Whether a route is still being followed.
    fn is_active(&self) -> bool;
    /// The live destination, if navigating.
    fn current_target(&self) -> Option<Vec3>;
    /// Move the live destination without issuing a new request.
    fn set_current_target(&mut self, target: Vec3);
    /// Abandon the current route.
    fn stop(&mut self);
}
