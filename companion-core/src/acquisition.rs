//! Target acquisition: finding and re-validating the companion.
//!
//! The companion is held as a [`TargetSlot`]: an entity id, never a handle.
//! Each evaluation re-resolves the id through the [`EntityIndex`] and drops
//! it if the entity died, was flagged for despawn or disappeared.
//!
//! Spatial queries are the expensive part of this behavior, so the whole
//! "should I act now" check is gated behind a 1% roll taken before anything
//! else is looked at.

use rand::Rng;
use tracing::{debug, trace, warn};

use crate::config::StayCloseConfig;
use crate::types::{DimensionId, EntityCode, EntityId, EntitySnapshot, Vec3};
use crate::world::{AgentHandle, EntityFilter, EntityIndex};

/// Chance per tick that the acquisition check runs at all.
pub const ACQUISITION_CHANCE: f64 = 0.01;

/// Take the per-tick acquisition roll. `true` means the check may run.
pub fn roll_gate<R: Rng + ?Sized>(rng: &mut R) -> bool {
    let roll: f64 = rng.r#gen();
    roll <= ACQUISITION_CHANCE
}

/// Whether the agent has drifted far enough from the target to start
/// pursuing: squared horizontal distance strictly above `maxDistance²`.
#[must_use]
pub fn should_pursue(config: &StayCloseConfig, agent: Vec3, target: Vec3) -> bool {
    agent.horizontal_distance_squared(target) > config.max_distance_squared()
}

// ---------------------------------------------------------------------------
// Candidate filter
// ---------------------------------------------------------------------------

/// Qualifies companion candidates: matching type code, same dimension,
/// present in the world, not the agent itself and, when `onlyIfLowerId` is
/// set, with an id strictly below the agent's.
#[derive(Debug, Clone, Copy)]
pub struct CompanionFilter<'a> {
    code: Option<&'a EntityCode>,
    dimension: DimensionId,
    agent: EntityId,
    below: Option<EntityId>,
}

impl<'a> CompanionFilter<'a> {
    /// Build the filter for `agent` from its task configuration.
    #[must_use]
    pub fn new(config: &'a StayCloseConfig, agent: EntityId, dimension: DimensionId) -> Self {
        Self {
            code: config.entity_code.as_ref(),
            dimension,
            agent,
            below: config.only_if_lower_id.then_some(agent),
        }
    }
}

impl EntityFilter for CompanionFilter<'_> {
    fn matches(&self, candidate: &EntitySnapshot) -> bool {
        let Some(code) = self.code else {
            return false;
        };
        candidate.id != self.agent
            && candidate.code == *code
            && candidate.dimension == self.dimension
            && candidate.is_present()
            && self.below.is_none_or(|limit| candidate.id < limit)
    }
}

// ---------------------------------------------------------------------------
// Target slot
// ---------------------------------------------------------------------------

/// Weak reference to the companion entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetSlot(Option<EntityId>);

impl TargetSlot {
    /// An empty slot.
    #[must_use]
    pub const fn empty() -> Self {
        Self(None)
    }

    /// The stored id, if any.
    #[must_use]
    pub const fn id(&self) -> Option<EntityId> {
        self.0
    }

    /// Forget the current target.
    pub fn clear(&mut self) {
        self.0 = None;
    }

    /// Re-resolve the stored id without searching. Clears the slot and
    /// returns `None` if the target is gone, dead or despawning.
    pub fn validate<I: EntityIndex + ?Sized>(&mut self, index: &I) -> Option<EntitySnapshot> {
        let id = self.0?;
        match index.resolve(id) {
            Some(target) if target.is_present() => Some(target),
            Some(_) | None => {
                debug!(target = %id, "Companion lost");
                self.0 = None;
                None
            }
        }
    }

    /// Return the stored target if it is still valid, otherwise search for
    /// the nearest qualifying entity around the agent and store it.
    pub fn acquire_or_validate<A, I>(
        &mut self,
        config: &StayCloseConfig,
        agent: &A,
        index: &I,
    ) -> Option<EntitySnapshot>
    where
        A: AgentHandle + ?Sized,
        I: EntityIndex + ?Sized,
    {
        if let Some(target) = self.validate(index) {
            return Some(target);
        }

        if config.entity_code.is_none() {
            warn!(agent = %agent.id(), "No entityCode configured, nothing to stay close to");
            return None;
        }

        let filter = CompanionFilter::new(config, agent.id(), agent.dimension());
        let found = index.nearest_entity(
            agent.position(),
            config.search_range,
            agent.dimension(),
            &filter,
        );

        match &found {
            Some(target) => debug!(
                agent = %agent.id(),
                target = %target.id,
                code = %target.code,
                "Acquired companion"
            ),
            None => trace!(agent = %agent.id(), range = config.search_range, "No companion in range"),
        }

        self.0 = found.as_ref().map(|target| target.id);
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeAgent, FakeWorld, entity};
    use rand::rngs::mock::StepRng;

    fn config(lower_only: bool) -> StayCloseConfig {
        StayCloseConfig {
            only_if_lower_id: lower_only,
            ..StayCloseConfig::following("wolf")
        }
    }

    #[test]
    fn gate_passes_only_on_low_rolls() {
        assert!(roll_gate(&mut StepRng::new(0, 0)));
        assert!(!roll_gate(&mut StepRng::new(u64::MAX, 0)));
        // 0.5
        assert!(!roll_gate(&mut StepRng::new(1 << 63, 0)));
    }

    #[test]
    fn trigger_uses_strict_squared_threshold() {
        let config = StayCloseConfig::default();
        let target = Vec3::new(10.0, 0.0, 0.0);
        assert!(should_pursue(&config, Vec3::new(10.0, 0.0, 4.0), target));
        assert!(!should_pursue(&config, Vec3::new(10.0, 0.0, 2.0), target));
        assert!(!should_pursue(&config, Vec3::new(10.0, 0.0, 3.0), target));
    }

    #[test]
    fn acquires_nearest_matching_entity() {
        let world = FakeWorld::with_entities(vec![
            entity(1, "wolf", Vec3::new(5.0, 0.0, 0.0)),
            entity(2, "wolf", Vec3::new(2.0, 0.0, 0.0)),
            entity(3, "sheep", Vec3::new(1.0, 0.0, 0.0)),
        ]);
        let agent = FakeAgent::at(10, Vec3::ZERO);
        let mut slot = TargetSlot::empty();

        let target = slot.acquire_or_validate(&config(false), &agent, &world);
        assert_eq!(target.map(|t| t.id), Some(EntityId(2)));
        assert_eq!(slot.id(), Some(EntityId(2)));
    }

    #[test]
    fn lower_id_restriction_skips_nearest_higher_id() {
        let world = FakeWorld::with_entities(vec![
            entity(4, "wolf", Vec3::new(6.0, 0.0, 0.0)),
            entity(12, "wolf", Vec3::new(1.0, 0.0, 0.0)),
            entity(10, "wolf", Vec3::new(0.5, 0.0, 0.0)),
        ]);
        let agent = FakeAgent::at(10, Vec3::ZERO);
        let mut slot = TargetSlot::empty();

        let target = slot.acquire_or_validate(&config(true), &agent, &world);
        assert_eq!(target.map(|t| t.id), Some(EntityId(4)));
    }

    #[test]
    fn never_selects_self() {
        let world = FakeWorld::with_entities(vec![entity(10, "wolf", Vec3::ZERO)]);
        let agent = FakeAgent::at(10, Vec3::ZERO);
        let mut slot = TargetSlot::empty();
        assert!(slot.acquire_or_validate(&config(false), &agent, &world).is_none());
    }

    #[test]
    fn other_dimension_is_invisible() {
        let mut other = entity(1, "wolf", Vec3::new(1.0, 0.0, 0.0));
        other.dimension = DimensionId(2);
        let world = FakeWorld::with_entities(vec![other]);
        let agent = FakeAgent::at(10, Vec3::ZERO);
        let mut slot = TargetSlot::empty();
        assert!(slot.acquire_or_validate(&config(false), &agent, &world).is_none());
    }

    #[test]
    fn out_of_range_entity_is_ignored() {
        let world = FakeWorld::with_entities(vec![entity(1, "wolf", Vec3::new(8.5, 0.0, 0.0))]);
        let agent = FakeAgent::at(10, Vec3::ZERO);
        let mut slot = TargetSlot::empty();
        assert!(slot.acquire_or_validate(&config(false), &agent, &world).is_none());
        assert_eq!(slot.id(), None);
    }

    #[test]
    fn valid_target_is_kept_without_search() {
        let mut world = FakeWorld::with_entities(vec![
            entity(1, "wolf", Vec3::new(7.0, 0.0, 0.0)),
            entity(2, "wolf", Vec3::new(1.0, 0.0, 0.0)),
        ]);
        let agent = FakeAgent::at(10, Vec3::ZERO);
        let mut slot = TargetSlot(Some(EntityId(1)));

        let kept = slot.acquire_or_validate(&config(false), &agent, &world);
        assert_eq!(kept.map(|t| t.id), Some(EntityId(1)));

        // Far beyond search range, still kept.
        world.entity_mut(1).position = Vec3::new(100.0, 0.0, 0.0);
        let kept = slot.acquire_or_validate(&config(false), &agent, &world);
        assert_eq!(kept.map(|t| t.id), Some(EntityId(1)));
    }

    #[test]
    fn lower_id_restriction_does_not_evict_stored_target() {
        let world = FakeWorld::with_entities(vec![
            entity(12, "wolf", Vec3::new(2.0, 0.0, 0.0)),
            entity(4, "wolf", Vec3::new(1.0, 0.0, 0.0)),
        ]);
        let agent = FakeAgent::at(10, Vec3::ZERO);
        let mut slot = TargetSlot(Some(EntityId(12)));

        let kept = slot.acquire_or_validate(&config(true), &agent, &world);
        assert_eq!(kept.map(|t| t.id), Some(EntityId(12)));
        assert_eq!(slot.id(), Some(EntityId(12)));
    }

    #[test]
    fn dead_or_despawning_target_is_dropped_and_replaced() {
        let mut world = FakeWorld::with_entities(vec![
            entity(1, "wolf", Vec3::new(1.0, 0.0, 0.0)),
            entity(2, "wolf", Vec3::new(3.0, 0.0, 0.0)),
        ]);
        let agent = FakeAgent::at(10, Vec3::ZERO);
        let mut slot = TargetSlot(Some(EntityId(1)));

        world.entity_mut(1).alive = false;
        let replaced = slot.acquire_or_validate(&config(false), &agent, &world);
        assert_eq!(replaced.map(|t| t.id), Some(EntityId(2)));

        world.entity_mut(2).should_despawn = true;
        assert!(slot.acquire_or_validate(&config(false), &agent, &world).is_none());
        assert_eq!(slot.id(), None);
    }

    #[test]
    fn vanished_target_clears_slot_on_validate() {
        let world = FakeWorld::default();
        let mut slot = TargetSlot(Some(EntityId(7)));
        assert!(slot.validate(&world).is_none());
        assert_eq!(slot, TargetSlot::empty());
    }

    #[test]
    fn missing_entity_code_matches_nothing() {
        let world = FakeWorld::with_entities(vec![entity(1, "wolf", Vec3::new(1.0, 0.0, 0.0))]);
        let agent = FakeAgent::at(10, Vec3::ZERO);
        let mut slot = TargetSlot::empty();
        assert!(
            slot.acquire_or_validate(&StayCloseConfig::default(), &agent, &world)
                .is_none()
        );
    }
}
