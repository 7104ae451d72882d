//! Straight-line path follower.
//!
//! Walks the body toward the live destination on the horizontal plane by
//! at most `speed` per tick. There is no route planning: a solid cell in
//! the way stalls the walker, and after enough stalled ticks it reports
//! [`PathEvent::Stuck`]. A destination inside solid terrain is reported as
//! [`PathEvent::NoPath`] on the first advance.

use companion_core::world::NavigationRequest;
use companion_core::{BlockPos, CollisionQuery, PathEvent, PathFollower, Vec3};
use tracing::{debug, trace};

use crate::config::PathingConfig;
use crate::entities::AgentBody;

/// Path follower moving in a straight line toward its target.
#[derive(Debug, Clone)]
pub struct StraightLinePath {
    request: Option<NavigationRequest>,
    target: Option<Vec3>,
    active: bool,
    fresh: bool,
    steps_taken: u32,
    stalled_ticks: u32,
    stall_limit: u32,
    pending: Option<PathEvent>,
}

impl StraightLinePath {
    /// A follower with nothing to do.
    #[must_use]
    pub fn new(config: &PathingConfig) -> Self {
        Self {
            request: None,
            target: None,
            active: false,
            fresh: false,
            steps_taken: 0,
            stalled_ticks: 0,
            stall_limit: config.stall_ticks_before_stuck.max(1),
            pending: None,
        }
    }

    /// The request currently being followed.
    #[must_use]
    pub fn request(&self) -> Option<&NavigationRequest> {
        self.request.as_ref()
    }

    /// Steps taken since the last request.
    #[must_use]
    pub fn steps_taken(&self) -> u32 {
        self.steps_taken
    }

    fn finish(&mut self, event: PathEvent) {
        debug!(?event, steps = self.steps_taken, "Path finished");
        self.active = false;
        self.pending = Some(event);
    }

    /// Move `body` one tick along the route.
    pub fn advance<C: CollisionQuery + ?Sized>(&mut self, body: &mut AgentBody, collision: &C) {
        if !self.active {
            return;
        }
        let (Some(request), Some(target)) = (self.request, self.target) else {
            self.active = false;
            return;
        };

        if self.fresh {
            self.fresh = false;
            if collision.is_solid(BlockPos::containing(target)) {
                self.finish(PathEvent::NoPath);
                return;
            }
        }

        let dx = target.x - body.position.x;
        let dz = target.z - body.position.z;
        let distance = dx.hypot(dz);
        if distance <= request.tolerance {
            self.finish(PathEvent::GoalReached);
            return;
        }
        if self.steps_taken >= request.step_limit {
            self.finish(PathEvent::Stuck);
            return;
        }
        self.steps_taken += 1;

        let step = request.speed.min(distance);
        let next = Vec3::new(
            body.position.x + dx / distance * step,
            body.position.y,
            body.position.z + dz / distance * step,
        );

        let body_cell = BlockPos::containing(Vec3::new(next.x, next.y + 0.5, next.z));
        if collision.is_solid(body_cell) {
            self.stalled_ticks += 1;
            trace!(cell = %body_cell, stalled = self.stalled_ticks, "Path blocked");
            if self.stalled_ticks >= self.stall_limit {
                self.finish(PathEvent::Stuck);
            }
            return;
        }

        self.stalled_ticks = 0;
        body.position = next;
    }
}

impl PathFollower for StraightLinePath {
    fn navigate_to(&mut self, request: NavigationRequest) {
        self.request = Some(request);
        self.target = Some(request.destination);
        self.active = true;
        self.fresh = true;
        self.steps_taken = 0;
        self.stalled_ticks = 0;
        self.pending = None;
    }

    fn poll(&mut self) -> PathEvent {
        self.pending.take().unwrap_or(PathEvent::Active)
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn current_target(&self) -> Option<Vec3> {
        self.target
    }

    fn set_current_target(&mut self, target: Vec3) {
        let retarget = self.request.is_some_and(|r| r.allow_live_retarget);
        if self.active && retarget {
            self.target = Some(target);
        }
    }

    fn stop(&mut self) {
        self.active = false;
        self.pending = None;
    }
}
