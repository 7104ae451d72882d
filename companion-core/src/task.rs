//! The scheduler-facing task lifecycle and the stay-close task itself.
//!
//! A scheduler drives an [`AiTask`] once per tick:
//!
//! 1. `should_execute` while the task is not running,
//! 2. `start_execute` once it returns `true`,
//! 3. `continue_execute` every tick until it returns `false`,
//! 4. `finish_execute`, also used for cancellation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::acquisition::{self, TargetSlot};
use crate::config::StayCloseConfig;
use crate::controller::{ExecutionState, ProximityController, Recovery, StopReason};
use crate::stats::TaskStats;
use crate::teleport;
use crate::types::{EntityId, Vec3};
use crate::world::{AgentHandle, PathEvent, PathFollower, WorldView};

/// Everything a task touches during one tick.
pub struct TaskContext<'a> {
    /// The agent executing the task.
    pub agent: &'a mut dyn AgentHandle,
    /// Read-only world queries.
    pub world: &'a dyn WorldView,
    /// The agent's path follower.
    pub path: &'a mut dyn PathFollower,
}

impl<'a> TaskContext<'a> {
    /// Bundle the collaborators for one tick.
    pub fn new(
        agent: &'a mut dyn AgentHandle,
        world: &'a dyn WorldView,
        path: &'a mut dyn PathFollower,
    ) -> Self {
        Self { agent, world, path }
    }
}

/// Lifecycle of a behavior polled by an agent's task scheduler.
pub trait AiTask {
    /// Whether the task wants to start now.
    fn should_execute(&mut self, ctx: &mut TaskContext<'_>) -> bool;
    /// Begin executing.
    fn start_execute(&mut self, ctx: &mut TaskContext<'_>);
    /// Advance one tick. `false` ends execution.
    fn continue_execute(&mut self, ctx: &mut TaskContext<'_>) -> bool;
    /// Execution ended, normally or by cancellation.
    fn finish_execute(&mut self, ctx: &mut TaskContext<'_>, cancelled: bool);
}

/// Keeps the agent near a companion entity.
#[derive(Debug)]
pub struct StayCloseTask<R = StdRng> {
    config: StayCloseConfig,
    target: TargetSlot,
    controller: ProximityController,
    rng: R,
    stats: TaskStats,
}

impl StayCloseTask<StdRng> {
    /// Create a task with an entropy-seeded RNG.
    #[must_use]
    pub fn new(config: StayCloseConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a task with a deterministic RNG.
    #[must_use]
    pub fn seeded(config: StayCloseConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> StayCloseTask<R> {
    /// Create a task drawing all randomness from `rng`.
    pub fn with_rng(config: StayCloseConfig, rng: R) -> Self {
        Self {
            config,
            target: TargetSlot::empty(),
            controller: ProximityController::new(),
            rng,
            stats: TaskStats::default(),
        }
    }

    /// The task's configuration.
    pub fn config(&self) -> &StayCloseConfig {
        &self.config
    }

    /// Current execution state.
    pub fn state(&self) -> ExecutionState {
        self.controller.state()
    }

    /// Id of the companion currently referenced, if any.
    pub fn target(&self) -> Option<EntityId> {
        self.target.id()
    }

    /// Counters since creation.
    pub fn stats(&self) -> TaskStats {
        self.stats
    }

    /// Live aim point for the current episode given the target position.
    pub fn aim_point(&self, target_position: Vec3) -> Vec3 {
        self.controller.aim_point(target_position)
    }

    fn attempt_teleport(&mut self, ctx: &mut TaskContext<'_>, anchor: Vec3) {
        if !self.config.allow_teleport {
            return;
        }
        self.stats.teleport_attempts += 1;
        if teleport::try_teleport(&self.config, &mut *ctx.agent, ctx.world, anchor, &mut self.rng) {
            self.stats.teleports += 1;
        }
    }
}

impl<R: Rng> AiTask for StayCloseTask<R> {
    fn should_execute(&mut self, ctx: &mut TaskContext<'_>) -> bool {
        if !acquisition::roll_gate(&mut self.rng) {
            return false;
        }
        self.stats.gate_passes += 1;

        let previous = self.target.id();
        let Some(target) = self
            .target
            .acquire_or_validate(&self.config, &*ctx.agent, ctx.world)
        else {
            return false;
        };
        if previous != Some(target.id) {
            self.stats.acquisitions += 1;
        }

        let eligible = acquisition::should_pursue(&self.config, ctx.agent.position(), target.position);
        trace!(agent = %ctx.agent.id(), target = %target.id, eligible, "Proximity check");
        eligible
    }

    fn start_execute(&mut self, ctx: &mut TaskContext<'_>) {
        let Some(target) = self.target.validate(ctx.world) else {
            debug!(agent = %ctx.agent.id(), "Companion vanished before pursuit began");
            return;
        };
        self.controller
            .begin(&target, &self.config, &mut *ctx.path, &mut self.rng);
        self.stats.pursuits_started += 1;
    }

    fn continue_execute(&mut self, ctx: &mut TaskContext<'_>) -> bool {
        if self.controller.state() == ExecutionState::Idle {
            return false;
        }

        let Some(target) = self.target.validate(ctx.world) else {
            self.controller.halt(StopReason::TargetLost, &mut *ctx.path);
            return false;
        };

        let event = ctx.path.poll();
        match event {
            PathEvent::Stuck => self.stats.stuck_events += 1,
            PathEvent::NoPath => self.stats.no_path_events += 1,
            PathEvent::Active | PathEvent::GoalReached => {}
        }
        if self.controller.on_path_event(event) == Recovery::Teleport {
            self.attempt_teleport(ctx, target.position);
        }

        let step = self.controller.update(
            ctx.agent.position(),
            target.position,
            &self.config,
            &mut *ctx.path,
            &mut self.rng,
        );
        if step.teleport {
            self.attempt_teleport(ctx, target.position);
        }

        match step.stop {
            Some(reason) => {
                if reason == StopReason::CloseEnough {
                    self.stats.close_enough_stops += 1;
                }
                self.controller.halt(reason, &mut *ctx.path);
                false
            }
            None => true,
        }
    }

    fn finish_execute(&mut self, ctx: &mut TaskContext<'_>, cancelled: bool) {
        let reason = if cancelled {
            StopReason::Cancelled
        } else {
            StopReason::PathInactive
        };
        self.controller.halt(reason, &mut *ctx.path);
    }
}
