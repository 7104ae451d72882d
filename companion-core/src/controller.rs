//! Proximity controller: the pursuit state machine.
//!
//! ```text
//!            begin                 PathEvent::Stuck
//!   Idle ───────────▶ Pursuing ─────────────────────▶ Stuck
//!    ▲                   │                              │
//!    └───────────────────┴──────────────────────────────┘
//!        close enough / path inactive / target lost / cancelled
//! ```
//!
//! The controller never calls back into the world itself. Path follower
//! results arrive as [`PathEvent`]s and come out as [`Recovery`] requests,
//! and each tick's distance checks come out as a [`ControlStep`], so every
//! transition is a function of the current state and the latest input.

use rand::Rng;
use tracing::debug;

use crate::config::StayCloseConfig;
use crate::types::{EntitySnapshot, Vec3};
use crate::world::{NavigationRequest, PathEvent, PathFollower};

/// Squared distance to the aim point under which pursuit stops (3 units).
pub const CLOSE_ENOUGH_SQUARED: f64 = 3.0 * 3.0;
/// Per-tick chance of a teleport attempt while too far away.
pub const TELEPORT_ROLL_CHANCE: f64 = 0.05;
/// Added to the target's footprint to form the arrival tolerance.
pub const TOLERANCE_MARGIN: f64 = 0.2;
/// Step budget handed to the path follower.
pub const STEP_LIMIT: u32 = 1000;

/// Whether the controller is issuing movement this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionState {
    /// Not pursuing.
    #[default]
    Idle,
    /// Walking toward the target.
    Pursuing,
    /// Pursuing, but the path follower reported it cannot make progress.
    Stuck,
}

/// Why a pursuit ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Within 3 units of the aim point.
    CloseEnough,
    /// The path follower reported stuck.
    Stuck,
    /// The path follower finished or gave up.
    PathInactive,
    /// The target died, despawned or vanished.
    TargetLost,
    /// The scheduler cancelled the task.
    Cancelled,
}

/// Recovery action requested in response to a path event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Nothing to do.
    None,
    /// Attempt teleport recovery.
    Teleport,
}

/// Outcome of one controller update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlStep {
    /// The random teleport roll fired this tick.
    pub teleport: bool,
    /// Pursuit should end, and why.
    pub stop: Option<StopReason>,
}

impl ControlStep {
    const fn stop(reason: StopReason) -> Self {
        Self {
            teleport: false,
            stop: Some(reason),
        }
    }
}

/// Pursuit state for one agent.
#[derive(Debug, Clone, Default)]
pub struct ProximityController {
    state: ExecutionState,
    offset: Vec3,
    stuck: bool,
}

impl ProximityController {
    /// A controller in [`ExecutionState::Idle`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current execution state.
    #[must_use]
    pub const fn state(&self) -> ExecutionState {
        self.state
    }

    /// This episode's aim offset.
    #[must_use]
    pub const fn offset(&self) -> Vec3 {
        self.offset
    }

    /// Whether the path follower has reported stuck this episode.
    #[must_use]
    pub const fn is_stuck(&self) -> bool {
        self.stuck
    }

    /// Live aim point for a target at `target_position`.
    #[must_use]
    pub fn aim_point(&self, target_position: Vec3) -> Vec3 {
        target_position + self.offset
    }

    /// Start a pursuit episode toward `target`.
    ///
    /// Issues the navigation request, draws a fresh horizontal offset in
    /// `[-1, 1]` on x and z, and clears the stuck flag.
    pub fn begin<P, R>(
        &mut self,
        target: &EntitySnapshot,
        config: &StayCloseConfig,
        path: &mut P,
        rng: &mut R,
    ) where
        P: PathFollower + ?Sized,
        R: Rng + ?Sized,
    {
        path.navigate_to(NavigationRequest {
            destination: target.position,
            speed: config.move_speed,
            tolerance: target.footprint + TOLERANCE_MARGIN,
            allow_falling: false,
            step_limit: STEP_LIMIT,
            allow_live_retarget: true,
        });

        let ox = rng.r#gen::<f64>() * 2.0 - 1.0;
        let oz = rng.r#gen::<f64>() * 2.0 - 1.0;
        self.offset = Vec3::new(ox, 0.0, oz);
        self.stuck = false;
        self.state = ExecutionState::Pursuing;

        debug!(target = %target.id, offset = %self.offset, "Pursuit started");
    }

    /// Fold the latest path follower event into the state.
    pub fn on_path_event(&mut self, event: PathEvent) -> Recovery {
        if self.state == ExecutionState::Idle {
            return Recovery::None;
        }
        match event {
            PathEvent::Active | PathEvent::GoalReached => Recovery::None,
            PathEvent::Stuck => {
                self.stuck = true;
                self.state = ExecutionState::Stuck;
                Recovery::Teleport
            }
            PathEvent::NoPath => Recovery::Teleport,
        }
    }

    /// Per-tick update while pursuing.
    ///
    /// Retargets the path follower to the live aim point, then decides:
    /// within 3 units stops pursuit; beyond `teleportAfterRange` a 5% roll may
    /// request a teleport; otherwise pursuit continues while not stuck and
    /// the path follower is still active.
    pub fn update<P, R>(
        &mut self,
        agent_position: Vec3,
        target_position: Vec3,
        config: &StayCloseConfig,
        path: &mut P,
        rng: &mut R,
    ) -> ControlStep
    where
        P: PathFollower + ?Sized,
        R: Rng + ?Sized,
    {
        if self.state == ExecutionState::Idle {
            return ControlStep::stop(StopReason::PathInactive);
        }

        let aim = self.aim_point(target_position);
        path.set_current_target(aim);

        let distance_squared = agent_position.distance_squared(aim);
        if distance_squared < CLOSE_ENOUGH_SQUARED {
            return ControlStep::stop(StopReason::CloseEnough);
        }

        let teleport = config.allow_teleport
            && distance_squared > config.teleport_after_range_squared()
            && rng.r#gen::<f64>() < TELEPORT_ROLL_CHANCE;

        let stop = if self.stuck {
            Some(StopReason::Stuck)
        } else if !path.is_active() {
            Some(StopReason::PathInactive)
        } else {
            None
        };

        ControlStep { teleport, stop }
    }

    /// End the current episode and release movement.
    pub fn halt<P: PathFollower + ?Sized>(&mut self, reason: StopReason, path: &mut P) {
        if self.state == ExecutionState::Idle {
            return;
        }
        if path.is_active() {
            path.stop();
        }
        debug!(?reason, "Pursuit stopped");
        self.state = ExecutionState::Idle;
        self.stuck = false;
    }
}
