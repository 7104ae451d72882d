//! Per-agent task scheduler surface.
//!
//! A [`TaskRunner`] owns one agent's task and path follower and drives the
//! [`AiTask`] lifecycle once per tick:
//!
//! | runner state | this tick                                           |
//! |--------------|-----------------------------------------------------|
//! | idle         | `should_execute`, then `start_execute` if it agreed |
//! | executing    | `continue_execute`, then `finish_execute` on `false` |
//!
//! After the task has run, the path follower moves the agent's body, unless
//! the task teleported it this tick, and the body is written back to the
//! store.

use companion_core::error::Result;
use companion_core::{AiTask, CompanionError, EntityId, PathFollower, TaskContext};
use tracing::debug;

use crate::config::WorldConfig;
use crate::entities::AgentBody;
use crate::pathing::StraightLinePath;
use crate::world::World;

/// What a runner did on its last tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerStatus {
    /// The task did not want to run.
    Idle,
    /// The task started this tick.
    Started,
    /// The task is still running.
    Executing,
    /// The task finished this tick.
    Finished,
    /// The agent is dead, despawning or gone; any execution was cancelled.
    AgentGone,
}

/// Drives one agent's task against a [`World`].
#[derive(Debug)]
pub struct TaskRunner<T> {
    agent: EntityId,
    task: T,
    path: StraightLinePath,
    executing: bool,
}

impl<T: AiTask> TaskRunner<T> {
    /// Attach `task` to `agent`.
    ///
    /// # Errors
    /// Returns `CompanionError::EntityNotFound` if `agent` is not in `world`.
    pub fn spawn(world: &World, agent: EntityId, task: T, config: &WorldConfig) -> Result<Self> {
        if world.entities.get(agent).is_none() {
            return Err(CompanionError::EntityNotFound(agent));
        }
        Ok(Self {
            agent,
            task,
            path: StraightLinePath::new(&config.pathing),
            executing: false,
        })
    }

    /// The agent this runner drives.
    pub fn agent(&self) -> EntityId {
        self.agent
    }

    /// The task.
    pub fn task(&self) -> &T {
        &self.task
    }

    /// The task, mutably.
    pub fn task_mut(&mut self) -> &mut T {
        &mut self.task
    }

    /// The agent's path follower.
    pub fn path(&self) -> &StraightLinePath {
        &self.path
    }

    /// Whether the task is currently executing.
    pub fn is_executing(&self) -> bool {
        self.executing
    }

    /// Run one tick.
    pub fn tick(&mut self, world: &mut World) -> RunnerStatus {
        let Some(mut body) = self.body(world) else {
            return self.agent_gone();
        };

        let status = {
            let mut ctx = TaskContext::new(&mut body, &*world, &mut self.path);
            if self.executing {
                if self.task.continue_execute(&mut ctx) {
                    RunnerStatus::Executing
                } else {
                    self.task.finish_execute(&mut ctx, false);
                    self.executing = false;
                    RunnerStatus::Finished
                }
            } else if self.task.should_execute(&mut ctx) {
                self.task.start_execute(&mut ctx);
                self.executing = true;
                RunnerStatus::Started
            } else {
                RunnerStatus::Idle
            }
        };

        if body.teleported {
            debug!(agent = %self.agent, to = %body.position, "Agent teleported, skipping movement");
        } else {
            self.path.advance(&mut body, &world.terrain);
        }
        self.write_back(world, &body);
        status
    }

    /// Cancel execution, releasing movement.
    pub fn cancel(&mut self, world: &mut World) {
        if !self.executing {
            return;
        }
        match self.body(world) {
            Some(mut body) => {
                let mut ctx = TaskContext::new(&mut body, &*world, &mut self.path);
                self.task.finish_execute(&mut ctx, true);
                self.write_back(world, &body);
            }
            None => self.path.stop(),
        }
        self.executing = false;
        debug!(agent = %self.agent, "Task cancelled");
    }

    fn body(&self, world: &World) -> Option<AgentBody> {
        world
            .entities
            .get(self.agent)
            .filter(|snapshot| snapshot.is_present())
            .map(AgentBody::from)
    }

    fn agent_gone(&mut self) -> RunnerStatus {
        if self.executing {
            // No body to build a context from; release movement only.
            self.path.stop();
            self.executing = false;
            debug!(agent = %self.agent, "Agent gone, execution dropped");
        }
        RunnerStatus::AgentGone
    }

    fn write_back(&self, world: &mut World, body: &AgentBody) {
        if world.entities.set_position(body.id, body.position).is_err() {
            debug!(agent = %body.id, "Agent removed during tick");
        }
    }
}

/// Tick every runner once, then advance the world clock.
pub fn tick_all<T: AiTask>(world: &mut World, runners: &mut [TaskRunner<T>]) -> Vec<RunnerStatus> {
    let statuses = runners.iter_mut().map(|runner| runner.tick(world)).collect();
    world.tick += 1;
    statuses
}
