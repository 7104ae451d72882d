//! # Companion Core Library
//!
//! Game-agnostic "stay close to a companion" behavior for autonomous agents.
//!
//! An agent owning a [`StayCloseTask`] periodically checks whether it has
//! drifted too far from a designated companion entity. If so it walks toward
//! it through an external path-following service, and if walking keeps
//! failing it teleports to a safe spot next to the companion.
//!
//! The behavior is split into three cooperating parts:
//!
//! - **Target acquisition** ([`acquisition`]): finds and re-validates the
//!   companion, throttled by a 1% per-tick gate.
//! - **Proximity controller** ([`controller`]): the Idle / Pursuing / Stuck
//!   state machine driving the path follower.
//! - **Teleport recovery** ([`teleport`]): searches voxel space around the
//!   companion for a position with solid ground and clear headroom.
//!
//! Everything the behavior touches in the outside world goes through the
//! collaborator traits in [`world`]: the spatial index, collision queries,
//! the path follower and the agent body itself.
//!
//! ## Tick Contract
//!
//! All operations are synchronous and complete within one simulation tick.
//! Nothing here allocates per tick except the collision query results the
//! world hands back.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod acquisition;
pub mod config;
pub mod controller;
pub mod error;
pub mod stats;
pub mod task;
pub mod teleport;
pub mod types;
pub mod world;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::StayCloseConfig;
pub use controller::ExecutionState;
pub use error::CompanionError;
pub use task::{AiTask, StayCloseTask, TaskContext};
pub use types::*;
pub use world::{AgentHandle, CollisionQuery, EntityFilter, EntityIndex, PathEvent, PathFollower, WorldView};
