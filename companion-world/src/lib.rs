//! # companion-world: Reference World for the Companion Behavior
//!
//! `companion-core` only describes how the stay-close behavior drives its
//! collaborators. This crate provides a small, complete voxel world that
//! implements all of them, so the behavior can run end to end in tests,
//! benchmarks and tools.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                companion-world               │
//! │  ┌──────────────┐        ┌────────────────┐  │
//! │  │ EntityStore  │        │    Terrain     │  │
//! │  └──────┬───────┘        └───────┬────────┘  │
//! │         └──────────┬─────────────┘           │
//! │                    ▼                         │
//! │   World / SharedWorld (EntityIndex +         │
//! │                        CollisionQuery)       │
//! │                    ▲                         │
//! │  ┌─────────────────┴──────────────────────┐  │
//! │  │ TaskRunner ── StraightLinePath         │  │
//! │  │      │                                 │  │
//! │  │      ▼                                 │  │
//! │  │ companion-core::StayCloseTask          │  │
//! │  └────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: world tuning loaded from TOML
//! - `entities`: entity store, agent bodies, nearest-entity queries
//! - `terrain`: sparse voxel collision
//! - `world`: the combined world and its shared, read-locked handle
//! - `pathing`: straight-line path follower emitting path events
//! - `runner`: per-agent task scheduler surface
//! - `telemetry`: tracing subscriber setup

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod entities;
pub mod pathing;
pub mod runner;
pub mod telemetry;
pub mod terrain;
pub mod world;

pub use config::WorldConfig;
pub use entities::{AgentBody, EntityRecord, EntityStore};
pub use pathing::StraightLinePath;
pub use runner::{RunnerStatus, TaskRunner};
pub use terrain::Terrain;
pub use world::{SharedWorld, World};
