//! Teleport recovery: relocating the agent next to its companion.
//!
//! The search samples up to [`CANDIDATE_COUNT`] random horizontal offsets
//! within ±[`HORIZONTAL_SPREAD`] of the anchor (the companion's position),
//! and for each probes [`VERTICAL_PROBES`] heights nearest-first:
//! `0, -1, 1, -2, 2, -3, 3, -4`. A height is standable when the cell at head
//! height (`+0.5`) has no collision volume and the cell just below the feet
//! (`-0.1`) has one. The first standable position wins.
//!
//! The destination is the probed position itself, including its vertical
//! offset, not the sampled column at the anchor's height. A companion
//! standing above a ledge therefore gets its agent placed on the ledge: an
//! anchor at `y = 64` with ground only under `y = 62` yields `y = 62`.

use rand::Rng;
use tracing::{debug, trace};

use crate::config::StayCloseConfig;
use crate::types::{BlockPos, Vec3};
use crate::world::{AgentHandle, CollisionQuery};

/// Random horizontal candidates tried per search.
pub const CANDIDATE_COUNT: usize = 20;
/// Vertical offsets probed per candidate.
pub const VERTICAL_PROBES: usize = 8;
/// Half-width of the horizontal sampling square.
pub const HORIZONTAL_SPREAD: f64 = 5.0;
/// Height above the standing point that must be free of collision.
pub const HEAD_PROBE: f64 = 0.5;
/// Depth below the standing point that must be solid.
pub const FOOT_PROBE: f64 = 0.1;

/// The `j`-th vertical probe offset: `0, -1, 1, -2, 2, -3, 3, -4, ...`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub const fn vertical_offset(j: usize) -> i32 {
    let magnitude = j.div_ceil(2) as i32;
    if j % 2 == 1 { -magnitude } else { magnitude }
}

/// All vertical offsets of one candidate column, in probe order.
pub fn vertical_offsets() -> impl Iterator<Item = i32> {
    (0..VERTICAL_PROBES).map(vertical_offset)
}

/// Whether an entity could stand at `pos`: clear at head height, solid just
/// below the feet.
pub fn is_standable<C: CollisionQuery + ?Sized>(collision: &C, pos: Vec3) -> bool {
    let head = BlockPos::containing(Vec3::new(pos.x, pos.y + HEAD_PROBE, pos.z));
    if collision.is_solid(head) {
        return false;
    }
    let feet = BlockPos::containing(Vec3::new(pos.x, pos.y - FOOT_PROBE, pos.z));
    collision.is_solid(feet)
}

/// Search for a standable position around `anchor`.
///
/// Returns `None` after all `20 × 8` probes fail.
pub fn search_standing_position<C, R>(collision: &C, anchor: Vec3, rng: &mut R) -> Option<Vec3>
where
    C: CollisionQuery + ?Sized,
    R: Rng + ?Sized,
{
    for _ in 0..CANDIDATE_COUNT {
        let dx = rng.r#gen::<f64>() * 2.0 * HORIZONTAL_SPREAD - HORIZONTAL_SPREAD;
        let dz = rng.r#gen::<f64>() * 2.0 * HORIZONTAL_SPREAD - HORIZONTAL_SPREAD;
        let column = Vec3::new(anchor.x + dx, anchor.y, anchor.z + dz);

        for dy in vertical_offsets() {
            let probe = Vec3::new(column.x, column.y + f64::from(dy), column.z);
            if is_standable(collision, probe) {
                return Some(probe);
            }
        }
        trace!(column = %column, "Teleport column rejected");
    }
    None
}

/// Find a teleport destination next to `anchor`, or `None` when teleporting
/// is disabled or no standable position was found.
pub fn find_teleport_target<C, R>(
    config: &StayCloseConfig,
    collision: &C,
    anchor: Vec3,
    rng: &mut R,
) -> Option<Vec3>
where
    C: CollisionQuery + ?Sized,
    R: Rng + ?Sized,
{
    if !config.allow_teleport {
        return None;
    }
    search_standing_position(collision, anchor, rng)
}

/// Relocate `agent` next to `anchor` if a destination can be found.
///
/// Returns whether the agent moved. A failed search leaves the agent where
/// it is.
pub fn try_teleport<A, C, R>(
    config: &StayCloseConfig,
    agent: &mut A,
    collision: &C,
    anchor: Vec3,
    rng: &mut R,
) -> bool
where
    A: AgentHandle + ?Sized,
    C: CollisionQuery + ?Sized,
    R: Rng + ?Sized,
{
    if !config.allow_teleport {
        return false;
    }
    match search_standing_position(collision, anchor, rng) {
        Some(destination) => {
            debug!(
                agent = %agent.id(),
                from = %agent.position(),
                to = %destination,
                "Teleporting to companion"
            );
            agent.teleport_to(destination);
            true
        }
        None => {
            debug!(agent = %agent.id(), anchor = %anchor, "No safe teleport position found");
            false
        }
    }
}
