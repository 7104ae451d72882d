//! Per-task counters.
//!
//! Plain integers: a task is only ever touched by its own agent's tick.
//! Hosts aggregate snapshots across agents for dashboards.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

/// Running counters for one stay-close task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    /// Ticks on which the 1% acquisition roll passed.
    pub gate_passes: u64,
    /// New companions found by a spatial search.
    pub acquisitions: u64,
    /// Pursuit episodes started.
    pub pursuits_started: u64,
    /// Pursuits ended by getting within 3 units of the aim point.
    pub close_enough_stops: u64,
    /// Stuck events reported by the path follower.
    pub stuck_events: u64,
    /// No-path events reported by the path follower.
    pub no_path_events: u64,
    /// Teleport searches run.
    pub teleport_attempts: u64,
    /// Teleport searches that relocated the agent.
    pub teleports: u64,
}

impl TaskStats {
    /// Fraction of teleport searches that succeeded, or `None` before the
    /// first attempt.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn teleport_success_rate(&self) -> Option<f64> {
        (self.teleport_attempts > 0).then(|| self.teleports as f64 / self.teleport_attempts as f64)
    }
}

impl AddAssign for TaskStats {
    fn add_assign(&mut self, rhs: Self) {
        self.gate_passes += rhs.gate_passes;
        self.acquisitions += rhs.acquisitions;
        self.pursuits_started += rhs.pursuits_started;
        self.close_enough_stops += rhs.close_enough_stops;
        self.stuck_events += rhs.stuck_events;
        self.no_path_events += rhs.no_path_events;
        self.teleport_attempts += rhs.teleport_attempts;
        self.teleports += rhs.teleports;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_needs_attempts() {
        let mut stats = TaskStats::default();
        assert_eq!(stats.teleport_success_rate(), None);

        stats.teleport_attempts = 4;
        stats.teleports = 1;
        assert_eq!(stats.teleport_success_rate(), Some(0.25));
    }

    #[test]
    fn snapshots_aggregate() {
        let mut total = TaskStats::default();
        total += TaskStats {
            pursuits_started: 2,
            teleports: 1,
            ..TaskStats::default()
        };
        total += TaskStats {
            pursuits_started: 3,
            stuck_events: 1,
            ..TaskStats::default()
        };
        assert_eq!(total.pursuits_started, 5);
        assert_eq!(total.teleports, 1);
        assert_eq!(total.stuck_events, 1);
    }
}
