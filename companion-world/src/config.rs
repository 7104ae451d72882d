//! World-side configuration, loadable from `companion-world.toml`.
//!
//! Behavior parameters live with each task
//! ([`StayCloseConfig`](companion_core::StayCloseConfig)); this file only
//! tunes the reference world around it.

use std::path::Path;

use companion_core::CompanionError;
use companion_core::error::Result;
use serde::{Deserialize, Serialize};

/// Top-level world configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Path follower tuning.
    #[serde(default)]
    pub pathing: PathingConfig,
    /// Logging setup.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl WorldConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `CompanionError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| CompanionError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Straight-line path follower settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathingConfig {
    /// Consecutive blocked ticks before the follower reports stuck.
    #[serde(default = "default_stall_ticks")]
    pub stall_ticks_before_stuck: u32,
}

impl Default for PathingConfig {
    fn default() -> Self {
        Self {
            stall_ticks_before_stuck: default_stall_ticks(),
        }
    }
}

/// Tracing subscriber settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Fallback filter when `RUST_LOG` is unset: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
        }
    }
}

fn default_stall_ticks() -> u32 {
    20
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = WorldConfig::from_toml("").expect("empty config");
        assert_eq!(config.pathing.stall_ticks_before_stuck, 20);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(!config.telemetry.json);
    }

    #[test]
    fn sections_override_defaults() {
        let config = WorldConfig::from_toml(
            r#"
            [pathing]
            stall_ticks_before_stuck = 5

            [telemetry]
            log_level = "debug"
            json = true
            "#,
        )
        .expect("valid config");
        assert_eq!(config.pathing.stall_ticks_before_stuck, 5);
        assert_eq!(config.telemetry.log_level, "debug");
        assert!(config.telemetry.json);
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        let err = WorldConfig::from_toml("[pathing\n").expect_err("invalid");
        assert!(matches!(err, CompanionError::Config(_)));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("companion-world.toml");
        std::fs::write(&path, "[pathing]\nstall_ticks_before_stuck = 3\n").expect("write");
        let config = WorldConfig::from_file(&path).expect("config");
        assert_eq!(config.pathing.stall_ticks_before_stuck, 3);
    }
}
