//! Configuration for the stay-close behavior.
//!
//! Field names on the wire match the task-config keys AI designers already
//! write (`movespeed`, `searchRange`, ...). Every option except
//! `entityCode` has a default, and unknown keys are ignored so the block can
//! share a task definition with scheduler settings.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CompanionError, Result};
use crate::types::EntityCode;

/// Immutable parameters of one [`StayCloseTask`](crate::StayCloseTask).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StayCloseConfig {
    /// Walking speed while pursuing.
    #[serde(rename = "movespeed", default = "default_move_speed")]
    pub move_speed: f64,
    /// Radius for target acquisition.
    #[serde(rename = "searchRange", default = "default_search_range")]
    pub search_range: f64,
    /// Distance beyond which pursuit starts.
    #[serde(rename = "maxDistance", default = "default_max_distance")]
    pub max_distance: f64,
    /// Restrict candidates to entities with a lower id than the agent.
    #[serde(rename = "onlyIfLowerId", default)]
    pub only_if_lower_id: bool,
    /// Type-code filter for candidates. Without it nothing ever matches.
    #[serde(rename = "entityCode", default)]
    pub entity_code: Option<EntityCode>,
    /// Enables teleport recovery.
    #[serde(rename = "allowTeleport", default)]
    pub allow_teleport: bool,
    /// Distance beyond which random teleport rolls occur while pursuing.
    #[serde(rename = "teleportAfterRange", default = "default_teleport_after_range")]
    pub teleport_after_range: f64,
}

impl Default for StayCloseConfig {
    fn default() -> Self {
        Self {
            move_speed: default_move_speed(),
            search_range: default_search_range(),
            max_distance: default_max_distance(),
            only_if_lower_id: false,
            entity_code: None,
            allow_teleport: false,
            teleport_after_range: default_teleport_after_range(),
        }
    }
}

impl StayCloseConfig {
    /// Default config following entities of type `code`.
    #[must_use]
    pub fn following(code: impl Into<String>) -> Self {
        Self {
            entity_code: Some(EntityCode::new(code)),
            ..Self::default()
        }
    }

    /// Load configuration from a JSON task block.
    ///
    /// # Errors
    /// Returns `CompanionError::Config` if the JSON is invalid, or
    /// `CompanionError::InvalidConfig` if a value fails validation.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| CompanionError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `CompanionError::Config` if the TOML is invalid, or
    /// `CompanionError::InvalidConfig` if a value fails validation.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| CompanionError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file. `.json` files are parsed as JSON,
    /// anything else as TOML.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        }
    }

    /// Check every numeric option is finite and non-negative and that the
    /// entity code, when present, is not empty.
    ///
    /// # Errors
    /// Returns `CompanionError::InvalidConfig` naming the first bad option.
    pub fn validate(&self) -> Result<()> {
        let distances = [
            ("movespeed", self.move_speed),
            ("searchRange", self.search_range),
            ("maxDistance", self.max_distance),
            ("teleportAfterRange", self.teleport_after_range),
        ];
        for (field, value) in distances {
            if !value.is_finite() || value < 0.0 {
                return Err(CompanionError::InvalidConfig {
                    field,
                    reason: format!("must be a finite non-negative number, got {value}"),
                });
            }
        }
        if self.entity_code.as_ref().is_some_and(|code| code.as_str().is_empty()) {
            return Err(CompanionError::InvalidConfig {
                field: "entityCode",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// `maxDistance²`, the pursuit trigger threshold.
    #[must_use]
    pub fn max_distance_squared(&self) -> f64 {
        self.max_distance * self.max_distance
    }

    /// `teleportAfterRange²`, the random-teleport threshold.
    #[must_use]
    pub fn teleport_after_range_squared(&self) -> f64 {
        self.teleport_after_range * self.teleport_after_range
    }
}

// ---------------------------------------------------------------------------
// Default value helpers
// ---------------------------------------------------------------------------

fn default_move_speed() -> f64 {
    0.03
}

fn default_search_range() -> f64 {
    8.0
}

fn default_max_distance() -> f64 {
    3.0
}

fn default_teleport_after_range() -> f64 {
    30.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = StayCloseConfig::default();
        assert!((config.move_speed - 0.03).abs() < f64::EPSILON);
        assert!((config.search_range - 8.0).abs() < f64::EPSILON);
        assert!((config.max_distance - 3.0).abs() < f64::EPSILON);
        assert!(!config.only_if_lower_id);
        assert!(config.entity_code.is_none());
        assert!(!config.allow_teleport);
        assert!((config.teleport_after_range - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn json_task_block_uses_wire_names() {
        let json = r#"{
            "code": "stayclosetoentity",
            "priority": 1.5,
            "movespeed": 0.05,
            "searchRange": 12,
            "entityCode": "wolf-female",
            "onlyIfLowerId": true,
            "allowTeleport": true
        }"#;
        let config = StayCloseConfig::from_json(json).expect("valid config");
        assert!((config.move_speed - 0.05).abs() < f64::EPSILON);
        assert!((config.search_range - 12.0).abs() < f64::EPSILON);
        assert!((config.max_distance - 3.0).abs() < f64::EPSILON);
        assert_eq!(config.entity_code, Some(EntityCode::new("wolf-female")));
        assert!(config.only_if_lower_id);
        assert!(config.allow_teleport);
        assert!((config.teleport_after_range - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn toml_config_loads() {
        let config = StayCloseConfig::from_toml(
            r#"
            entityCode = "sheep"
            maxDistance = 5.0
            teleportAfterRange = 20.0
            "#,
        )
        .expect("valid config");
        assert_eq!(config.entity_code, Some(EntityCode::new("sheep")));
        assert!((config.max_distance_squared() - 25.0).abs() < f64::EPSILON);
        assert!((config.teleport_after_range_squared() - 400.0).abs() < f64::EPSILON);
    }

    #[test]
    fn negative_range_is_rejected() {
        let err = StayCloseConfig::from_json(r#"{"searchRange": -1.0}"#).expect_err("invalid");
        assert!(matches!(err, CompanionError::InvalidConfig { field: "searchRange", .. }));
    }

    #[test]
    fn empty_entity_code_is_rejected() {
        let err = StayCloseConfig::from_toml(r#"entityCode = """#).expect_err("invalid");
        assert!(matches!(err, CompanionError::InvalidConfig { field: "entityCode", .. }));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = StayCloseConfig::from_json("{ movespeed: ").expect_err("invalid");
        assert!(matches!(err, CompanionError::Config(_)));
    }

    #[test]
    fn from_file_picks_format_by_extension() {
        let dir = tempfile::tempdir().expect("tempdir");

        let json_path = dir.path().join("task.json");
        std::fs::write(&json_path, r#"{"entityCode": "chicken-hen"}"#).expect("write");
        let from_json = StayCloseConfig::from_file(&json_path).expect("json config");
        assert_eq!(from_json.entity_code, Some(EntityCode::new("chicken-hen")));

        let toml_path = dir.path().join("task.toml");
        std::fs::write(&toml_path, "entityCode = \"chicken-rooster\"\nallowTeleport = true\n")
            .expect("write");
        let from_toml = StayCloseConfig::from_file(&toml_path).expect("toml config");
        assert_eq!(from_toml.entity_code, Some(EntityCode::new("chicken-rooster")));
        assert!(from_toml.allow_teleport);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = StayCloseConfig::from_file(&dir.path().join("absent.toml")).expect_err("missing");
        assert!(matches!(err, CompanionError::Io(_)));
    }
}
