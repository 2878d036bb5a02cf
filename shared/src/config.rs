use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::Role;

/// Runtime settings of the planner. Every field has a default so a partial
/// JSON override only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub api_base_url: String,
    /// First hour drawn on the grid (opening)
    pub grid_start_hour: u32,
    /// Hour at which the grid stops (closing), exclusive
    pub grid_end_hour: u32,
    pub pixels_per_hour: f64,
    pub default_slot_duration: u32,
    /// Pointer travel below which a press+release is a click
    pub click_threshold_px: f64,
    pub admin_session_minutes: i64,
    pub employee_session_hours: i64,
    pub log_level: String,
    pub storage_key: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            grid_start_hour: 6,
            grid_end_hour: 22,
            pixels_per_hour: 64.0,
            default_slot_duration: 60,
            click_threshold_px: 4.0,
            admin_session_minutes: 30,
            employee_session_hours: 8,
            log_level: "info".to_string(),
            storage_key: "planning.session".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Parse(String),
    #[error("Grid hours {start}..{end} are not a valid opening range")]
    GridHours { start: u32, end: u32 },
    #[error("pixels_per_hour must be positive")]
    PixelsPerHour,
    #[error("Default slot duration {0} is not a positive multiple of 15")]
    DefaultDuration(u32),
    #[error("{field} = {value} is outside {min}..={max}")]
    SessionLength {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

/// Longest admin session, one day
const MAX_ADMIN_SESSION_MINUTES: i64 = 24 * 60;
/// Longest employee session, one week
const MAX_EMPLOYEE_SESSION_HOURS: i64 = 7 * 24;

fn check_session_length(field: &'static str, value: i64, max: i64) -> Result<(), ConfigError> {
    if (1..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::SessionLength { field, value, min: 1, max })
    }
}

impl PlannerConfig {
    /// Defaults overlaid with the keys present in `json`
    pub fn from_json_overrides(json: &str) -> Result<Self, ConfigError> {
        let config: PlannerConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_start_hour >= self.grid_end_hour || self.grid_end_hour > 24 {
            return Err(ConfigError::GridHours {
                start: self.grid_start_hour,
                end: self.grid_end_hour,
            });
        }
        if !(self.pixels_per_hour > 0.0) {
            return Err(ConfigError::PixelsPerHour);
        }
        if self.default_slot_duration == 0 || self.default_slot_duration % 15 != 0 {
            return Err(ConfigError::DefaultDuration(self.default_slot_duration));
        }
        check_session_length(
            "admin_session_minutes",
            self.admin_session_minutes,
            MAX_ADMIN_SESSION_MINUTES,
        )?;
        check_session_length(
            "employee_session_hours",
            self.employee_session_hours,
            MAX_EMPLOYEE_SESSION_HOURS,
        )
    }

    pub fn session_duration(&self, role: Role) -> chrono::Duration {
        match role {
            Role::Admin => chrono::Duration::minutes(self.admin_session_minutes),
            Role::Employee => chrono::Duration::hours(self.employee_session_hours),
        }
    }

    pub fn grid_start_minute(&self) -> u32 {
        self.grid_start_hour * 60
    }

    pub fn grid_end_minute(&self) -> u32 {
        self.grid_end_hour * 60
    }

    pub fn grid_height(&self) -> f64 {
        (self.grid_end_hour - self.grid_start_hour) as f64 * self.pixels_per_hour
    }

    /// `log_level` as a filter, falling back to `Info` on unknown names
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PlannerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid_height(), 16.0 * 64.0);
        assert_eq!(config.session_duration(Role::Admin), chrono::Duration::minutes(30));
        assert_eq!(config.session_duration(Role::Employee), chrono::Duration::hours(8));
    }

    #[test]
    fn test_partial_override() {
        let config =
            PlannerConfig::from_json_overrides(r#"{"grid_start_hour": 7, "log_level": "debug"}"#)
                .unwrap();
        assert_eq!(config.grid_start_hour, 7);
        assert_eq!(config.grid_end_hour, 22);
        assert_eq!(config.level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_invalid_override() {
        assert!(matches!(
            PlannerConfig::from_json_overrides("{"),
            Err(ConfigError::Parse(_))
        ));
        assert_eq!(
            PlannerConfig::from_json_overrides(r#"{"grid_start_hour": 23, "grid_end_hour": 8}"#),
            Err(ConfigError::GridHours { start: 23, end: 8 })
        );
        assert_eq!(
            PlannerConfig::from_json_overrides(r#"{"default_slot_duration": 50}"#),
            Err(ConfigError::DefaultDuration(50))
        );
    }

    #[test]
    fn test_session_lengths_out_of_range_are_rejected() {
        assert_eq!(
            PlannerConfig::from_json_overrides(r#"{"admin_session_minutes": 0}"#),
            Err(ConfigError::SessionLength {
                field: "admin_session_minutes",
                value: 0,
                min: 1,
                max: 1440,
            })
        );
        assert!(matches!(
            PlannerConfig::from_json_overrides(r#"{"admin_session_minutes": -5}"#),
            Err(ConfigError::SessionLength { value: -5, .. })
        ));
        assert!(matches!(
            PlannerConfig::from_json_overrides(
                r#"{"employee_session_hours": 9223372036854775807}"#
            ),
            Err(ConfigError::SessionLength { field: "employee_session_hours", .. })
        ));
        assert!(matches!(
            PlannerConfig::from_json_overrides(r#"{"employee_session_hours": 169}"#),
            Err(ConfigError::SessionLength { max: 168, .. })
        ));

        let widest = PlannerConfig::from_json_overrides(
            r#"{"admin_session_minutes": 1440, "employee_session_hours": 168}"#,
        )
        .unwrap();
        assert_eq!(widest.session_duration(Role::Admin), chrono::Duration::days(1));
        assert_eq!(widest.session_duration(Role::Employee), chrono::Duration::weeks(1));
    }

    #[test]
    fn test_unknown_log_level_falls_back() {
        let config = PlannerConfig {
            log_level: "chatty".to_string(),
            ..PlannerConfig::default()
        };
        assert_eq!(config.level_filter(), log::LevelFilter::Info);
    }
}
