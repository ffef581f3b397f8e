//! Engine configuration

use serde::{Deserialize, Serialize};

/// Caller-injectable scheduling constants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Per-day cap used when placing the steps of a new goal
    #[serde(rename = "max-tasks-per-day")]
    pub max_tasks_per_day: usize,

    /// Length of the candidate window for single-day busy periods
    #[serde(rename = "single-day-window-days")]
    pub single_day_window_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_tasks_per_day: 2,
            single_day_window_days: 3,
        }
    }
}

impl EngineConfig {
    /// Reject values that would make the slot search meaningless
    pub fn validate(&self) -> Result<(), String> {
        if self.max_tasks_per_day == 0 {
            return Err("engine.max-tasks-per-day must be at least 1".to_string());
        }
        if self.single_day_window_days == 0 {
            return Err("engine.single-day-window-days must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_tasks_per_day, 2);
        assert_eq!(config.single_day_window_days, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero() {
        let config = EngineConfig {
            max_tasks_per_day: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            single_day_window_days: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: EngineConfig = serde_yaml::from_str("max-tasks-per-day: 4\n").unwrap();
        assert_eq!(config.max_tasks_per_day, 4);
        assert_eq!(config.single_day_window_days, 3);
    }
}
