//! Goal planner configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::EngineConfig;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scheduling constants
    pub engine: EngineConfig,

    /// Advisory language model
    pub llm: LlmConfig,

    /// Snapshot storage
    pub storage: StorageConfig,
}

impl Config {
    /// Validate configuration before use
    pub fn validate(&self) -> Result<()> {
        self.engine.validate().map_err(|e| eyre::eyre!(e))?;
        if self.llm.max_tokens == 0 {
            return Err(eyre::eyre!("llm.max-tokens must be at least 1"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .goalplanner.yml
        let local_config = PathBuf::from(".goalplanner.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/goalplanner/goalplanner.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("goalplanner").join("goalplanner.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "openai" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: "https://api.openai.com".to_string(),
            max_tokens: 10_000,
            timeout_ms: 120_000,
        }
    }
}

impl LlmConfig {
    /// The API key, if the configured variable is set and non-empty
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok().filter(|k| !k.trim().is_empty())
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON snapshot of goals and steps
    #[serde(rename = "snapshot-path")]
    pub snapshot_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        // Use XDG data directory (~/.local/share/goalplanner on Linux)
        let snapshot_path = dirs::data_dir()
            .map(|d| d.join("goalplanner"))
            .unwrap_or_else(|| PathBuf::from(".goalplanner"))
            .join("snapshot.json");

        Self { snapshot_path }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.engine.max_tasks_per_day, 2);
        assert_eq!(config.engine.single_day_window_days, 3);
        assert!(config.storage.snapshot_path.ends_with("snapshot.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
engine:
  max-tasks-per-day: 3
  single-day-window-days: 5

llm:
  provider: openai
  model: gpt-4.1
  api-key-env: MY_API_KEY
  base-url: https://api.example.com
  max-tokens: 2000
  timeout-ms: 60000

storage:
  snapshot-path: /tmp/plans.json
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.engine.max_tasks_per_day, 3);
        assert_eq!(config.engine.single_day_window_days, 5);
        assert_eq!(config.llm.model, "gpt-4.1");
        assert_eq!(config.llm.api_key_env, "MY_API_KEY");
        assert_eq!(config.llm.max_tokens, 2000);
        assert_eq!(config.storage.snapshot_path, PathBuf::from("/tmp/plans.json"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  model: gpt-4o-mini
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.engine.max_tasks_per_day, 2);
    }

    #[test]
    fn test_validate_rejects_zero_cap() {
        let config: Config = serde_yaml::from_str("engine:\n  max-tasks-per-day: 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gp.yml");
        fs::write(&path, "engine:\n  single-day-window-days: 7\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.engine.single_day_window_days, 7);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let path = PathBuf::from("/nonexistent/goalplanner.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    #[serial]
    fn test_api_key_from_env() {
        let config = LlmConfig {
            api_key_env: "GOALPLANNER_TEST_KEY".to_string(),
            ..Default::default()
        };

        // SAFETY: serialized with the other env-mutating tests
        unsafe { std::env::remove_var("GOALPLANNER_TEST_KEY") };
        assert_eq!(config.api_key(), None);

        unsafe { std::env::set_var("GOALPLANNER_TEST_KEY", "   ") };
        assert_eq!(config.api_key(), None);

        unsafe { std::env::set_var("GOALPLANNER_TEST_KEY", "sk-test") };
        assert_eq!(config.api_key(), Some("sk-test".to_string()));

        unsafe { std::env::remove_var("GOALPLANNER_TEST_KEY") };
    }
}
