use crate::config::{AppConfig, get_config_dir};
use crate::core::agent::FailurePolicy;
use crate::core::error::AgentError;
use crate::providers::ProviderKind;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Unknown config key '{0}'")]
    UnknownKey(String),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Config directory not found")]
    NoConfigDir,
}

impl From<ConfigError> for AgentError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// A partial update; `None` fields leave the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigPatch {
    pub provider: Option<ProviderKind>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub max_iterations: Option<usize>,
    pub replan_every_step: Option<bool>,
    pub failure_policy: Option<FailurePolicy>,
    pub timeout_secs: Option<u64>,
    pub max_planning_attempts: Option<usize>,
}

impl ConfigPatch {
    pub const KEYS: &'static [&'static str] = &[
        "provider",
        "model",
        "base_url",
        "max_iterations",
        "replan_every_step",
        "failure_policy",
        "timeout_secs",
        "max_planning_attempts",
    ];

    #[must_use]
    pub fn model(provider: ProviderKind, model: impl Into<String>) -> Self {
        Self {
            provider: Some(provider),
            model: Some(model.into()),
            ..Default::default()
        }
    }

    /// Builds a single-key patch from `config set` style input.
    pub fn parse(key: &str, value: &str) -> ConfigResult<Self> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            key: key.to_string(),
            reason,
        };
        let mut patch = Self::default();

        match key {
            "provider" => {
                patch.provider = Some(
                    value
                        .parse()
                        .map_err(|e: AgentError| invalid(e.to_string()))?,
                );
            }
            "model" => patch.model = Some(value.to_string()),
            "base_url" => patch.base_url = Some(value.to_string()),
            "max_iterations" => {
                let n: usize = value.parse().map_err(|e| invalid(format!("{e}")))?;
                if n == 0 {
                    return Err(invalid("must be at least 1".to_string()));
                }
                patch.max_iterations = Some(n);
            }
            "replan_every_step" => {
                patch.replan_every_step = Some(value.parse().map_err(|e| invalid(format!("{e}")))?);
            }
            "failure_policy" => {
                patch.failure_policy =
                    Some(value.parse().map_err(|e: AgentError| invalid(e.to_string()))?);
            }
            "timeout_secs" => {
                let secs: u64 = value.parse().map_err(|e| invalid(format!("{e}")))?;
                if secs == 0 {
                    return Err(invalid("must be non-zero".to_string()));
                }
                patch.timeout_secs = Some(secs);
            }
            "max_planning_attempts" => {
                let n: usize = value.parse().map_err(|e| invalid(format!("{e}")))?;
                if n == 0 {
                    return Err(invalid("must be at least 1".to_string()));
                }
                patch.max_planning_attempts = Some(n);
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }

        Ok(patch)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn merge_into(&self, mut config: AppConfig) -> AppConfig {
        if let Some(provider) = self.provider {
            config.provider = provider;
        }
        if let Some(ref model) = self.model {
            config.model = Some(model.clone());
        }
        if let Some(ref base_url) = self.base_url {
            config.base_url = Some(base_url.clone());
        }
        if let Some(n) = self.max_iterations {
            config.max_iterations = n;
        }
        if let Some(enabled) = self.replan_every_step {
            config.replan_every_step = enabled;
        }
        if let Some(policy) = self.failure_policy {
            config.failure_policy = policy;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = Some(secs);
        }
        if let Some(n) = self.max_planning_attempts {
            config.max_planning_attempts = n;
        }
        config
    }
}

/// Serializes writes to the config file; each write replaces it atomically.
pub struct ConfigPersister {
    config_path: PathBuf,
    write_lock: Mutex<()>,
}

impl ConfigPersister {
    #[must_use]
    pub fn new(config_path: PathBuf) -> Self {
        Self {
            config_path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_default_path() -> ConfigResult<Self> {
        get_config_dir()
            .map(|dir| Self::new(dir.join("config.toml")))
            .ok_or(ConfigError::NoConfigDir)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn apply_patch(&self, patch: &ConfigPatch) -> ConfigResult<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let _lock = self.write_lock.lock();

        let existing = self.read_existing_config()?;
        let merged = patch.merge_into(existing);

        self.atomic_write(&merged)?;
        tracing::info!(path = %self.config_path.display(), "Config updated");
        Ok(())
    }

    fn read_existing_config(&self) -> ConfigResult<AppConfig> {
        if self.config_path.exists() {
            let content = fs::read_to_string(&self.config_path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(AppConfig::default())
        }
    }

    fn atomic_write(&self, config: &AppConfig) -> ConfigResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_content = toml::to_string_pretty(config)?;
        let content = format!(
            "# Planwright configuration\n\
             # Written by `planwright config set`.\n\n\
             {toml_content}"
        );

        let temp_path = self.config_path.with_extension("toml.tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, &self.config_path)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_known_keys() {
        let patch = ConfigPatch::parse("failure_policy", "continue").unwrap();
        assert_eq!(patch.failure_policy, Some(FailurePolicy::Continue));

        let patch = ConfigPatch::parse("replan_every_step", "true").unwrap();
        assert_eq!(patch.replan_every_step, Some(true));

        let patch = ConfigPatch::parse("provider", "openai").unwrap();
        assert_eq!(patch.provider, Some(ProviderKind::OpenAI));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            ConfigPatch::parse("colour", "red"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            ConfigPatch::parse("max_iterations", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            ConfigPatch::parse("max_iterations", "lots"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            ConfigPatch::parse("failure_policy", "retry"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_every_key_is_parseable() {
        for key in ConfigPatch::KEYS {
            let value = match *key {
                "provider" => "openai",
                "failure_policy" => "abort",
                "replan_every_step" => "false",
                "model" | "base_url" => "x",
                _ => "5",
            };
            assert!(ConfigPatch::parse(key, value).is_ok(), "{key}");
        }
    }

    #[test]
    fn test_persister_apply_patch() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let persister = ConfigPersister::new(config_path.clone());

        persister
            .apply_patch(&ConfigPatch::model(ProviderKind::OpenAI, "gpt-4o-mini"))
            .unwrap();
        persister
            .apply_patch(&ConfigPatch::parse("max_iterations", "7").unwrap())
            .unwrap();

        let config = AppConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.provider, ProviderKind::OpenAI);
        assert_eq!(config.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(config.max_iterations, 7);
        assert!(!config_path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn test_empty_patch_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        ConfigPersister::new(config_path.clone())
            .apply_patch(&ConfigPatch::default())
            .unwrap();

        assert!(!config_path.exists());
    }
}
