pub mod persistence;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fs, io};

use crate::core::agent::{FailurePolicy, RunConfig};
use crate::core::error::{AgentError, Result};
use crate::planner::PlannerConfig;
use crate::providers::ProviderKind;
use crate::providers::factory::ProviderSettings;
use crate::providers::http::HttpConfig;

pub use persistence::{ConfigError, ConfigPatch, ConfigPersister, ConfigResult};

pub const ENV_PREFIX: &str = "PLANWRIGHT";

pub fn get_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .map(|h| h.join("Library/Application Support/planwright"))
    }

    #[cfg(target_os = "linux")]
    {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
            .map(|c| c.join("planwright"))
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .map(|a| a.join("planwright"))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .map(|h| h.join(".config/planwright"))
    }
}

/// Settings merged from `config.toml` and `PLANWRIGHT_*` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub provider: ProviderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub max_iterations: usize,
    pub replan_every_step: bool,
    pub failure_policy: FailurePolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    pub max_planning_attempts: usize,
    pub max_tokens: u32,
    pub temperature: f32,
    pub http_timeout_secs: u64,
    pub http_max_retries: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        let run = RunConfig::default();
        let planner = PlannerConfig::default();
        let http = HttpConfig::default();
        Self {
            provider: ProviderKind::default(),
            model: None,
            base_url: None,
            max_iterations: run.max_iterations,
            replan_every_step: run.replan_every_step,
            failure_policy: run.failure_policy,
            timeout_secs: None,
            max_planning_attempts: run.max_planning_attempts,
            max_tokens: planner.max_tokens,
            temperature: planner.temperature,
            http_timeout_secs: http.timeout.as_secs(),
            http_max_retries: http.max_retries,
        }
    }
}

impl AppConfig {
    /// Loads from the default location; a missing file is not an error.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::get_config_path().as_deref())
    }

    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let config: Self = builder
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| AgentError::Config(format!("Failed to load config: {e}")))?;

        tracing::debug!(
            path = ?path,
            provider = %config.provider,
            max_iterations = config.max_iterations,
            "Loaded configuration"
        );
        Ok(config)
    }

    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        get_config_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn init_default() -> std::result::Result<PathBuf, io::Error> {
        let path = Self::get_config_path().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine config directory",
            )
        })?;
        Self::init_at(&path)?;
        Ok(path)
    }

    /// Writes the commented template to `path`, refusing to overwrite.
    pub fn init_at(path: &Path) -> std::result::Result<(), io::Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Config file already exists at {}", path.display()),
            ));
        }

        fs::write(path, include_str!("config.template.toml"))
    }

    /// Loop settings; fails with `Config` when a value is out of range.
    pub fn run_config(&self) -> Result<RunConfig> {
        let mut run = RunConfig::new(self.max_iterations)
            .with_replan_every_step(self.replan_every_step)
            .with_failure_policy(self.failure_policy)
            .with_max_planning_attempts(self.max_planning_attempts);
        if let Some(secs) = self.timeout_secs {
            run = run.with_timeout(Duration::from_secs(secs));
        }
        run.validate()?;
        Ok(run)
    }

    #[must_use]
    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            kind: self.provider,
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            http: HttpConfig::default()
                .with_timeout(Duration::from_secs(self.http_timeout_secs))
                .with_max_retries(self.http_max_retries),
        }
    }

    #[must_use]
    pub const fn planner_config(&self) -> PlannerConfig {
        PlannerConfig {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_run_config() {
        let config = AppConfig::default();
        let run = config.run_config().unwrap();

        assert_eq!(run, RunConfig::default());
        assert_eq!(config.provider, ProviderKind::Anthropic);
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "provider = \"openai\"\nmodel = \"gpt-4o-mini\"\nmax_iterations = 4\nfailure_policy = \"continue\"\ntimeout_secs = 30\n",
        )
        .unwrap();

        let config = AppConfig::load_from(Some(&path)).unwrap();

        assert_eq!(config.provider, ProviderKind::OpenAI);
        assert_eq!(config.model.as_deref(), Some("gpt-4o-mini"));
        let run = config.run_config().unwrap();
        assert_eq!(run.max_iterations, 4);
        assert_eq!(run.failure_policy, FailurePolicy::Continue);
        assert_eq!(run.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load_from(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.max_iterations, AppConfig::default().max_iterations);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "max_iterations = \"many\"\n").unwrap();

        let err = AppConfig::load_from(Some(&path)).unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let config = AppConfig {
            max_iterations: 0,
            ..AppConfig::default()
        };
        assert!(matches!(config.run_config(), Err(AgentError::Config(_))));
    }

    #[test]
    fn test_template_parses() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        AppConfig::init_at(&path).unwrap();
        let config = AppConfig::load_from(Some(&path)).unwrap();
        assert!(config.run_config().is_ok());

        let err = AppConfig::init_at(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_provider_settings() {
        let config = AppConfig {
            provider: ProviderKind::OpenAI,
            base_url: Some("http://localhost:8000/v1".to_string()),
            http_timeout_secs: 15,
            ..AppConfig::default()
        };

        let settings = config.provider_settings();
        assert_eq!(settings.kind, ProviderKind::OpenAI);
        assert_eq!(settings.http.timeout, Duration::from_secs(15));
        assert_eq!(config.planner_config().max_tokens, config.max_tokens);
    }
}
