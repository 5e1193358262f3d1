use std::sync::Arc;

use planwright::config::AppConfig;
use planwright::core::agent::{FailurePolicy, RunConfig};
use planwright::core::{LLM, Result};
use planwright::providers::{ProviderKind, create_provider};

use super::args::{Cli, FailurePolicyArg, ProviderArg, RunArgs};

/// Loads the config file and environment, then lays the global flags on top.
pub fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(Some(path.as_path()))?,
        None => AppConfig::load()?,
    };

    if let Some(provider) = cli.provider {
        config.provider = match provider {
            ProviderArg::Anthropic => ProviderKind::Anthropic,
            ProviderArg::Openai => ProviderKind::OpenAI,
        };
    }
    if let Some(model) = &cli.model {
        config.model = Some(model.clone());
        if cli.provider.is_none()
            && let Some(kind) = ProviderKind::infer(model)
        {
            config.provider = kind;
        }
    }
    if let Some(base_url) = &cli.base_url {
        config.base_url = Some(base_url.clone());
    }

    Ok(config)
}

/// Applies `run` flags to the configured loop settings.
pub fn run_config(config: &AppConfig, args: &RunArgs) -> Result<RunConfig> {
    let mut config = config.clone();

    if let Some(n) = args.max_iterations {
        config.max_iterations = n;
    }
    if args.replan_every_step {
        config.replan_every_step = true;
    }
    if let Some(policy) = args.failure_policy {
        config.failure_policy = match policy {
            FailurePolicyArg::Abort => FailurePolicy::Abort,
            FailurePolicyArg::Continue => FailurePolicy::Continue,
        };
    }
    if let Some(secs) = args.timeout_secs {
        config.timeout_secs = Some(secs);
    }
    if let Some(n) = args.max_planning_attempts {
        config.max_planning_attempts = n;
    }

    config.run_config()
}

pub fn create_provider_for_cli(config: &AppConfig) -> Result<Arc<dyn LLM>> {
    create_provider(&config.provider_settings())
}
