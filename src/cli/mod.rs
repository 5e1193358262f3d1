mod agent;
mod args;
mod provider;

pub use agent::{build_registry, create_agent};
pub use args::{Cli, Commands, ConfigSubcommands, RunArgs};
pub use provider::{create_provider_for_cli, resolve_config, run_config};
