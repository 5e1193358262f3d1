//! CLI argument definitions.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "planwright")]
#[command(author, version, about = "Plan-and-execute agent for LLM backends", long_about = None)]
pub struct Cli {
    /// Backend used for planning
    #[arg(short, long, global = true, value_enum)]
    pub provider: Option<ProviderArg>,

    /// Model to use (e.g., claude-sonnet-4-20250514, gpt-4o)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Root URL of an OpenAI-compatible server
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Read settings from this file instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Append JSON log lines to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Plan and execute one or more objectives
    Run(RunArgs),
    /// List the tools available to the planner
    Tools {
        /// Print tool specs as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigSubcommands,
    },
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Objectives to accomplish; several run concurrently
    #[arg(required = true)]
    pub objectives: Vec<String>,

    /// Maximum tool executions per run
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Ask the planner again after every successful step
    #[arg(long)]
    pub replan_every_step: bool,

    /// What to do when a step fails
    #[arg(long, value_enum)]
    pub failure_policy: Option<FailurePolicyArg>,

    /// Wall-clock limit per run, in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Planner calls allowed per planning phase
    #[arg(long)]
    pub max_planning_attempts: Option<usize>,

    /// Print run reports as JSON instead of plain answers
    #[arg(long)]
    pub json: bool,

    /// Write the run reports as JSON to this file
    #[arg(long)]
    pub save_report: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommands {
    /// Initialize a new config file
    Init,
    /// Print config file location
    Where,
    /// Print the effective configuration
    Show,
    /// Persist a single setting
    Set { key: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderArg {
    Anthropic,
    Openai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FailurePolicyArg {
    Abort,
    Continue,
}
