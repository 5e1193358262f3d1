mod cli;

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use futures::future::join_all;
use tokio_util::sync::CancellationToken;

use planwright::config::{AppConfig, ConfigPatch, ConfigPersister};
use planwright::core::{AgentError, Result, RunOutcome, RunReport};
use planwright::logging;

use cli::{Cli, Commands, ConfigSubcommands, RunArgs};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _log_guard = logging::init(cli.verbose, cli.log_file.as_deref());

    let result = match &cli.command {
        Commands::Run(args) => run(&cli, args).await,
        Commands::Tools { json } => list_tools(*json).map(|()| ExitCode::SUCCESS),
        Commands::Config { command } => configure(&cli, command).map(|()| ExitCode::SUCCESS),
    };

    result.unwrap_or_else(|e| {
        eprintln!("✗ {e}");
        ExitCode::FAILURE
    })
}

async fn run(cli: &Cli, args: &RunArgs) -> Result<ExitCode> {
    let config = cli::resolve_config(cli)?;
    let run_config = cli::run_config(&config, args)?;
    let llm = cli::create_provider_for_cli(&config)?;
    let show_progress = !args.json && args.objectives.len() == 1;
    let agent = cli::create_agent(&llm, &config, show_progress)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Interrupted, cancelling…");
            on_interrupt.cancel();
        }
    });

    let reports: Vec<RunReport> = join_all(args.objectives.iter().map(|objective| {
        agent.run_with_cancel(objective.as_str(), &run_config, cancel.clone())
    }))
    .await;

    if let Some(path) = &args.save_report {
        fs::write(path, serde_json::to_string_pretty(&reports)?)?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        let labelled = reports.len() > 1;
        for report in &reports {
            if labelled {
                println!("## {}", report.state.objective);
            }
            match &report.outcome {
                RunOutcome::Done { final_answer } => println!("{final_answer}"),
                RunOutcome::Failed { error } => eprintln!("✗ {error}"),
            }
        }
    }

    let all_done = reports.iter().all(|r| r.outcome.is_done());
    Ok(if all_done {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn list_tools(json: bool) -> Result<()> {
    let registry = cli::build_registry()?;
    let specs = registry.specs();

    if json {
        let listing: Vec<_> = specs
            .iter()
            .map(|spec| {
                serde_json::json!({
                    "name": spec.name,
                    "description": spec.description,
                    "input_schema": spec.input_schema,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        for spec in specs {
            println!("{:<14} {}", spec.name, spec.description);
        }
    }
    Ok(())
}

fn configure(cli: &Cli, command: &ConfigSubcommands) -> Result<()> {
    match command {
        ConfigSubcommands::Init => {
            let path = AppConfig::init_default()?;
            println!("✓ Created config file at {}", path.display());
        }
        ConfigSubcommands::Where => {
            let path = cli
                .config
                .clone()
                .or_else(AppConfig::get_config_path)
                .ok_or_else(|| AgentError::Config("Could not determine config path".to_string()))?;
            println!("{}", path.display());
        }
        ConfigSubcommands::Show => {
            let config = cli::resolve_config(cli)?;
            let rendered = toml::to_string_pretty(&config)
                .map_err(|e| AgentError::Config(e.to_string()))?;
            print!("{rendered}");
        }
        ConfigSubcommands::Set { key, value } => {
            let persister = match &cli.config {
                Some(path) => ConfigPersister::new(path.clone()),
                None => ConfigPersister::with_default_path()?,
            };
            persister.apply_patch(&ConfigPatch::parse(key, value)?)?;
            println!("✓ Set {key} = {value} in {}", persister.path().display());
        }
    }
    Ok(())
}
