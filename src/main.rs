use std::path::PathBuf;

use clap::{Parser, Subcommand};

use director::config::{expand_tilde, Config};
use director::{Director, Phase, Result, SystemSnapshot};

/// Director - runs producer units through the development phases
#[derive(Parser, Debug)]
#[command(name = "director")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    DIRECTOR_DEBUG=1     Enable debug logging (alternative to --debug)")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    /// Config file (default: ~/.director/director.toml)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<String>,

    /// Print the final status as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run every phase in order (default)
    Cycle,

    /// Run a single phase
    Phase {
        /// One of: design, creation, level_design, coding, integration
        id: String,
    },

    /// Run one agent's primary task outside the phase table
    Agent {
        /// Agent name, e.g. character_creator
        name: String,
    },

    /// List the phase table
    Phases,

    /// Bring units up and print their status
    Status,

    /// Write a default config file
    InitConfig,
}

fn config_path(cli: &Cli) -> Result<PathBuf> {
    match &cli.config {
        Some(path) => Ok(expand_tilde(path)),
        None => Config::config_path(),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let path = config_path(&cli)?;
    let command = cli.command.clone().unwrap_or(Command::Cycle);

    if command == Command::InitConfig {
        Config::write_default(&path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let config = Config::load_from(&path)?;
    director::log::init_with_debug(cli.debug || config.log.debug, config.log.to_file);

    if command == Command::Phases {
        print_phases(&Director::new(config));
        return Ok(());
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let mut director = Director::with_stock_units(config);
        print_banner(&director);
        director.initialize().await?;

        match command {
            Command::Cycle => {
                let report = director.run_cycle().await?;
                println!(
                    "Cycle {} finished: {}/{} tasks successful",
                    report.id.short(),
                    report.successful_tasks(),
                    report.total_tasks()
                );
            }
            Command::Phase { id } => {
                let report = director.run_phase_named(&id).await?;
                for failure in &report.failures {
                    println!("  task {} ({}) failed: {}", failure.position, failure.task, failure.error);
                }
            }
            Command::Agent { name } => {
                if let Err(e) = director.run_single_unit(&name).await? {
                    println!("Agent {} failed: {}", name, e);
                }
            }
            Command::Status => {}
            Command::Phases | Command::InitConfig => unreachable!("handled before start-up"),
        }

        print_snapshot(&director.snapshot(), cli.json)
    })
}

fn print_banner(director: &Director) {
    let config = director.config();
    println!("=== {} v{} ===", config.project.name, config.project.version);
    println!(
        "Agents: {}  Helpers: {}",
        director.registry().agent_count(),
        director.registry().helper_count()
    );
    println!();
}

fn print_phases(director: &Director) {
    for phase in Phase::ALL {
        println!("{} ({})", phase, phase.title());
        match director.table().tasks(phase) {
            Ok(tasks) => {
                for (i, task) in tasks.iter().enumerate() {
                    println!("  {}. [{}] {}", i + 1, task.role, task);
                }
            }
            Err(e) => println!("  {}", e),
        }
    }
}

fn print_snapshot(snapshot: &SystemSnapshot, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
        return Ok(());
    }

    println!();
    println!("Active agents:         {}", snapshot.active_agents);
    println!("Total tasks completed: {}", snapshot.total_tasks_completed);
    if !snapshot.phase_progress.is_empty() {
        println!("Phase progress:");
        for (phase, pct) in &snapshot.phase_progress {
            println!("  {:<13} {:>5.1}%", phase.as_str(), pct);
        }
    }
    println!("Agents:");
    for status in snapshot.agent_status.values() {
        println!(
            "  {:<18} tasks={:<3} performance={:.2}",
            status.name, status.tasks_completed, status.performance
        );
    }
    Ok(())
}
