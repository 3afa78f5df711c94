//! Cortex CLI
//!
//! Run and inspect Cortex inference graphs.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod demo;
mod doctor;

use config::CortexConfig;

#[derive(Parser)]
#[command(name = "cortex")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Cortex reactive inference runtime CLI", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project directory (looks for cortex.toml here)
    #[arg(long, global = true, default_value = ".")]
    project: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the built-in coin-bias demo graph to a fixed point
    Run {
        /// Comma-separated true/false observations, e.g. "true,false,true"
        #[arg(short, long, default_value = "true,true,false,true")]
        observations: String,
    },

    /// Show toolchain and project information
    Info,

    /// Check the local Cortex project setup
    Doctor,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Run { observations } => cmd_run(&cli.project, &observations),
        Commands::Info => cmd_info(&cli.project),
        Commands::Doctor => cmd_doctor(),
    }
}

fn cmd_run(project: &str, observations: &str) -> Result<()> {
    let config = CortexConfig::load_from_dir(&PathBuf::from(project))?;

    let parsed: Vec<bool> = observations
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| match s {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => anyhow::bail!("invalid observation '{other}', expected true/false"),
        })
        .collect::<Result<_>>()?;

    info!(
        "Running {} with {} observation(s), max_rounds={}",
        config.project.name,
        parsed.len(),
        config.inference.max_rounds
    );

    let (engine, p) = demo::run_coin_bias(&parsed, config.inference.max_rounds, config.inference.trace)?;

    let (alpha, beta) = engine.get_marginal(p)?.as_beta().unwrap_or((0.0, 0.0));
    println!("posterior: Beta(alpha={alpha}, beta={beta})");

    if config.inference.trace {
        print!("{}", engine.tracer().dump());
    }

    Ok(())
}

fn cmd_info(project: &str) -> Result<()> {
    let config = CortexConfig::load_from_dir(&PathBuf::from(project))?;
    println!("cortex {}", env!("CARGO_PKG_VERSION"));
    println!("project: {}", config.project.name);
    println!("max_rounds: {}", config.inference.max_rounds);
    println!("trace: {}", config.inference.trace);
    Ok(())
}

fn cmd_doctor() -> Result<()> {
    let categories = doctor::run_doctor();
    for cat in &categories {
        println!("{} {}", cat.colored_icon(), cat.name);
        for check in &cat.checks {
            println!("  {} {}: {}", check.colored_icon(), check.name, check.message);
            if let Some(hint) = &check.hint {
                println!("      hint: {hint}");
            }
        }
    }
    Ok(())
}
