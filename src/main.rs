//! Kiosk Simulator
//!
//! Runs the kiosk control core against simulated peripherals: a terminal
//! display, scripted touch and card input, and a canned backend.
//!
//! # Usage
//!
//! ```bash
//! # Run the bundled help-request session on virtual time
//! kiosk-sim run
//!
//! # Run a scripted session, echoing every draw call, at wall-clock speed
//! kiosk-sim run --scenario scenarios/offline.toml --echo --realtime
//!
//! # List the startup phases
//! kiosk-sim phases
//!
//! # Print the effective configuration
//! kiosk-sim -c kiosk.toml config
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use kiosk_core::config::KioskConfig;
use kiosk_core::init::InitPhase;
use kiosk_core::kiosk::Kiosk;
use kiosk_core::sim::scenario::{summarize, RunSummary};
use kiosk_core::sim::Scenario;

/// Kiosk Simulator
///
/// Drives the kiosk core with scripted touch, card and network input
#[derive(Parser)]
#[command(name = "kiosk-sim")]
#[command(author = "Prasanna Gautam")]
#[command(version = "0.1.0")]
#[command(about = "Simulator for the touch + NFC help-request kiosk")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Kiosk configuration file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted session
    Run {
        /// Scenario file (default: built-in help request)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Pace ticks at wall-clock speed instead of virtual time
        #[arg(long)]
        realtime: bool,

        /// Print every draw call
        #[arg(long)]
        echo: bool,
    },

    /// List startup phases
    Phases,

    /// Print the effective configuration as TOML
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            scenario,
            realtime,
            echo,
        } => handle_run(config, scenario, realtime, echo).await,
        Commands::Phases => {
            print_phases();
            Ok(())
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<KioskConfig> {
    match path {
        Some(path) => {
            let config = KioskConfig::load(path)?;
            log::info!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        None => Ok(KioskConfig::default()),
    }
}

async fn handle_run(config: KioskConfig, scenario: Option<PathBuf>, realtime: bool, echo: bool) -> Result<()> {
    let scenario = match scenario {
        Some(path) => Scenario::load(&path)?,
        None => Scenario::demo()?,
    };

    println!("{}", "=".repeat(60));
    println!("{}", format!("Scenario: {}", scenario.name).cyan().bold());
    println!("{}", "=".repeat(60));
    println!(
        "  {} touch step(s), {} card step(s), {} HTTP route(s), {} ms",
        scenario.touch.len(),
        scenario.card.len(),
        scenario.http.len(),
        scenario.duration_ms
    );

    let summary = if realtime {
        run_realtime(&scenario, config, echo).await?
    } else {
        scenario.run(config, echo)?
    };

    print_summary(&summary);

    let problems = scenario.verify(&summary);
    if problems.is_empty() {
        println!("\n{} All expectations met", "[OK]".green().bold());
        Ok(())
    } else {
        for problem in &problems {
            eprintln!("{} {}", "[FAIL]".red().bold(), problem);
        }
        anyhow::bail!("{} expectation(s) not met", problems.len())
    }
}

/// Same loop as [`Scenario::run`], paced by a tokio interval
async fn run_realtime(scenario: &Scenario, config: KioskConfig, echo: bool) -> Result<RunSummary> {
    let tick_ms = config.timing.tick_interval_ms;
    let platform = scenario.build_platform(&config, echo)?;
    let display = platform.display_log();
    let requests = platform.request_log();
    let mut kiosk = Kiosk::new(config, Box::new(platform));

    let mut interval = tokio::time::interval(Duration::from_millis(tick_ms));
    let mut now = 0;
    let mut ticks = 0;
    while now <= scenario.duration_ms {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                println!("\n{} Interrupted at {} ms", "[*]".yellow().bold(), now);
                break;
            }
        }
        kiosk.tick(now);
        now += tick_ms;
        ticks += 1;
    }
    Ok(summarize(&kiosk, ticks, &display, &requests))
}

fn print_summary(summary: &RunSummary) {
    println!("\n{}", "Result:".white().bold());
    println!("  Ticks: {}", summary.ticks);
    println!("  Startup phase: {}", summary.phase);
    if let Some(failure) = &summary.failure {
        println!("  Failure: {}", failure.red());
    }
    println!(
        "  Active screen: {}",
        summary.active_screen.as_deref().unwrap_or("(none)").white()
    );
    println!("  Frames drawn: {}", summary.frames);
    println!("  Reports posted: {}", summary.reports_posted);
    if summary.restart_requested {
        println!("  {}", "Restart requested".yellow());
    }
}

fn print_phases() {
    println!("{}", "=".repeat(60));
    println!("{}", "Startup Phases".cyan().bold());
    println!("{}", "=".repeat(60));
    for phase in InitPhase::ALL {
        let kind = if phase.is_critical() {
            "[critical]".red()
        } else {
            "[optional]".dimmed()
        };
        println!("  {} {}", kind, phase.name());
    }
}
