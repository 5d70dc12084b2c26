//! Headless duel runner.
//!
//! This binary runs battles without any presentation layer, controlled via
//! JSON on stdin/stdout or via scenario files.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode - read commands from stdin
//! cargo run -p duel_headless
//!
//! # Interactive mode with the opening state of a scenario
//! cargo run -p duel_headless -- serve --scenario scenarios/far_start.ron
//!
//! # Play a scripted scenario, streaming events
//! cargo run -p duel_headless -- run --scenario scenarios/guard_and_strike.ron --events
//!
//! # Run a batch for balance testing
//! cargo run -p duel_headless -- batch scenarios/*.ron --repeats 10 --output results/
//!
//! # Verify determinism
//! cargo run -p duel_headless -- verify --scenario scenarios/passive.ron --runs 10
//! ```
//!
//! # Protocol
//!
//! Input (stdin): JSON commands, one per line
//! Output (stdout): JSON responses, one per line
//! Logs (stderr): Debug information

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use duel_core::data::SkillCatalog;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use duel_headless::{
    batch::{run_batch, verify_determinism, BatchConfig},
    game_runner::{run_scenario, JsonEventWriter},
    runner::{HeadlessConfig, HeadlessRunner},
    scenario::{default_catalog_path, Scenario},
};

#[derive(Parser)]
#[command(name = "duel_headless")]
#[command(about = "Headless duel runner for controller testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Skill catalog (defaults to assets/data/skills.ron)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive session over stdin/stdout
    Serve {
        /// Scenario file providing the opening state and engine tuning
        #[arg(short, long)]
        scenario: Option<PathBuf>,
    },

    /// Play a scripted scenario and print its metrics
    Run {
        /// Scenario file to play
        #[arg(short, long)]
        scenario: PathBuf,

        /// Stream battle events as JSON lines before the metrics
        #[arg(long)]
        events: bool,
    },

    /// Run many scenarios for balance testing
    Batch {
        /// Scenario files
        #[arg(required = true)]
        scenarios: Vec<PathBuf>,

        /// Times each scenario is played
        #[arg(short, long, default_value = "1")]
        repeats: u32,

        /// Maximum parallel battles (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,
    },

    /// Verify determinism by playing the same scenario multiple times
    Verify {
        /// Scenario to test
        #[arg(short, long)]
        scenario: PathBuf,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    let catalog = load_catalog(cli.catalog);

    match cli.command {
        Some(Commands::Serve { scenario }) => cmd_serve(catalog, scenario),
        Some(Commands::Run { scenario, events }) => cmd_run(&catalog, &scenario, events),
        Some(Commands::Batch {
            scenarios,
            repeats,
            parallel,
            output,
        }) => cmd_batch(&catalog, scenarios, repeats, parallel, output),
        Some(Commands::Verify { scenario, runs }) => cmd_verify(&catalog, &scenario, runs),
        None => cmd_serve(catalog, None),
    }
}

fn fatal(message: impl std::fmt::Display) -> ! {
    tracing::error!("{message}");
    eprintln!("FATAL: {message}");
    std::process::exit(1);
}

fn load_scenario(path: &Path) -> Scenario {
    Scenario::load(path)
        .unwrap_or_else(|e| fatal(format!("Cannot load '{}': {e}", path.display())))
}

/// Load the skill catalog, reporting authoring problems.
fn load_catalog(path: Option<PathBuf>) -> SkillCatalog {
    let Some(path) = path.or_else(default_catalog_path) else {
        fatal("No skill catalog found; pass --catalog or set DUEL_SKILL_CATALOG");
    };

    let catalog = SkillCatalog::load(&path)
        .unwrap_or_else(|e| fatal(format!("Cannot load catalog: {e}")));
    for problem in catalog.validate() {
        tracing::warn!(path = %path.display(), "{problem}");
    }
    catalog
}

/// Run an interactive session
fn cmd_serve(catalog: SkillCatalog, scenario: Option<PathBuf>) {
    let config = scenario.map_or_else(HeadlessConfig::default, |path| {
        let scenario = load_scenario(&path);
        HeadlessConfig {
            setup: scenario.setup,
            engine: scenario.engine,
        }
    });

    tracing::info!("Starting interactive session");
    if let Err(e) = HeadlessRunner::new(catalog, config).run() {
        fatal(format!("Session failed: {e}"));
    }
}

/// Play one scenario
fn cmd_run(catalog: &SkillCatalog, path: &Path, events: bool) {
    let scenario = load_scenario(path);

    let mut writer = JsonEventWriter::new(std::io::stdout());
    let result = if events {
        run_scenario(&scenario, catalog, &mut [&mut writer])
    } else {
        run_scenario(&scenario, catalog, &mut [])
    };
    let metrics = result.unwrap_or_else(|e| fatal(e));

    match serde_json::to_string_pretty(&metrics) {
        Ok(json) => println!("{json}"),
        Err(e) => fatal(format!("Failed to serialize metrics: {e}")),
    }
}

/// Run a batch of scenarios
fn cmd_batch(
    catalog: &SkillCatalog,
    scenarios: Vec<PathBuf>,
    repeats: u32,
    parallel: u32,
    output: PathBuf,
) {
    let config = BatchConfig {
        parallel,
        ..BatchConfig::new(scenarios)
            .with_repeats(repeats)
            .with_output(output)
    };
    let results_path = config.results_path();

    let results = run_batch(config, catalog);
    if let Err(e) = results.save(&results_path) {
        fatal(format!("Failed to save results: {e}"));
    }

    // Print summary
    let summary = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Battles played: {}", summary.total_battles);
    if !results.errors.is_empty() {
        eprintln!("Battles failed: {}", results.errors.len());
    }
    eprintln!(
        "Victories: {}  Defeats: {}  Unfinished: {}",
        summary.victories, summary.defeats, summary.unfinished
    );
    eprintln!("Win rate: {:.1}%", summary.win_rate * 100.0);
    eprintln!(
        "Actions: avg {:.1}, min {}, max {}",
        summary.avg_actions, summary.min_actions, summary.max_actions
    );
    for (reason, count) in &summary.rejections {
        eprintln!("Rejected ({reason}): {count}");
    }
    eprintln!("Results saved to: {}", results_path.display());
}

/// Verify determinism
fn cmd_verify(catalog: &SkillCatalog, path: &Path, runs: u32) {
    let scenario = load_scenario(path);
    tracing::info!(scenario = %scenario.name, runs, "Verifying determinism");

    match verify_determinism(&scenario, catalog, runs) {
        Ok(true) => println!("PASS: {} runs of '{}' were identical", runs, scenario.name),
        Ok(false) => {
            println!("FAIL: '{}' diverged between runs", scenario.name);
            std::process::exit(1);
        }
        Err(e) => fatal(e),
    }
}
