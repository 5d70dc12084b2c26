//! Duel - Development Tools

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use duel_core::config::EngineConfig;
use duel_core::data::SkillCatalog;
use duel_tools::{migrate, preview, validate, ToolError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "duel-tools")]
#[command(about = "Development tools for duel battle data")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate data files
    Validate {
        /// Path to data directory
        #[arg(default_value = "assets/data")]
        path: PathBuf,
    },

    /// Migrate legacy skill records and rewrite the catalog
    Migrate {
        /// Catalog to migrate
        #[arg(default_value = "assets/data/skills.ron")]
        input: PathBuf,

        /// Write here instead of overwriting the input
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Print effect and damage per distance
    Preview {
        /// Skill catalog
        #[arg(short, long, default_value = "assets/data/skills.ron")]
        catalog: PathBuf,

        /// Only this skill
        #[arg(short, long)]
        skill: Option<String>,

        /// Engine tuning file
        #[arg(short, long)]
        engine: Option<PathBuf>,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { path } => run_validate(&path),
        Commands::Migrate {
            input,
            output,
            dry_run,
        } => run_migrate(&input, output.as_deref(), dry_run),
        Commands::Preview {
            catalog,
            skill,
            engine,
        } => run_preview(&catalog, skill.as_deref(), engine.as_deref()),
    };

    if let Err(e) = result {
        if let ToolError::Invalid(problems) = &e {
            for problem in problems {
                tracing::error!("{problem}");
            }
        }
        tracing::error!("Failed: {e}");
        std::process::exit(1);
    }
}

fn run_validate(path: &Path) -> Result<(), ToolError> {
    tracing::info!("Validating data files in: {}", path.display());
    let report = validate::validate_data_directory(path)?;
    if !report.legacy_records.is_empty() {
        tracing::warn!(
            "{} skill(s) need migration: {}",
            report.legacy_records.len(),
            report.legacy_records.join(", ")
        );
    }
    if report.is_ok() {
        tracing::info!(files = report.files_checked, "Validation passed");
        Ok(())
    } else {
        Err(ToolError::Invalid(report.problems))
    }
}

fn run_migrate(
    input: &Path,
    output: Option<&Path>,
    dry_run: bool,
) -> Result<(), ToolError> {
    let summary = migrate::migrate_catalog_file(input, output, dry_run)?;
    if summary.migrated.is_empty() {
        tracing::info!(skills = summary.total, "Nothing to migrate");
    } else {
        tracing::info!(
            skills = summary.total,
            "Migrated: {}",
            summary.migrated.join(", ")
        );
    }
    if dry_run {
        tracing::info!("Dry run, nothing written");
    }
    Ok(())
}

fn run_preview(
    catalog: &Path,
    skill: Option<&str>,
    engine: Option<&Path>,
) -> Result<(), ToolError> {
    let catalog = SkillCatalog::load(catalog)?;
    let config = match engine {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let tables = preview::catalog_tables(&catalog, skill, config, preview::DEFAULT_DISTANCES)?;
    print!("{}", preview::render(&tables));
    Ok(())
}
