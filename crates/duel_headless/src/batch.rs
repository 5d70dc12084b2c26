//! Batch scenario runner for balance testing.
//!
//! Runs many scenario files in parallel using rayon and aggregates their
//! metrics into one [`BatchSummary`].

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use duel_core::data::SkillCatalog;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::game_runner::run_scenario;
use crate::metrics::{BatchSummary, BattleMetrics};
use crate::protocol::BattleStatus;
use crate::scenario::{Scenario, ScenarioError};

/// Configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Scenario files to run
    pub scenarios: Vec<PathBuf>,
    /// Times each scenario is played
    pub repeats: u32,
    /// Maximum parallel battles (0 = use rayon default)
    pub parallel: u32,
    /// Output directory for results
    pub output_dir: PathBuf,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            scenarios: Vec::new(),
            repeats: 1,
            parallel: 0,
            output_dir: PathBuf::from("results"),
        }
    }
}

impl BatchConfig {
    /// Create config for a set of scenario files
    pub fn new(scenarios: Vec<PathBuf>) -> Self {
        Self {
            scenarios,
            ..Default::default()
        }
    }

    /// Set how often each scenario runs
    pub fn with_repeats(mut self, repeats: u32) -> Self {
        self.repeats = repeats.max(1);
        self
    }

    /// Set output directory
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Where the results file is written.
    pub fn results_path(&self) -> PathBuf {
        self.output_dir.join("batch_results.json")
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Individual battle metrics
    pub battles: Vec<BattleMetrics>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
    /// Errors encountered
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Error during batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Job index
    pub index: u32,
    /// Scenario file
    pub scenario: String,
    /// Error message
    pub message: String,
}

/// Progress tracking for batch runs
#[derive(Debug)]
struct BatchProgress {
    total: u32,
    completed: AtomicU32,
    victories: AtomicU32,
}

impl BatchProgress {
    fn new(total: u32) -> Self {
        Self {
            total,
            completed: AtomicU32::new(0),
            victories: AtomicU32::new(0),
        }
    }

    fn record_completion(&self, metrics: &BattleMetrics) {
        let completed = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        if metrics.status == BattleStatus::Victory {
            self.victories.fetch_add(1, Ordering::Relaxed);
        }
        if completed % 10 == 0 || completed == self.total {
            debug!(
                completed,
                total = self.total,
                victories = self.victories.load(Ordering::Relaxed),
                "Batch progress"
            );
        }
    }
}

fn run_job(path: &Path, catalog: &SkillCatalog) -> Result<BattleMetrics, ScenarioError> {
    let scenario = Scenario::load(path)?;
    run_scenario(&scenario, catalog, &mut [])
}

/// Run every scenario `repeats` times.
pub fn run_batch(config: BatchConfig, catalog: &SkillCatalog) -> BatchResults {
    let start = Instant::now();
    let repeats = config.repeats.max(1);
    let jobs: Vec<(u32, &PathBuf)> = config
        .scenarios
        .iter()
        .flat_map(|path| std::iter::repeat(path).take(repeats as usize))
        .enumerate()
        .map(|(index, path)| (index as u32, path))
        .collect();
    let progress = BatchProgress::new(jobs.len() as u32);

    info!(
        scenarios = config.scenarios.len(),
        repeats,
        battles = jobs.len(),
        "Starting batch run"
    );

    // Configure thread pool if specified
    if config.parallel > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel as usize)
            .build_global()
            .ok(); // Ignore if already set
    }

    let results: Vec<Result<BattleMetrics, BatchError>> = jobs
        .par_iter()
        .map(|&(index, path)| match run_job(path, catalog) {
            Ok(metrics) => {
                progress.record_completion(&metrics);
                Ok(metrics)
            }
            Err(e) => {
                warn!(index, scenario = %path.display(), error = %e, "Battle failed");
                Err(BatchError {
                    index,
                    scenario: path.display().to_string(),
                    message: e.to_string(),
                })
            }
        })
        .collect();

    let (battles, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let battles: Vec<BattleMetrics> = battles.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_battles(&battles);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        battles = battles.len(),
        errors = errors.len(),
        win_rate = summary.win_rate,
        "Batch complete in {duration_seconds:.2}s"
    );

    BatchResults {
        config,
        battles,
        summary,
        duration_seconds,
        errors,
    }
}

/// Verify determinism by playing the same scenario several times.
///
/// Every run must produce identical metrics, final state hash included.
pub fn verify_determinism(
    scenario: &Scenario,
    catalog: &SkillCatalog,
    runs: u32,
) -> Result<bool, ScenarioError> {
    let first = run_scenario(scenario, catalog, &mut [])?;
    for run in 1..runs {
        let next = run_scenario(scenario, catalog, &mut [])?;
        if next != first {
            warn!(
                scenario = %scenario.name,
                run,
                expected = format!("{:016x}", first.final_state_hash),
                actual = format!("{:016x}", next.final_state_hash),
                "Scenario diverged"
            );
            return Ok(false);
        }
    }
    Ok(true)
}
