//! Headless duel runner for controller testing and CI verification.
//!
//! This crate drives the duel engine without any presentation layer:
//!
//! - **Interactive sessions**: a controller sends JSON commands on stdin and
//!   receives outcomes, previews and state snapshots on stdout
//! - **Scripted scenarios**: RON files fix the opening state and the player's
//!   skill sequence, producing [`BattleMetrics`]
//! - **Batch runs**: many scenarios in parallel for balance testing
//! - **Determinism checks**: identical scenarios must give identical hashes
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: Commands from controller (`use_skill`, `preview`, `query`, ...)
//! - **stdout**: Responses (JSON)
//! - **stderr**: Logs (human-readable)
//!
//! See [`protocol`] module for the full command/response format.
//!
//! # Example
//!
//! ```bash
//! # Interactive session
//! echo '{"cmd":"use_skill","skill":"slash"}' | cargo run -p duel_headless
//!
//! # Play a scenario
//! cargo run -p duel_headless -- run --scenario scenarios/guard_and_strike.ron
//!
//! # Verify determinism
//! cargo run -p duel_headless -- verify --scenario scenarios/far_start.ron --runs 10
//! ```

pub mod batch;
pub mod game_runner;
pub mod metrics;
pub mod protocol;
pub mod runner;
pub mod scenario;

pub use batch::{run_batch, verify_determinism, BatchConfig, BatchResults};
pub use game_runner::{run_scenario, JsonEventWriter};
pub use metrics::{BatchSummary, BattleMetrics};
pub use protocol::{Command, Response};
pub use runner::{HeadlessConfig, HeadlessRunner, HeadlessSession};
pub use scenario::{default_catalog_path, Scenario, ScenarioError};
