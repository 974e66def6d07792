//! Headless mode for automated runs
//!
//! Runs the full simulation without rendering, driven by a scripted
//! player policy, for balance analysis and regression testing. Seeded
//! runs are deterministic.

pub mod config;
pub mod runner;

pub use config::HeadlessRunConfig;
pub use runner::{run_headless, HeadlessRunState, RunResult};
