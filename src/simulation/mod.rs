//! Agent-based SIRV disease simulation.
//!
//! This module produces the CSV files consumed by the plotting and viewer
//! modules. It integrates:
//! - Population construction with random vaccination and patient zero seeding
//! - A day-by-day spread loop driven by transmissibility, duration and contacts
//! - A herd immunity sweep across vaccination rates running on worker threads
//! - CSV writers for per-day progressions and the sweep summary
//!
//! ## Module Organization
//!
//! - `types`: Core data structures (Status, Person, Disease, Population, counts)
//! - `engine`: The per-population spread loop
//! - `sweep`: Herd immunity test and configured population runs
//! - `output`: CSV writers and output file naming

pub mod engine;
pub mod output;
pub mod sweep;
pub mod types;

pub use sweep::{run_herd_immunity_test, run_populations};
pub use types::{Disease, SimulationError};
