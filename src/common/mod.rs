//! Code shared by the simulation, plotting and viewer modes.

pub mod config;

pub use config::{ScenarioConfig, load_config};
