//! Scenario configuration loading, parsing, and validation.
//!
//! A scenario is a TOML file describing the disease, the populations to
//! simulate, the herd immunity sweep and where output files go. Every field
//! has a default, so an empty file is a valid scenario.

use anyhow::Context;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::plot::DiseaseParams;
use crate::simulation::output::population_file_name;
use crate::simulation::sweep::MAX_RATE_STEPS;
use crate::simulation::{Disease, SimulationError};

/// Error type for scenario loading failures.
#[derive(Debug)]
pub enum ConfigLoadError {
    FileReadError(String),
    ParseError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigLoadError::FileReadError(msg) => write!(f, "Failed to read file: {}", msg),
            ConfigLoadError::ParseError(msg) => write!(f, "Failed to parse TOML: {}", msg),
            ConfigLoadError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigLoadError {}

/// Disease characteristics.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DiseaseConfig {
    pub name: String,
    /// Probability that one contact infects a susceptible person (β).
    pub transmissibility: f64,
    /// Days a person stays infectious (D).
    pub duration: u32,
    /// Random contacts per infectious person per day (C).
    pub contacts_per_day: u32,
}

impl Default for DiseaseConfig {
    fn default() -> Self {
        Self {
            name: "Unknown".to_string(),
            transmissibility: 0.4,
            duration: 3,
            contacts_per_day: 6,
        }
    }
}

impl DiseaseConfig {
    pub fn to_disease(&self) -> Result<Disease, SimulationError> {
        Disease::new(self.name.as_str(), self.transmissibility, self.duration, self.contacts_per_day)
    }

    /// Parameters shown in chart titles.
    pub fn params(&self) -> DiseaseParams {
        DiseaseParams {
            duration: self.duration,
            contacts_per_day: self.contacts_per_day,
            transmissibility: self.transmissibility,
        }
    }
}

/// A named population simulated on its own.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub name: String,
    pub size: usize,
    pub vaccination_rate: f64,
    pub patient_zero: bool,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            name: "Unknown".to_string(),
            size: 1000,
            vaccination_rate: 0.0,
            patient_zero: false,
        }
    }
}

/// Herd immunity sweep settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HerdImmunityConfig {
    /// Size of the population built for every sweep rate.
    pub population_size: usize,
    /// Number of equal steps between 0% and 100% vaccination.
    pub rate_steps: u32,
    pub patient_zero: bool,
}

impl Default for HerdImmunityConfig {
    fn default() -> Self {
        Self {
            population_size: 15000,
            rate_steps: 10,
            patient_zero: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { directory: PathBuf::from(".") }
    }
}

/// Root structure representing an entire scenario.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Fixed random seed; runs are not reproducible without one.
    pub seed: Option<u64>,
    pub disease: DiseaseConfig,
    #[serde(rename = "population")]
    pub populations: Vec<PopulationConfig>,
    pub herd_immunity: HerdImmunityConfig,
    pub output: OutputConfig,
}

/// Load, parse and validate a scenario file.
///
/// # Parameters
///
/// * `path` - Path to the scenario TOML file
///
/// # Returns
///
/// Parsed and validated ScenarioConfig or an error.
pub fn load_config(path: &Path) -> Result<ScenarioConfig, ConfigLoadError> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))
        .map_err(|e| ConfigLoadError::FileReadError(format!("{:#}", e)))?;

    let config = parse_config(&data)?;
    log::info!("Loaded scenario file {} successfully.", path.display());
    log::info!(
        "Disease parameters: Name = {}, Transmissibility = {}, Duration = {}, Contacts = {}",
        config.disease.name,
        config.disease.transmissibility,
        config.disease.duration,
        config.disease.contacts_per_day
    );
    log::info!("Number of populations: {}", config.populations.len());
    Ok(config)
}

/// Parse and validate scenario text.
pub fn parse_config(data: &str) -> Result<ScenarioConfig, ConfigLoadError> {
    let config: ScenarioConfig = toml::from_str(data).map_err(|e| ConfigLoadError::ParseError(e.to_string()))?;
    validate_config(&config).map_err(ConfigLoadError::ValidationError)?;
    Ok(config)
}

fn is_probability(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

/// Validate a scenario.
///
/// # Returns
///
/// `Ok(())` if validation passes, `Err(String)` with error description otherwise.
pub fn validate_config(config: &ScenarioConfig) -> Result<(), String> {
    if !is_probability(config.disease.transmissibility) {
        return Err(format!(
            "Disease transmissibility {} must be between 0 and 1",
            config.disease.transmissibility
        ));
    }

    let mut names = HashSet::new();
    let mut file_names: HashMap<String, &str> = HashMap::new();
    for population in &config.populations {
        if !names.insert(population.name.as_str()) {
            return Err(format!("Duplicate population name found: {}", population.name));
        }
        // Distinct names may still share an output file
        if let Some(other) = file_names.insert(population_file_name(&population.name), population.name.as_str()) {
            return Err(format!(
                "Populations {} and {} would both write {}",
                other,
                population.name,
                population_file_name(&population.name)
            ));
        }
        if !is_probability(population.vaccination_rate) {
            return Err(format!(
                "Population {} vaccination_rate {} must be between 0 and 1",
                population.name, population.vaccination_rate
            ));
        }
    }

    if config.herd_immunity.rate_steps == 0 {
        return Err("herd_immunity.rate_steps must be at least 1".to_string());
    }
    if config.herd_immunity.rate_steps > MAX_RATE_STEPS {
        return Err(format!(
            "herd_immunity.rate_steps {} must not exceed {}",
            config.herd_immunity.rate_steps, MAX_RATE_STEPS
        ));
    }
    if config.herd_immunity.population_size == 0 {
        return Err("herd_immunity.population_size must be at least 1".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
seed = 42

[disease]
name = "Corona"
transmissibility = 0.4
duration = 3

[[population]]
name = "TestPop1"
size = 1000
vaccination_rate = 0.5
patient_zero = true

[[population]]
name = "TestPop2"
vaccination_rate = 0.3

[herd_immunity]
population_size = 2000

[output]
directory = "out"
"#;

    #[test]
    fn parses_full_scenario_with_defaults_filled_in() {
        let config = parse_config(SCENARIO).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.disease.name, "Corona");
        assert_eq!(config.disease.contacts_per_day, 6);
        assert_eq!(config.populations.len(), 2);
        assert_eq!(config.populations[1].size, 1000);
        assert!(!config.populations[1].patient_zero);
        assert_eq!(config.herd_immunity.population_size, 2000);
        assert_eq!(config.herd_immunity.rate_steps, 10);
        assert_eq!(config.output.directory, PathBuf::from("out"));
    }

    #[test]
    fn empty_scenario_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, ScenarioConfig::default());
        assert_eq!(config.disease.name, "Unknown");
        assert_eq!(config.disease.transmissibility, 0.4);
        assert_eq!(config.disease.duration, 3);
        assert!(config.populations.is_empty());
        assert_eq!(config.herd_immunity.population_size, 15000);
    }

    #[test]
    fn rejects_out_of_range_transmissibility() {
        let err = parse_config("[disease]\ntransmissibility = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::ValidationError(_)));
    }

    #[test]
    fn rejects_out_of_range_vaccination_rate() {
        let err = parse_config("[[population]]\nname = \"A\"\nvaccination_rate = -0.1\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::ValidationError(_)));
    }

    #[test]
    fn rejects_duplicate_population_names() {
        let err = parse_config("[[population]]\nname = \"A\"\n[[population]]\nname = \"A\"\n").unwrap_err();
        match err {
            ConfigLoadError::ValidationError(msg) => assert!(msg.contains("Duplicate")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn rejects_zero_rate_steps() {
        assert!(parse_config("[herd_immunity]\nrate_steps = 0\n").is_err());
    }

    #[test]
    fn rejects_populations_sharing_an_output_file() {
        let err = parse_config("[[population]]\nname = \"Town A\"\n[[population]]\nname = \"Town_A\"\n").unwrap_err();
        match err {
            ConfigLoadError::ValidationError(msg) => {
                assert_eq!(msg, "Populations Town A and Town_A would both write population_town_a.csv")
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(parse_config("[[population]]\nname = \"Town A\"\n[[population]]\nname = \"Town B\"\n").is_ok());
    }

    #[test]
    fn rejects_sweeps_finer_than_whole_percent() {
        assert!(parse_config("[herd_immunity]\nrate_steps = 100\n").is_ok());
        let err = parse_config("[herd_immunity]\nrate_steps = 200\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::ValidationError(_)));
    }

    #[test]
    fn reports_parse_errors() {
        let err = parse_config("[disease\nname = 1").unwrap_err();
        assert!(matches!(err, ConfigLoadError::ParseError(_)));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigLoadError::FileReadError(_)));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.toml");
        fs::write(&path, SCENARIO).unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.populations[0].name, "TestPop1");
        let disease = config.disease.to_disease().unwrap();
        assert_eq!(disease.transmissibility, 0.4);
    }

    #[test]
    fn bundled_scenario_is_valid() {
        let config = parse_config(include_str!("../../scenarios/corona.toml")).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.disease.name, "Corona");
        assert_eq!(config.populations.len(), 2);
        assert!(!config.populations[1].patient_zero);
        assert_eq!(config.output.directory, PathBuf::from("results"));
    }
}
