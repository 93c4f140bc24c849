//! Herd immunity test: the same disease simulated across a range of
//! vaccination rates, plus runs of the populations named in the scenario.

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::thread;

use super::engine::simulate_population;
use super::types::{DayRecord, Disease, Population, SimulationError, StatusCounts};
use crate::common::config::{HerdImmunityConfig, PopulationConfig};

/// Outcome of one run of the herd immunity sweep.
#[derive(Debug, Clone)]
pub struct SweepPoint {
    pub vaccination_rate: f64,
    pub progression: Vec<DayRecord>,
    pub final_counts: StatusCounts,
}

impl SweepPoint {
    /// Vaccination rate as a whole percentage (e.g. `0.5` -> `50`).
    pub fn percent(&self) -> u32 {
        rate_percent(self.vaccination_rate)
    }
}

/// Outcome of simulating one configured population.
#[derive(Debug, Clone)]
pub struct PopulationReport {
    pub name: String,
    pub progression: Vec<DayRecord>,
    pub final_counts: StatusCounts,
}

/// Finest sweep whose rates all map to distinct whole percentages.
pub const MAX_RATE_STEPS: u32 = 100;

pub fn rate_percent(rate: f64) -> u32 {
    (rate * 100.0).round() as u32
}

/// Vaccination rates visited by the sweep: `0/steps, 1/steps, ..., steps/steps`.
pub fn sweep_rates(steps: u32) -> Vec<f64> {
    (0..=steps).map(|i| i as f64 / steps as f64).collect()
}

/// The sweep rate written under the same whole percent as `rate`, if any.
///
/// Output files are named by percent, so this is the rate whose progression
/// file a `rate` refers to.
pub fn matching_sweep_rate(rate: f64, steps: u32) -> Option<f64> {
    let percent = rate_percent(rate);
    sweep_rates(steps).into_iter().find(|r| rate_percent(*r) == percent)
}

/// The sweep rate closest to `rate`.
pub fn nearest_sweep_rate(rate: f64, steps: u32) -> f64 {
    let steps = steps.max(1) as f64;
    (rate * steps).round().clamp(0.0, steps) / steps
}

fn make_rng(seed: Option<u64>, offset: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(offset)),
        None => StdRng::from_entropy(),
    }
}

/// Run the herd immunity sweep.
///
/// Every vaccination rate is simulated on its own worker thread. With a
/// `seed`, run `i` uses `seed + i`, so results do not depend on scheduling.
///
/// # Returns
///
/// One `SweepPoint` per rate, ordered by increasing vaccination rate.
pub fn run_herd_immunity_test(disease: &Disease, sweep: &HerdImmunityConfig, seed: Option<u64>) -> Result<Vec<SweepPoint>, SimulationError> {
    if sweep.rate_steps == 0 {
        return Err(SimulationError::InvalidSweep("rate_steps must be at least 1".to_string()));
    }
    if sweep.rate_steps > MAX_RATE_STEPS {
        return Err(SimulationError::InvalidSweep(format!(
            "rate_steps {} exceeds {}, rates would share output files",
            sweep.rate_steps, MAX_RATE_STEPS
        )));
    }

    let rates = sweep_rates(sweep.rate_steps);
    log::info!(
        "Running herd immunity test: {} rates, population size {}",
        rates.len(),
        sweep.population_size
    );

    thread::scope(|scope| -> Result<Vec<SweepPoint>, SimulationError> {
        let mut handles = Vec::with_capacity(rates.len());
        for (i, &rate) in rates.iter().enumerate() {
            let handle = thread::Builder::new()
                .name(format!("sweep-{}", rate_percent(rate)))
                .spawn_scoped(scope, move || -> Result<SweepPoint, SimulationError> {
                    let mut rng = make_rng(seed, i as u64);
                    let mut population = Population::new("TestPopulation", sweep.population_size, rate, sweep.patient_zero, &mut rng)?;
                    let progression = simulate_population(&mut population, disease, &mut rng);
                    let final_counts = population.counts();
                    log::debug!("Rate {}%: {:?}", rate_percent(rate), final_counts);
                    Ok(SweepPoint {
                        vaccination_rate: rate,
                        progression,
                        final_counts,
                    })
                })
                .map_err(|e| SimulationError::WorkerFailed(e.to_string()))?;
            handles.push(handle);
        }

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| SimulationError::WorkerFailed("sweep thread panicked".to_string()))
                    .and_then(|result| result)
            })
            .collect()
    })
}

/// Simulate every population listed in the scenario, one after another.
pub fn run_populations(disease: &Disease, populations: &[PopulationConfig], seed: Option<u64>) -> Result<Vec<PopulationReport>, SimulationError> {
    let mut reports = Vec::with_capacity(populations.len());
    // Offset keeps population seeds apart from the sweep's seeds
    let mut rng = make_rng(seed, 1_000_000);

    for config in populations {
        let mut population = Population::new(config.name.as_str(), config.size, config.vaccination_rate, config.patient_zero, &mut rng)?;
        log::info!(
            "Loaded population {} with size {}, vaccination rate {}, patient zero {}",
            config.name,
            config.size,
            config.vaccination_rate,
            config.patient_zero
        );

        let progression = simulate_population(&mut population, disease, &mut rng);
        let final_counts = population.counts();
        log::info!(
            "Results for {}: Susceptible: {}, Infectious: {}, Recovered: {}, Vaccinated: {}",
            config.name,
            final_counts.susceptible,
            final_counts.infectious,
            final_counts.recovered,
            final_counts.vaccinated
        );

        reports.push(PopulationReport {
            name: config.name.clone(),
            progression,
            final_counts,
        });
    }

    Ok(reports)
}
