//! Type definitions for the simulation.
//!
//! Contains the data structures shared by the engine and the CSV writers:
//! - Health status of a single person and the per-person state
//! - Disease characteristics (transmissibility, duration, contact rate)
//! - Populations, including vaccination and patient zero seeding
//! - Per-day status counts recorded while a population is simulated

use rand::Rng;
use rand::distributions::{Bernoulli, Distribution};
use serde::Serialize;

/// Health status of a single person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Susceptible,
    Infectious,
    Recovered,
    Vaccinated,
}

/// A single member of a population.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub status: Status,
    /// Days spent infectious so far; reset when the person becomes infected.
    pub days_infectious: u32,
}

impl Person {
    pub fn new(status: Status) -> Self {
        Self { status, days_infectious: 0 }
    }
}

/// Error type for invalid simulation inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    InvalidTransmissibility(f64),
    InvalidVaccinationRate(f64),
    InvalidSweep(String),
    WorkerFailed(String),
}

impl std::fmt::Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationError::InvalidTransmissibility(value) => {
                write!(f, "Transmissibility must be between 0 and 1, got {}", value)
            }
            SimulationError::InvalidVaccinationRate(value) => {
                write!(f, "Vaccination rate must be between 0 and 1, got {}", value)
            }
            SimulationError::InvalidSweep(msg) => write!(f, "Invalid herd immunity sweep: {}", msg),
            SimulationError::WorkerFailed(msg) => write!(f, "Simulation worker failed: {}", msg),
        }
    }
}

impl std::error::Error for SimulationError {}

/// Characteristics of the simulated disease.
#[derive(Debug, Clone)]
pub struct Disease {
    pub name: String,
    /// Probability that a contact with a susceptible person infects them.
    pub transmissibility: f64,
    /// Number of days a person stays infectious before recovering.
    pub duration: u32,
    /// Random contacts made by every infectious person per day.
    pub contacts_per_day: u32,
    infection: Bernoulli,
}

impl Disease {
    /// Create a disease, validating that `transmissibility` is a probability.
    pub fn new(name: impl Into<String>, transmissibility: f64, duration: u32, contacts_per_day: u32) -> Result<Self, SimulationError> {
        let infection = Bernoulli::new(transmissibility).map_err(|_| SimulationError::InvalidTransmissibility(transmissibility))?;
        Ok(Self {
            name: name.into(),
            transmissibility,
            duration,
            contacts_per_day,
            infection,
        })
    }

    /// Draw whether a single contact with a susceptible person transmits the disease.
    pub fn transmits<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        self.infection.sample(rng)
    }
}

/// A population of people exposed to the disease.
#[derive(Debug, Clone)]
pub struct Population {
    pub name: String,
    pub people: Vec<Person>,
    pub vaccination_rate: f64,
    pub patient_zero: bool,
}

impl Population {
    /// Build a population of `size` people.
    ///
    /// Every person is independently vaccinated with probability
    /// `vaccination_rate`, otherwise susceptible. With `patient_zero` the
    /// first susceptible person (by index) starts out infectious.
    ///
    /// # Parameters
    ///
    /// * `name` - Display name used in logs and output file names
    /// * `size` - Number of people
    /// * `vaccination_rate` - Probability in `[0, 1]` of a person being vaccinated
    /// * `patient_zero` - Whether to seed a single infection
    /// * `rng` - Random source for the vaccination draw
    pub fn new<R: Rng + ?Sized>(
        name: impl Into<String>,
        size: usize,
        vaccination_rate: f64,
        patient_zero: bool,
        rng: &mut R,
    ) -> Result<Self, SimulationError> {
        let vaccination = Bernoulli::new(vaccination_rate).map_err(|_| SimulationError::InvalidVaccinationRate(vaccination_rate))?;

        let mut people: Vec<Person> = (0..size)
            .map(|_| {
                if vaccination.sample(rng) {
                    Person::new(Status::Vaccinated)
                } else {
                    Person::new(Status::Susceptible)
                }
            })
            .collect();

        if patient_zero {
            if let Some(first) = people.iter_mut().find(|p| p.status == Status::Susceptible) {
                first.status = Status::Infectious;
            }
        }

        Ok(Self {
            name: name.into(),
            people,
            vaccination_rate,
            patient_zero,
        })
    }

    pub fn size(&self) -> usize {
        self.people.len()
    }

    /// Count people per status.
    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for person in &self.people {
            counts.add(person.status);
        }
        counts
    }
}

/// Number of people in each status at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub susceptible: usize,
    pub infectious: usize,
    pub recovered: usize,
    pub vaccinated: usize,
}

impl StatusCounts {
    pub fn add(&mut self, status: Status) {
        match status {
            Status::Susceptible => self.susceptible += 1,
            Status::Infectious => self.infectious += 1,
            Status::Recovered => self.recovered += 1,
            Status::Vaccinated => self.vaccinated += 1,
        }
    }
}

#[cfg(test)]
impl StatusCounts {
    pub fn total(&self) -> usize {
        self.susceptible + self.infectious + self.recovered + self.vaccinated
    }
}

/// Status counts recorded at the start of a simulated day.
///
/// Serializes to one row of the progression CSV
/// (`Day,Susceptible,Infectious,Recovered,Vaccinated`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DayRecord {
    pub day: u32,
    pub susceptible: usize,
    pub infectious: usize,
    pub recovered: usize,
    pub vaccinated: usize,
}

impl DayRecord {
    pub fn new(day: u32, counts: StatusCounts) -> Self {
        Self {
            day,
            susceptible: counts.susceptible,
            infectious: counts.infectious,
            recovered: counts.recovered,
            vaccinated: counts.vaccinated,
        }
    }
}

#[cfg(test)]
impl DayRecord {
    pub fn counts(&self) -> StatusCounts {
        StatusCounts {
            susceptible: self.susceptible,
            infectious: self.infectious,
            recovered: self.recovered,
            vaccinated: self.vaccinated,
        }
    }
}
