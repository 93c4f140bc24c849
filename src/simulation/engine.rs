//! Day-by-day disease spread within a single population.
//!
//! Each simulated day:
//! 1) Record the status counts for the day.
//! 2) Scan the population. Every infectious person advances one day; once
//!    `duration` is reached they recover, otherwise they make
//!    `contacts_per_day` random contacts and may infect susceptible ones.
//! 3) Apply the new infections collected during the scan.
//! 4) Stop after a day whose scan found nobody infectious.
//!
//! New infections only take effect after the scan, so a person infected
//! today cannot spread the disease until tomorrow.

use rand::Rng;

use super::types::{DayRecord, Disease, Population, Status};

/// Simulate the population until no infectious people remain.
///
/// # Parameters
///
/// * `population` - Population to mutate in place
/// * `disease` - Disease parameters driving recovery and transmission
/// * `rng` - Random source for contacts and transmission draws
///
/// # Returns
///
/// One record per simulated day. The last record always has zero infectious people.
pub fn simulate_population<R: Rng + ?Sized>(population: &mut Population, disease: &Disease, rng: &mut R) -> Vec<DayRecord> {
    let size = population.size();
    let mut records = Vec::new();
    let mut day: u32 = 0;

    loop {
        records.push(DayRecord::new(day, population.counts()));

        let mut has_infectious = false;
        let mut new_infections: Vec<usize> = Vec::new();

        for i in 0..size {
            if population.people[i].status != Status::Infectious {
                continue;
            }
            has_infectious = true;

            let person = &mut population.people[i];
            person.days_infectious += 1;
            if person.days_infectious >= disease.duration {
                person.status = Status::Recovered;
                continue;
            }

            for _ in 0..disease.contacts_per_day {
                let target = rng.gen_range(0..size);
                // Transmission is only drawn for susceptible contacts
                if population.people[target].status == Status::Susceptible && disease.transmits(rng) {
                    new_infections.push(target);
                }
            }
        }

        for index in new_infections {
            let person = &mut population.people[index];
            person.status = Status::Infectious;
            person.days_infectious = 0;
        }

        day += 1;

        if !has_infectious {
            break;
        }
    }

    log::info!("Simulation completed for {} in {} days.", population.name, day);
    records
}
