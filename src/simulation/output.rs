//! CSV output of simulation results.
//!
//! File layout written into the output directory:
//! - `disease_progression_{percent}.csv` for every sweep rate
//! - `herd_immunity_results.csv` with the final counts of every sweep rate
//! - `population_{slug}.csv` for every configured population

use anyhow::Context;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::sweep::{PopulationReport, SweepPoint, rate_percent};
use super::types::DayRecord;

pub const HERD_IMMUNITY_RESULTS_FILE: &str = "herd_immunity_results.csv";

/// One row of the herd immunity results file.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct HerdImmunityRow {
    /// Whole percent followed by `%`, e.g. `50%`.
    vaccination_rate: String,
    infected: usize,
    recovered: usize,
    susceptible: usize,
}

impl From<&SweepPoint> for HerdImmunityRow {
    fn from(point: &SweepPoint) -> Self {
        Self {
            vaccination_rate: format!("{}%", point.percent()),
            infected: point.final_counts.infectious,
            recovered: point.final_counts.recovered,
            susceptible: point.final_counts.susceptible,
        }
    }
}

/// File name of the progression CSV for a sweep rate.
pub fn progression_file_name(vaccination_rate: f64) -> String {
    format!("disease_progression_{}.csv", rate_percent(vaccination_rate))
}

/// File name of the progression CSV for a configured population.
pub fn population_file_name(name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("population_{}.csv", slug)
}

/// Write a day-by-day progression as `Day,Susceptible,Infectious,Recovered,Vaccinated`.
pub fn write_progression_csv(path: &Path, records: &[DayRecord]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("Failed to create {}", path.display()))?;
    if records.is_empty() {
        // serde only emits the header together with the first record
        writer.write_record(["Day", "Susceptible", "Infectious", "Recovered", "Vaccinated"])?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush().with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Write the final counts of every sweep run as
/// `VaccinationRate,Infected,Recovered,Susceptible`.
pub fn write_herd_immunity_csv(path: &Path, points: &[SweepPoint]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("Failed to create {}", path.display()))?;
    if points.is_empty() {
        writer.write_record(["VaccinationRate", "Infected", "Recovered", "Susceptible"])?;
    }
    for point in points {
        writer.serialize(HerdImmunityRow::from(point))?;
    }
    writer.flush().with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Write all sweep outputs into `dir`, creating it if necessary.
///
/// # Returns
///
/// Paths of the written files, progression files first and the results file last.
pub fn write_sweep(dir: &Path, points: &[SweepPoint]) -> anyhow::Result<Vec<PathBuf>> {
    let mut percents = HashSet::new();
    for point in points {
        if !percents.insert(point.percent()) {
            anyhow::bail!("Several sweep rates round to {}%", point.percent());
        }
    }

    fs::create_dir_all(dir).with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut written = Vec::with_capacity(points.len() + 1);
    for point in points {
        let path = dir.join(progression_file_name(point.vaccination_rate));
        write_progression_csv(&path, &point.progression)?;
        written.push(path);
    }

    let results_path = dir.join(HERD_IMMUNITY_RESULTS_FILE);
    write_herd_immunity_csv(&results_path, points)?;
    written.push(results_path);

    log::info!("Wrote {} sweep files to {}", written.len(), dir.display());
    Ok(written)
}

/// Write one progression file per configured population into `dir`.
pub fn write_population_reports(dir: &Path, reports: &[PopulationReport]) -> anyhow::Result<Vec<PathBuf>> {
    let mut file_names = HashSet::new();
    for report in reports {
        let file_name = population_file_name(&report.name);
        if !file_names.insert(file_name.clone()) {
            anyhow::bail!("Population {} would overwrite {}", report.name, file_name);
        }
    }

    fs::create_dir_all(dir).with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    reports
        .iter()
        .map(|report| -> anyhow::Result<PathBuf> {
            let path = dir.join(population_file_name(&report.name));
            write_progression_csv(&path, &report.progression)?;
            Ok(path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::types::StatusCounts;

    fn point(rate: f64, infectious: usize, recovered: usize, susceptible: usize) -> SweepPoint {
        let final_counts = StatusCounts {
            susceptible,
            infectious,
            recovered,
            vaccinated: 0,
        };
        SweepPoint {
            vaccination_rate: rate,
            progression: vec![DayRecord::new(0, final_counts)],
            final_counts,
        }
    }

    #[test]
    fn file_names_use_whole_percent() {
        assert_eq!(progression_file_name(0.5), "disease_progression_50.csv");
        assert_eq!(progression_file_name(0.0), "disease_progression_0.csv");
        assert_eq!(progression_file_name(0.3), "disease_progression_30.csv");
        assert_eq!(progression_file_name(1.0), "disease_progression_100.csv");
    }

    #[test]
    fn population_file_name_is_slugged() {
        assert_eq!(population_file_name("TestPop1"), "population_testpop1.csv");
        assert_eq!(population_file_name("North Side/2"), "population_north_side_2.csv");
    }

    #[test]
    fn progression_csv_has_expected_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.csv");
        let records = vec![
            DayRecord::new(
                0,
                StatusCounts {
                    susceptible: 9,
                    infectious: 1,
                    recovered: 0,
                    vaccinated: 0,
                },
            ),
            DayRecord::new(
                1,
                StatusCounts {
                    susceptible: 9,
                    infectious: 0,
                    recovered: 1,
                    vaccinated: 0,
                },
            ),
        ];
        write_progression_csv(&path, &records).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Day,Susceptible,Infectious,Recovered,Vaccinated\n0,9,1,0,0\n1,9,0,1,0\n");
    }

    #[test]
    fn empty_progression_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_progression_csv(&path, &[]).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Day,Susceptible,Infectious,Recovered,Vaccinated\n");
    }

    #[test]
    fn herd_immunity_csv_writes_percent_rates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(HERD_IMMUNITY_RESULTS_FILE);
        write_herd_immunity_csv(&path, &[point(0.0, 0, 90, 10), point(0.5, 0, 20, 30)]).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "VaccinationRate,Infected,Recovered,Susceptible");
        assert_eq!(lines[1], "0%,0,90,10");
        assert_eq!(lines[2], "50%,0,20,30");
    }

    #[test]
    fn write_sweep_creates_all_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");
        let written = write_sweep(&out, &[point(0.0, 0, 5, 5), point(1.0, 0, 0, 0)]).unwrap();
        assert_eq!(written.len(), 3);
        assert!(out.join("disease_progression_0.csv").exists());
        assert!(out.join("disease_progression_100.csv").exists());
        assert_eq!(written.last().unwrap(), &out.join(HERD_IMMUNITY_RESULTS_FILE));
    }

    #[test]
    fn sweep_rates_sharing_a_percent_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_sweep(dir.path(), &[point(0.5, 0, 1, 1), point(0.501, 0, 1, 1)]).unwrap_err();
        assert_eq!(err.to_string(), "Several sweep rates round to 50%");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn populations_sharing_a_file_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let report = |name: &str| PopulationReport {
            name: name.to_string(),
            progression: Vec::new(),
            final_counts: StatusCounts::default(),
        };

        let err = write_population_reports(dir.path(), &[report("Town A"), report("Town_A")]).unwrap_err();
        assert_eq!(err.to_string(), "Population Town_A would overwrite population_town_a.csv");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);

        let written = write_population_reports(dir.path(), &[report("Town A"), report("Town B")]).unwrap();
        assert_ne!(written[0], written[1]);
    }
}
