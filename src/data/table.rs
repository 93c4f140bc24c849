//! Numeric CSV tables.
//!
//! The first CSV row names the columns; every other cell must be a number.
//! A trailing `%` is accepted and dropped, so `50%` reads as `50.0`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Error type for CSV table loading and column lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    FileReadError(String),
    Csv(String),
    MissingColumn(String),
    InvalidValue { row: usize, column: String, value: String },
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::FileReadError(msg) => write!(f, "Failed to read file: {}", msg),
            DataError::Csv(msg) => write!(f, "Failed to parse CSV: {}", msg),
            DataError::MissingColumn(name) => write!(f, "Missing column: {}", name),
            DataError::InvalidValue { row, column, value } => {
                write!(f, "Invalid number '{}' in column {} at row {}", value, column, row)
            }
        }
    }
}

impl std::error::Error for DataError {}

/// A CSV file held column by column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericTable {
    headers: Vec<String>,
    columns: Vec<Vec<f64>>,
}

fn parse_cell(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    number.parse::<f64>().ok()
}

impl NumericTable {
    /// Load a table from a CSV file.
    pub fn from_path(path: &Path) -> Result<Self, DataError> {
        let file = File::open(path).map_err(|e| DataError::FileReadError(format!("{}: {}", path.display(), e)))?;
        Self::from_reader(file)
    }

    /// Parse a table from any CSV source.
    ///
    /// # Returns
    ///
    /// The table, or `Csv` for malformed input (including ragged rows) and
    /// `InvalidValue` for a non-numeric cell. Rows are numbered from 1,
    /// excluding the header.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut reader = csv::ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| DataError::Csv(e.to_string()))?
            .iter()
            .map(|h| h.to_string())
            .collect();
        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); headers.len()];

        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| DataError::Csv(e.to_string()))?;
            for (column, cell) in record.iter().enumerate() {
                let value = parse_cell(cell).ok_or_else(|| DataError::InvalidValue {
                    row: index + 1,
                    column: headers[column].clone(),
                    value: cell.to_string(),
                })?;
                columns[column].push(value);
            }
        }

        Ok(Self { headers, columns })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, |c| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values of the named column.
    pub fn column(&self, name: &str) -> Result<&[f64], DataError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .map(|i| self.columns[i].as_slice())
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))
    }

    /// Values of one row, in header order.
    pub fn row(&self, index: usize) -> Option<Vec<f64>> {
        if index >= self.len() {
            return None;
        }
        Some(self.columns.iter().map(|c| c[index]).collect())
    }

    /// Largest value across the named columns, or 0.0 when there are no rows.
    pub fn max_over(&self, names: &[&str]) -> Result<f64, DataError> {
        let mut max: Option<f64> = None;
        for name in names {
            for &value in self.column(name)? {
                max = Some(max.map_or(value, |m| m.max(value)));
            }
        }
        Ok(max.unwrap_or(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROGRESSION: &str = "Day,Susceptible,Infectious,Recovered,Vaccinated\n0,99,1,0,0\n1,95,4,1,0\n2,90,3,7,0\n";

    #[test]
    fn parses_named_numeric_columns() {
        let table = NumericTable::from_reader(PROGRESSION.as_bytes()).unwrap();
        assert_eq!(table.headers(), ["Day", "Susceptible", "Infectious", "Recovered", "Vaccinated"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.column("Day").unwrap(), &[0.0, 1.0, 2.0]);
        assert_eq!(table.column("Recovered").unwrap(), &[0.0, 1.0, 7.0]);
        assert_eq!(table.row(1), Some(vec![1.0, 95.0, 4.0, 1.0, 0.0]));
        assert_eq!(table.row(3), None);
    }

    #[test]
    fn strips_percent_suffix() {
        let table = NumericTable::from_reader("VaccinationRate,Recovered\n0%,900\n50%,120\n 100 % ,0\n".as_bytes()).unwrap();
        assert_eq!(table.column("VaccinationRate").unwrap(), &[0.0, 50.0, 100.0]);
    }

    #[test]
    fn reports_missing_column() {
        let table = NumericTable::from_reader(PROGRESSION.as_bytes()).unwrap();
        assert_eq!(table.column("Deceased"), Err(DataError::MissingColumn("Deceased".to_string())));
    }

    #[test]
    fn reports_invalid_value_with_location() {
        let err = NumericTable::from_reader("Day,Recovered\n0,1\n1,abc\n".as_bytes()).unwrap_err();
        assert_eq!(
            err,
            DataError::InvalidValue {
                row: 2,
                column: "Recovered".to_string(),
                value: "abc".to_string(),
            }
        );
    }

    #[test]
    fn ragged_rows_are_csv_errors() {
        let err = NumericTable::from_reader("Day,Recovered\n0,1,2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::Csv(_)));
    }

    #[test]
    fn header_only_table_is_empty() {
        let table = NumericTable::from_reader("Day,Recovered\n".as_bytes()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.max_over(&["Day", "Recovered"]).unwrap(), 0.0);
    }

    #[test]
    fn max_over_spans_columns() {
        let table = NumericTable::from_reader(PROGRESSION.as_bytes()).unwrap();
        assert_eq!(table.max_over(&["Infectious", "Recovered"]).unwrap(), 7.0);
        assert_eq!(table.max_over(&["Susceptible", "Vaccinated"]).unwrap(), 99.0);
        assert!(table.max_over(&["Nope"]).is_err());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = NumericTable::from_path(&dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, DataError::FileReadError(_)));
    }
}
