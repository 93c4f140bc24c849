//! Loading simulation output back from CSV files.

pub mod table;

pub use table::{DataError, NumericTable};
