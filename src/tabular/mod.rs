//! Tabular I/O for seeds and results
//!
//! Seeds are read from one column of a CSV file and the final result
//! sequence is written back as a single-column CSV file.

mod csv_table;
mod traits;

pub use csv_table::CsvTable;
pub use traits::{ResultSink, SeedSource, TabularError, TabularResult};

use std::path::Path;

/// Loads seeds from `column` of the CSV file at `path`
pub fn load_seeds(path: &Path, column: usize, has_headers: bool) -> TabularResult<Vec<String>> {
    CsvTable::new(path)
        .with_column(column)
        .with_headers(has_headers)
        .load()
}

/// Writes `rows` to the CSV file at `path`, one value per row
pub fn save_results(path: &Path, rows: &[String]) -> TabularResult<()> {
    CsvTable::new(path).save(rows)
}
