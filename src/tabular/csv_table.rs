//! CSV implementation of the tabular source and sink

use crate::tabular::traits::{ResultSink, SeedSource, TabularResult};
use std::path::{Path, PathBuf};

/// A CSV file read from or written to through a single column
#[derive(Debug, Clone)]
pub struct CsvTable {
    path: PathBuf,
    column: usize,
    has_headers: bool,
}

impl CsvTable {
    /// Creates a table reading column 0 with no header row
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            column: 0,
            has_headers: false,
        }
    }

    /// Selects the zero-based column holding seeds
    pub fn with_column(mut self, column: usize) -> Self {
        self.column = column;
        self
    }

    /// Treats the first row as a header when loading
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }
}

impl SeedSource for CsvTable {
    /// Reads the configured column of every row, in file order
    ///
    /// Cells are trimmed. Rows whose cell is empty, or which are too short
    /// to have the column at all, are skipped.
    fn load(&self) -> TabularResult<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(self.has_headers)
            .flexible(true)
            .from_path(&self.path)?;

        let mut seeds = Vec::new();
        for record in reader.records() {
            let record = record?;
            if let Some(value) = record.get(self.column).map(str::trim) {
                if !value.is_empty() {
                    seeds.push(value.to_string());
                }
            }
        }

        tracing::debug!(
            "Loaded {} seeds from {} (column {})",
            seeds.len(),
            self.path.display(),
            self.column
        );

        Ok(seeds)
    }
}

impl ResultSink for CsvTable {
    fn save(&self, rows: &[String]) -> TabularResult<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.path)?;

        for row in rows {
            writer.write_record([row.as_str()])?;
        }
        writer.flush()?;

        tracing::debug!("Wrote {} rows to {}", rows.len(), self.path.display());
        Ok(())
    }
}
