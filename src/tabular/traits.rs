//! Tabular source/sink traits and error types
//!
//! The harvester only needs two things from a table: an ordered column of
//! seeds to read, and an ordered column of results to write.

use thiserror::Error;

/// Errors that can occur while reading seeds or writing results
#[derive(Debug, Error)]
pub enum TabularError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for tabular operations
pub type TabularResult<T> = Result<T, TabularError>;

/// An ordered source of seed identifiers
pub trait SeedSource {
    /// Loads every seed in source order
    fn load(&self) -> TabularResult<Vec<String>>;
}

/// A destination for the final result sequence
pub trait ResultSink {
    /// Writes `rows` in order, one value per row, replacing previous content
    fn save(&self, rows: &[String]) -> TabularResult<()>;
}
