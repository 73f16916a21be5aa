//! Output module for end-of-run reporting
//!
//! This module turns the stage reports of a finished harvest into a
//! summary that is printed once the results have been saved.

mod summary;

pub use summary::{print_summary, RunSummary};
