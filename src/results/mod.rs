//! Results storage module
//!
//! Persists execution reports so CI jobs can inspect earlier runs.

mod storage;

pub use storage::ResultsStorage;
