//! Data layer for Log Investigator.
//!
//! Discovers log files, extracts their timestamps line by line, counts them
//! per minute and writes the resulting statistics report.

pub mod aggregator;
pub mod parser;
pub mod report;
pub mod scanner;

pub use investigator_core as core;
