//! Runtime layer for Log Investigator.
//!
//! Runs the per-file parsers on a bounded worker pool behind a single
//! barrier with a deadline, and drives the scan → parse → aggregate → write
//! pipeline end to end.

pub mod orchestrator;
pub mod worker_pool;

pub use investigator_core as core;
pub use investigator_data as data;
