//! Core domain layer for Log Investigator.
//!
//! Holds the data model shared by every other crate: parsed timestamps and
//! minute buckets, the error taxonomy, timestamp parsing, report formatting
//! and runtime settings.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;
