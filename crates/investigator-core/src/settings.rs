use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{InvestigatorError, Result};
use crate::models::WriteMode;

// ── Defaults ──────────────────────────────────────────────────────────────────

pub const DEFAULT_LOGS_PATH: &str = "logs";
pub const DEFAULT_STATISTICS_PATH: &str = "statistics.txt";
pub const DEFAULT_WORKERS: u32 = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Accepted `log_level` spellings.
pub const LOG_LEVELS: &[&str] = &["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"];

// ── Settings (CLI / env) ──────────────────────────────────────────────────────

/// Per-minute frequency report for a directory of log files
#[derive(Parser, Debug, Clone)]
#[command(
    name = "log-investigator",
    about = "Per-minute frequency report for a directory of log files",
    version
)]
pub struct Settings {
    /// Directory holding the log files
    #[arg(long, env = "LOG_INVESTIGATOR_LOGS_PATH", default_value = DEFAULT_LOGS_PATH)]
    pub logs_path: PathBuf,

    /// File the per-minute statistics are written to
    #[arg(
        long,
        env = "LOG_INVESTIGATOR_STATISTICS_PATH",
        default_value = DEFAULT_STATISTICS_PATH
    )]
    pub statistics_path: PathBuf,

    /// Number of log files processed concurrently (1-256)
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..=256))]
    pub workers: u32,

    /// Seconds to wait for all files before reporting what was collected
    #[arg(long, default_value = "180")]
    pub timeout_secs: u64,

    /// Write the report to a temp file and rename it into place
    #[arg(long)]
    pub atomic_write: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path (stderr when absent)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// JSON file supplying values for options not given explicitly
    #[arg(long, env = "LOG_INVESTIGATOR_CONFIG")]
    pub config: Option<PathBuf>,
}

// ── FileConfig ────────────────────────────────────────────────────────────────

/// Optional JSON configuration file.
///
/// Every field is optional; present fields fill in options that were not set
/// on the command line or through the environment.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atomic_write: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl FileConfig {
    /// Load a config file. Unlike a missing optional file, an explicitly
    /// named file that cannot be read or parsed is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            InvestigatorError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

// ── Settings impl ─────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments and environment, then merge the config
    /// file if one was named.
    pub fn load() -> Result<Self> {
        Self::load_from_args(std::env::args_os().collect())
    }

    /// Same as [`Settings::load`] with an explicit argument list.
    pub fn load_from_args(args: Vec<std::ffi::OsString>) -> Result<Self> {
        // Raw matches are needed to query where each value came from.
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if let Some(config_path) = settings.config.clone() {
            let file = FileConfig::load_from(&config_path)?;
            settings.merge_file_config(file, &matches);
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Copy config-file values over options the user did not set explicitly.
    fn merge_file_config(&mut self, file: FileConfig, matches: &clap::ArgMatches) {
        if !is_arg_explicitly_set(matches, "logs_path") {
            if let Some(v) = file.logs_path {
                self.logs_path = v;
            }
        }
        if !is_arg_explicitly_set(matches, "statistics_path") {
            if let Some(v) = file.statistics_path {
                self.statistics_path = v;
            }
        }
        if !is_arg_explicitly_set(matches, "workers") {
            if let Some(v) = file.workers {
                self.workers = v;
            }
        }
        if !is_arg_explicitly_set(matches, "timeout_secs") {
            if let Some(v) = file.timeout_secs {
                self.timeout_secs = v;
            }
        }
        if !is_arg_explicitly_set(matches, "atomic_write") {
            if let Some(v) = file.atomic_write {
                self.atomic_write = v;
            }
        }
        if !is_arg_explicitly_set(matches, "log_level") {
            if let Some(v) = file.log_level {
                self.log_level = v.to_uppercase();
            }
        }
        if self.log_file.is_none() {
            self.log_file = file.log_file;
        }
    }

    /// Reject values the command line parser cannot check for file input.
    pub fn validate(&self) -> Result<()> {
        if !(1..=256).contains(&self.workers) {
            return Err(InvestigatorError::Config(format!(
                "workers must be between 1 and 256, got {}",
                self.workers
            )));
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(InvestigatorError::Config(format!(
                "unknown log level \"{}\"",
                self.log_level
            )));
        }
        Ok(())
    }

    /// Overall deadline for the parallel parsing phase.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn write_mode(&self) -> WriteMode {
        if self.atomic_write {
            WriteMode::Atomic
        } else {
            WriteMode::Overwrite
        }
    }
}

// ── Helper: check if an arg was set by the user ───────────────────────────────

/// Returns `true` when `name` came from the command line or the environment
/// rather than from its default value.
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(clap::parser::ValueSource::CommandLine) | Some(clap::parser::ValueSource::EnvVariable)
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(tmp: &TempDir, json: &str) -> PathBuf {
        let path = tmp.path().join("investigator.json");
        std::fs::write(&path, json).expect("write config");
        path
    }

    fn args(list: &[&str]) -> Vec<std::ffi::OsString> {
        list.iter().map(|s| s.into()).collect()
    }

    // ── defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["log-investigator"]);

        assert_eq!(settings.statistics_path, PathBuf::from(DEFAULT_STATISTICS_PATH));
        assert_eq!(settings.workers, DEFAULT_WORKERS);
        assert_eq!(settings.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(settings.timeout(), Duration::from_secs(180));
        assert!(!settings.atomic_write);
        assert_eq!(settings.write_mode(), WriteMode::Overwrite);
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
    }

    // ── CLI parsing ───────────────────────────────────────────────────────────

    #[test]
    fn test_settings_cli_paths() {
        let settings = Settings::parse_from([
            "log-investigator",
            "--logs-path",
            "/var/log/app",
            "--statistics-path",
            "/tmp/stats.txt",
        ]);
        assert_eq!(settings.logs_path, PathBuf::from("/var/log/app"));
        assert_eq!(settings.statistics_path, PathBuf::from("/tmp/stats.txt"));
    }

    #[test]
    fn test_settings_cli_workers_out_of_range() {
        let result = Settings::try_parse_from(["log-investigator", "--workers", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_cli_atomic_write() {
        let settings = Settings::parse_from(["log-investigator", "--atomic-write"]);
        assert_eq!(settings.write_mode(), WriteMode::Atomic);
    }

    #[test]
    fn test_load_debug_overrides_log_level() {
        let settings = Settings::load_from_args(args(&["log-investigator", "--debug"])).unwrap();
        assert_eq!(settings.log_level, "DEBUG");
    }

    // ── config file ───────────────────────────────────────────────────────────

    #[test]
    fn test_file_config_fills_unset_options() {
        let tmp = TempDir::new().expect("tempdir");
        let path = write_config(
            &tmp,
            r#"{ "statistics_path": "/data/report.txt", "workers": 4, "atomic_write": true }"#,
        );

        let settings = Settings::load_from_args(args(&[
            "log-investigator",
            "--config",
            path.to_str().unwrap(),
        ]))
        .unwrap();

        assert_eq!(settings.statistics_path, PathBuf::from("/data/report.txt"));
        assert_eq!(settings.workers, 4);
        assert!(settings.atomic_write);
    }

    #[test]
    fn test_cli_overrides_file_config() {
        let tmp = TempDir::new().expect("tempdir");
        let path = write_config(&tmp, r#"{ "workers": 4, "timeout_secs": 5 }"#);

        let settings = Settings::load_from_args(args(&[
            "log-investigator",
            "--config",
            path.to_str().unwrap(),
            "--workers",
            "2",
        ]))
        .unwrap();

        assert_eq!(settings.workers, 2);
        assert_eq!(settings.timeout_secs, 5);
    }

    #[test]
    fn test_file_config_invalid_workers_rejected() {
        let tmp = TempDir::new().expect("tempdir");
        let path = write_config(&tmp, r#"{ "workers": 0 }"#);

        let result = Settings::load_from_args(args(&[
            "log-investigator",
            "--config",
            path.to_str().unwrap(),
        ]));
        assert!(matches!(result, Err(InvestigatorError::Config(_))));
    }

    #[test]
    fn test_file_config_invalid_log_level_rejected() {
        let tmp = TempDir::new().expect("tempdir");
        let path = write_config(&tmp, r#"{ "log_level": "verbose" }"#);

        let result = Settings::load_from_args(args(&[
            "log-investigator",
            "--config",
            path.to_str().unwrap(),
        ]));
        assert!(matches!(result, Err(InvestigatorError::Config(_))));
    }

    #[test]
    fn test_file_config_unknown_field_rejected() {
        let tmp = TempDir::new().expect("tempdir");
        let path = write_config(&tmp, r#"{ "colour": "blue" }"#);
        assert!(matches!(
            FileConfig::load_from(&path),
            Err(InvestigatorError::Json(_))
        ));
    }

    #[test]
    fn test_file_config_missing_file() {
        let tmp = TempDir::new().expect("tempdir");
        let result = FileConfig::load_from(&tmp.path().join("absent.json"));
        assert!(matches!(result, Err(InvestigatorError::Config(_))));
    }

    #[test]
    fn test_file_config_roundtrip_skips_none() {
        let config = FileConfig {
            workers: Some(3),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"workers":3}"#);
    }
}
