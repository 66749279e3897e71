mod bootstrap;

use std::process::ExitCode;

use anyhow::Context;
use investigator_core::settings::Settings;
use investigator_runtime::orchestrator::InvestigationOrchestrator;

fn main() -> ExitCode {
    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("log-investigator: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref()) {
        eprintln!("log-investigator: cannot initialise logging: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Run the investigation once and log its outcome.
fn run(settings: &Settings) -> anyhow::Result<()> {
    tracing::info!("Log Investigator v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Logs: {}, statistics: {}, workers: {}, timeout: {}s",
        settings.logs_path.display(),
        settings.statistics_path.display(),
        settings.workers,
        settings.timeout_secs
    );

    let runtime = bootstrap::build_runtime()?;
    let orchestrator = InvestigationOrchestrator::from_settings(settings);
    let result = runtime.block_on(orchestrator.run());
    // Reads abandoned after a timeout must not keep the process alive.
    runtime.shutdown_timeout(bootstrap::SHUTDOWN_GRACE);

    let summary = result.context("investigation aborted")?;

    if summary.timed_out {
        tracing::warn!("Statistics are partial: processing timed out");
    }
    tracing::info!(
        "Done in {:.2}s: {} files ({} failed), {} log notes, {} malformed, {} minutes reported",
        summary.elapsed_seconds,
        summary.files_found,
        summary.files_failed,
        summary.lines_parsed,
        summary.malformed_lines,
        summary.buckets_written
    );

    Ok(())
}
