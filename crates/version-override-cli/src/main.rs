// crates/version-override-cli/src/main.rs
// ============================================================================
// Module: Force Agent Version Entry Point
// Description: Break-glass command forcing one model's agent-version.
// Purpose: Parse arguments, run the override pipeline, map the exit code.
// Dependencies: clap, thiserror, version-override-{cli, config, core, store-postgres}
// ============================================================================

//! ## Overview
//! `force-agent-version <model-id> <version>` runs on a controller machine
//! and writes the given version into the model's `agent-version` setting,
//! bypassing the normal upgrade negotiation. It does not inspect the model's
//! current version or state before writing. It takes no flags; arguments
//! after the version are ignored.
//!
//! Diagnostics go to stderr as JSON lines at maximum verbosity. The exit code
//! is 0 on success and 1 for every failure; the failure class is only visible
//! in the logged error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use thiserror::Error;
use version_override_cli::OverrideError;
use version_override_cli::OverrideRequest;
use version_override_cli::run_override;
use version_override_cli::t;
use version_override_config::ToolSettings;
use version_override_core::LogEvent;
use version_override_core::LogLevel;
use version_override_core::OperatorLog;
use version_override_core::StderrLogSink;
use version_override_store_postgres::PostgresConnector;

// ============================================================================
// SECTION: CLI Definition
// ============================================================================

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "force-agent-version",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Cli {
    /// Model whose agent-version is overwritten.
    model: String,
    /// Semantic version to force.
    version: String,
    /// Trailing arguments, accepted and ignored.
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    _ignored: Vec<String>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Top-level CLI failures.
#[derive(Debug, Error)]
enum CliError {
    /// Arguments were missing or malformed; usage is printed.
    #[error("{0}")]
    Usage(String),
    /// The override failed.
    #[error(transparent)]
    Override(#[from] OverrideError),
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    let log = StderrLogSink::new(LogLevel::Trace);
    match run(&log) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Usage(usage)) => {
            if let Err(err) = write_stdout_line(&usage) {
                let _ = write_stderr_line(&t!(
                    "output.write_failed",
                    stream = t!("output.stream.stdout"),
                    error = err
                ));
            }
            ExitCode::FAILURE
        }
        Err(CliError::Override(err)) => emit_error(&log, &err),
    }
}

/// Parses arguments and runs the override.
fn run(log: &dyn OperatorLog) -> CliResult<()> {
    let cli = Cli::try_parse().map_err(|_| CliError::Usage(t!("main.usage")))?;
    let settings = ToolSettings::from_env().map_err(OverrideError::from)?;
    let request = OverrideRequest {
        model: cli.model,
        version: cli.version,
    };
    run_override(&settings, &request, &PostgresConnector::default(), log)?;
    Ok(())
}

// ============================================================================
// SECTION: Output
// ============================================================================

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Logs a failed override and returns a failure exit code.
fn emit_error(log: &dyn OperatorLog, err: &OverrideError) -> ExitCode {
    log.record(
        &LogEvent::new(LogLevel::Error, err.stage(), t!("override.failed"))
            .with_field("kind", err.kind().as_str())
            .with_field("error", err.to_string()),
    );
    ExitCode::FAILURE
}
