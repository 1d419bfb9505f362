// crates/version-override-cli/src/pipeline.rs
// ============================================================================
// Module: Override Pipeline
// Description: Linear identity, config, connect, mutate, close chain.
// Purpose: Run one agent-version override and classify any failure by stage.
// Dependencies: version-override-{core, config}, thiserror
// ============================================================================

//! ## Overview
//! [`run_override`] is the whole tool minus process concerns. It validates
//! the requested version, discovers the machine identity, loads its store
//! credentials, opens one session, forces the model's `agent-version`, and
//! closes the session. Each stage returns a classified error; nothing is
//! retried and nothing terminates the process here.
//!
//! ## Invariants
//! - The version is validated before any filesystem or network access.
//! - Once opened, the session is closed on every path.
//! - A close failure after a successful write is reported but does not undo
//!   the success: the write is already durable in the store.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;
use version_override_config::ConfigError;
use version_override_config::IdentityError;
use version_override_config::SettingsError;
use version_override_config::ToolSettings;
use version_override_config::agent_config_path;
use version_override_config::agents_dir;
use version_override_config::discover_machine_tag;
use version_override_config::load_agent_config;
use version_override_core::AgentVersion;
use version_override_core::ConnectError;
use version_override_core::ErrorKind;
use version_override_core::InputError;
use version_override_core::LogEvent;
use version_override_core::LogLevel;
use version_override_core::MachineTag;
use version_override_core::ModelStore;
use version_override_core::MutateError;
use version_override_core::OperatorLog;
use version_override_core::Stage;
use version_override_core::StoreConnector;
use version_override_core::force_agent_version;

use crate::t;

// ============================================================================
// SECTION: Request
// ============================================================================

/// Operator request as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideRequest {
    /// Model identifier.
    pub model: String,
    /// Target agent version (unparsed).
    pub version: String,
}

/// Summary of an applied override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideOutcome {
    /// Machine whose credentials were used.
    pub machine: MachineTag,
    /// Model that was updated.
    pub model: String,
    /// Version that was written.
    pub version: AgentVersion,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Override failure annotated with the stage that produced it.
#[derive(Debug, Error)]
pub enum OverrideError {
    /// The version argument is not a semantic version.
    #[error("{stage}: {0}", stage = Stage::Input.annotation())]
    Input(#[from] InputError),
    /// Tool settings are unusable.
    #[error("{stage}: {0}", stage = Stage::Input.annotation())]
    Settings(#[from] SettingsError),
    /// Machine identity discovery failed.
    #[error("{stage}: {0}", stage = Stage::Identity.annotation())]
    Identity(#[from] IdentityError),
    /// Agent config loading failed.
    #[error("{stage}: {0}", stage = Stage::Config.annotation())]
    Config(#[from] ConfigError),
    /// Opening the store session failed.
    #[error("{stage}: {0}", stage = Stage::Connect.annotation())]
    Connect(#[from] ConnectError),
    /// The targeted mutation failed.
    #[error("{stage}: {0}", stage = Stage::Mutate.annotation())]
    Mutate(#[from] MutateError),
}

impl OverrideError {
    /// Returns the stage that produced the error.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Input(_) | Self::Settings(_) => Stage::Input,
            Self::Identity(_) => Stage::Identity,
            Self::Config(_) => Stage::Config,
            Self::Connect(_) => Stage::Connect,
            Self::Mutate(_) => Stage::Mutate,
        }
    }

    /// Returns the failure classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Input(err) => err.kind(),
            Self::Settings(err) => err.kind(),
            Self::Identity(err) => err.kind(),
            Self::Config(err) => err.kind(),
            Self::Connect(err) => err.kind(),
            Self::Mutate(err) => err.kind(),
        }
    }
}

// ============================================================================
// SECTION: Pipeline
// ============================================================================

/// Runs one override end to end.
///
/// # Errors
///
/// Returns [`OverrideError`] for the first stage that fails.
pub fn run_override<C: StoreConnector>(
    settings: &ToolSettings,
    request: &OverrideRequest,
    connector: &C,
    log: &dyn OperatorLog,
) -> Result<OverrideOutcome, OverrideError> {
    log.record(
        &LogEvent::new(LogLevel::Trace, Stage::Input, t!("override.input.parsing"))
            .with_field("model", request.model.as_str())
            .with_field("version", request.version.as_str()),
    );
    let version = AgentVersion::parse(&request.version)?;

    let data_dir = settings.data_dir.as_path();
    log.emit(
        LogLevel::Trace,
        Stage::Identity,
        t!("override.identity.searching", dir = agents_dir(data_dir).display()),
    );
    let machine = discover_machine_tag(data_dir)?;
    log.emit(LogLevel::Info, Stage::Identity, t!("override.identity.found", tag = machine));

    log.emit(
        LogLevel::Trace,
        Stage::Config,
        t!("override.config.loading", path = agent_config_path(data_dir, &machine).display()),
    );
    let agent_config = load_agent_config(data_dir, &machine)?;
    let credentials = agent_config.credentials(&machine)?;
    log.record(
        &LogEvent::new(LogLevel::Debug, Stage::Config, t!("override.config.loaded", tag = machine))
            .with_field("controller", credentials.controller.uuid())
            .with_field("jobs", agent_config.jobs.join(","))
            .with_field(
                "upgraded_to_version",
                agent_config.upgraded_to_version.as_deref().unwrap_or("unknown"),
            )
            .with_field("tls", if credentials.ca_cert.is_some() { "ca" } else { "none" }),
    );

    log.emit(
        LogLevel::Trace,
        Stage::Connect,
        t!("override.connect.opening", endpoints = credentials.endpoints_label()),
    );
    let mut session = connector.connect(&credentials)?;
    log.emit(LogLevel::Debug, Stage::Connect, t!("override.connect.opened"));

    let mutated = force_agent_version(&mut session, &request.model, &version, log);

    log.emit(LogLevel::Trace, Stage::Close, t!("override.close.closing"));
    if let Err(err) = session.close() {
        log.emit(LogLevel::Warn, Stage::Close, t!("override.close.failed", error = err));
    }
    mutated?;

    log.emit(
        LogLevel::Info,
        Stage::Mutate,
        t!("override.done", model = request.model, version = version),
    );
    Ok(OverrideOutcome {
        machine,
        model: request.model.clone(),
        version,
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
