// crates/version-override-config/src/settings.rs
// ============================================================================
// Module: Tool Settings
// Description: Process-level settings for the override tool.
// Purpose: Resolve the agent data directory with path guards.
// Dependencies: version-override-core, thiserror
// ============================================================================

//! ## Overview
//! The tool has no flags and no config file of its own. The only setting is
//! the agent data directory, which defaults to the standard install location
//! and may be redirected through an environment variable for staged copies
//! and tests. The resolved path is validated against length limits before
//! anything is read from it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;
use version_override_core::ErrorKind;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default agent data directory.
pub const DEFAULT_DATA_DIR: &str = "/var/lib/juju";
/// Environment variable overriding the agent data directory.
pub const DATA_DIR_ENV_VAR: &str = "FORCE_AGENT_VERSION_DATA_DIR";
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Tool settings errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The data directory setting is unusable.
    #[error("invalid data dir: {0}")]
    InvalidDataDir(String),
}

impl SettingsError {
    /// Returns the failure classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDataDir(_) => ErrorKind::InvalidInput,
        }
    }
}

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Resolved tool settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSettings {
    /// Agent data directory (parent of `agents/`).
    pub data_dir: PathBuf,
}

impl ToolSettings {
    /// Builds settings for an explicit data directory.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidDataDir`] when the path is empty or
    /// exceeds length limits.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let data_dir = data_dir.into();
        validate_path(&data_dir)?;
        Ok(Self {
            data_dir,
        })
    }

    /// Resolves settings from the environment, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidDataDir`] when the override is not
    /// unicode or fails path validation.
    pub fn from_env() -> Result<Self, SettingsError> {
        match env::var(DATA_DIR_ENV_VAR) {
            Ok(value) => Self::with_data_dir(value),
            Err(env::VarError::NotPresent) => Self::with_data_dir(DEFAULT_DATA_DIR),
            Err(env::VarError::NotUnicode(_)) => Err(SettingsError::InvalidDataDir(format!(
                "{DATA_DIR_ENV_VAR} must be valid unicode"
            ))),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates the data directory against length limits.
fn validate_path(path: &Path) -> Result<(), SettingsError> {
    let text = path.to_string_lossy();
    if text.trim().is_empty() {
        return Err(SettingsError::InvalidDataDir("path must be non-empty".to_string()));
    }
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SettingsError::InvalidDataDir("path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SettingsError::InvalidDataDir("path component too long".to_string()));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
