// crates/version-override-config/src/agent_config.rs
// ============================================================================
// Module: Agent Config Loader
// Description: Reads a machine agent's persisted configuration.
// Purpose: Extract store credentials for the resolved machine identity.
// Dependencies: version-override-core, serde, serde_yaml, thiserror
// ============================================================================

//! ## Overview
//! Each agent persists its configuration as `agent.conf` in its own agent
//! directory: a YAML document preceded by a `# format 2.0` header line. The
//! file belongs to the agent; this loader only reads it and ignores keys it
//! does not recognise.
//!
//! Loading fails closed. Oversized, non UTF-8, unversioned, or malformed
//! files are rejected, as is a file whose `tag` disagrees with the identity
//! resolved on the host. A well-formed file without store addresses or a
//! store password belongs to a machine that cannot reach the store directly.
//!
//! Security posture: the file holds passwords. They are wrapped in
//! [`Secret`] immediately and never appear in error text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;
use version_override_core::ConnectionCredentials;
use version_override_core::ControllerTag;
use version_override_core::ErrorKind;
use version_override_core::MachineTag;
use version_override_core::ModelTag;
use version_override_core::Secret;
use version_override_core::StoreAddress;

use crate::identity::agents_dir;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// File name of the agent config inside an agent directory.
pub const AGENT_CONFIG_FILE_NAME: &str = "agent.conf";
/// Header line identifying the supported config format.
pub const AGENT_CONFIG_FORMAT_HEADER: &str = "# format 2.0";
/// Maximum agent config size in bytes.
pub const MAX_AGENT_CONFIG_SIZE: usize = 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Agent config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The agent config file does not exist.
    #[error("agent config not found at {path}")]
    NotFound {
        /// Expected config path.
        path: String,
    },
    /// I/O failure while reading the config file.
    #[error("agent config io error: {0}")]
    Io(String),
    /// YAML parsing or schema error.
    #[error("agent config parse error: {0}")]
    Parse(String),
    /// Invalid agent config data.
    #[error("invalid agent config: {0}")]
    Invalid(String),
    /// Config is well-formed but carries no store credentials.
    #[error("no state credentials in agent config: {0}")]
    CredentialsUnavailable(String),
}

impl ConfigError {
    /// Returns the failure classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound {
                ..
            } => ErrorKind::ConfigNotFound,
            Self::Io(_) | Self::Parse(_) | Self::Invalid(_) => ErrorKind::ConfigInvalid,
            Self::CredentialsUnavailable(_) => ErrorKind::CredentialsUnavailable,
        }
    }
}

// ============================================================================
// SECTION: Model
// ============================================================================

/// Parsed agent config (format 2.0).
///
/// Only the keys this tool reads are modelled; every other key the agent
/// keeps in the file is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Agent tag the file belongs to.
    pub tag: String,
    /// Jobs assigned to the machine.
    #[serde(default)]
    pub jobs: Vec<String>,
    /// Version the agent last upgraded to.
    #[serde(default, rename = "upgradedToVersion")]
    pub upgraded_to_version: Option<String>,
    /// PEM-encoded CA certificate(s).
    #[serde(default)]
    pub cacert: Option<String>,
    /// Controller tag.
    pub controller: String,
    /// Controller model tag.
    pub model: String,
    /// Store endpoints; present only on controller machines.
    #[serde(default)]
    pub stateaddresses: Vec<String>,
    /// Store password; present only on controller machines.
    #[serde(default)]
    pub statepassword: Option<Secret>,
}

impl AgentConfig {
    /// Parses agent config text, requiring the format header.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the header is missing and
    /// [`ConfigError::Parse`] on YAML or schema errors.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let header = content.lines().next().map(str::trim_end).unwrap_or_default();
        if header != AGENT_CONFIG_FORMAT_HEADER {
            return Err(ConfigError::Invalid(format!(
                "unsupported agent config format: expected \"{AGENT_CONFIG_FORMAT_HEADER}\" header"
            )));
        }
        serde_yaml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Extracts store credentials for `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the file belongs to another
    /// agent or carries malformed tags or endpoints, and
    /// [`ConfigError::CredentialsUnavailable`] when store endpoints or the
    /// store password are absent.
    pub fn credentials(&self, expected: &MachineTag) -> Result<ConnectionCredentials, ConfigError> {
        let tag = MachineTag::parse(&self.tag).map_err(invalid)?;
        if &tag != expected {
            return Err(ConfigError::Invalid(format!(
                "config tag {tag} does not match machine identity {expected}"
            )));
        }
        let controller = ControllerTag::parse(&self.controller).map_err(invalid)?;
        let controller_model = ModelTag::parse(&self.model).map_err(invalid)?;

        if self.stateaddresses.is_empty() {
            return Err(ConfigError::CredentialsUnavailable(
                "stateaddresses not set".to_string(),
            ));
        }
        let addresses = self
            .stateaddresses
            .iter()
            .map(|address| StoreAddress::parse(address).map_err(invalid))
            .collect::<Result<Vec<_>, _>>()?;
        let password = self
            .statepassword
            .clone()
            .filter(|secret| !secret.expose().is_empty())
            .ok_or_else(|| {
                ConfigError::CredentialsUnavailable("statepassword not set".to_string())
            })?;
        let ca_cert = self.cacert.clone().filter(|pem| !pem.trim().is_empty());

        Ok(ConnectionCredentials {
            tag,
            addresses,
            password,
            ca_cert,
            controller,
            controller_model,
        })
    }
}

/// Maps a field validation error into [`ConfigError::Invalid`].
fn invalid(err: impl std::error::Error) -> ConfigError {
    ConfigError::Invalid(err.to_string())
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Returns `<data_dir>/agents/<tag>/agent.conf`.
#[must_use]
pub fn agent_config_path(data_dir: &Path, tag: &MachineTag) -> PathBuf {
    agents_dir(data_dir).join(tag.as_tag()).join(AGENT_CONFIG_FILE_NAME)
}

/// Reads and parses the agent config of `tag`.
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] when the file is missing and
/// [`ConfigError`] for unreadable, oversized, or malformed files.
pub fn load_agent_config(data_dir: &Path, tag: &MachineTag) -> Result<AgentConfig, ConfigError> {
    let path = agent_config_path(data_dir, tag);
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }
        Err(err) => return Err(ConfigError::Io(err.to_string())),
    };
    if bytes.len() > MAX_AGENT_CONFIG_SIZE {
        return Err(ConfigError::Invalid("agent config exceeds size limit".to_string()));
    }
    let content = std::str::from_utf8(&bytes)
        .map_err(|_| ConfigError::Invalid("agent config must be utf-8".to_string()))?;
    AgentConfig::parse(content)
}

/// Loads the store credentials of `tag` from its agent config.
///
/// # Errors
///
/// Returns [`ConfigError`] when the config cannot be loaded or carries no
/// usable store credentials.
pub fn load_credentials(
    data_dir: &Path,
    tag: &MachineTag,
) -> Result<ConnectionCredentials, ConfigError> {
    load_agent_config(data_dir, tag)?.credentials(tag)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
