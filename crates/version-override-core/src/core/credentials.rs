// crates/version-override-core/src/core/credentials.rs
// ============================================================================
// Module: Connection Credentials
// Description: Store endpoints and authentication material for one machine.
// Purpose: Carry loaded credentials from the config loader to the connector.
// Dependencies: crate::core::identifiers, serde, thiserror
// ============================================================================

//! ## Overview
//! [`ConnectionCredentials`] is produced by the agent config loader and
//! consumed by a store connector. Every required field is non-optional, so a
//! value of this type is always complete. Credentials live only in process
//! memory and are never written back.
//!
//! Security posture: the store password is wrapped in [`Secret`], whose
//! `Debug` and `Display` output is redacted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::core::identifiers::ControllerTag;
use crate::core::identifiers::MachineTag;
use crate::core::identifiers::ModelTag;

// ============================================================================
// SECTION: Store Address
// ============================================================================

/// Store address parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid store address \"{value}\": {reason}")]
pub struct AddressError {
    /// Offending input.
    pub value: String,
    /// Reason the input was rejected.
    pub reason: &'static str,
}

/// One store endpoint (`host:port`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreAddress {
    /// Host name or IP literal (IPv6 without brackets).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl StoreAddress {
    /// Parses `host:port` or `[v6-literal]:port`.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError`] when the host is empty or the port is missing
    /// or out of range.
    pub fn parse(value: &str) -> Result<Self, AddressError> {
        let invalid = |reason| AddressError {
            value: value.to_string(),
            reason,
        };
        let (host, port) = if let Some(rest) = value.strip_prefix('[') {
            let (host, tail) = rest.split_once(']').ok_or_else(|| invalid("unclosed bracket"))?;
            let port = tail.strip_prefix(':').ok_or_else(|| invalid("missing port"))?;
            (host, port)
        } else {
            value.rsplit_once(':').ok_or_else(|| invalid("missing port"))?
        };
        if host.is_empty() {
            return Err(invalid("host is empty"));
        }
        if host.contains(char::is_whitespace) {
            return Err(invalid("host contains whitespace"));
        }
        let port = port.parse::<u16>().map_err(|_| invalid("port must be 1-65535"))?;
        if port == 0 {
            return Err(invalid("port must be 1-65535"));
        }
        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for StoreAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

// ============================================================================
// SECTION: Secret
// ============================================================================

/// Secret string whose formatting is redacted.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wraps a secret value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the secret value for handing to a transport.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

// ============================================================================
// SECTION: Credentials
// ============================================================================

/// Store connection parameters and authentication material for one machine.
///
/// # Invariants
/// - `addresses` is non-empty.
/// - `tag` equals the machine identity resolved on this host.
#[derive(Debug, Clone)]
pub struct ConnectionCredentials {
    /// Machine the credentials belong to (also the store user name).
    pub tag: MachineTag,
    /// Store endpoints, in config order.
    pub addresses: Vec<StoreAddress>,
    /// Store password.
    pub password: Secret,
    /// PEM-encoded CA certificate(s) used to verify the store.
    pub ca_cert: Option<String>,
    /// Controller the machine belongs to.
    pub controller: ControllerTag,
    /// Controller model recorded in the agent config.
    pub controller_model: ModelTag,
}

impl ConnectionCredentials {
    /// Returns the endpoint list as a comma separated string for diagnostics.
    #[must_use]
    pub fn endpoints_label(&self) -> String {
        self.addresses.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
