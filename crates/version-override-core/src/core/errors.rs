// crates/version-override-core/src/core/errors.rs
// ============================================================================
// Module: Error Kinds
// Description: Stable failure classification shared by all stages.
// Purpose: Classify failures for logs and tests without parsing messages.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Each stage owns its own error enum; every variant maps onto exactly one
//! [`ErrorKind`]. Kinds are reported in logs; the process exit code is the same
//! for all of them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Error Kind
// ============================================================================

/// Failure classification for a run.
///
/// # Invariants
/// - Variants are stable for log labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No machine identity present on this host.
    NotFound,
    /// More than one machine identity present on this host.
    AmbiguousIdentity,
    /// The single machine identity entry does not parse.
    InvalidIdentity,
    /// Agent config file is missing.
    ConfigNotFound,
    /// Agent config file is unreadable or malformed.
    ConfigInvalid,
    /// Agent config is well-formed but lacks store credentials.
    CredentialsUnavailable,
    /// The store session could not be opened.
    ConnectionFailed,
    /// The model identifier is malformed or does not resolve.
    DeploymentNotFound,
    /// The store rejected the write.
    WriteFailed,
    /// Command-line input is invalid.
    InvalidInput,
}

impl ErrorKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::AmbiguousIdentity => "ambiguous_identity",
            Self::InvalidIdentity => "invalid_identity",
            Self::ConfigNotFound => "config_not_found",
            Self::ConfigInvalid => "config_invalid",
            Self::CredentialsUnavailable => "credentials_unavailable",
            Self::ConnectionFailed => "connection_failed",
            Self::DeploymentNotFound => "deployment_not_found",
            Self::WriteFailed => "write_failed",
            Self::InvalidInput => "invalid_input",
        }
    }
}

// ============================================================================
// SECTION: Input Errors
// ============================================================================

/// Invalid operator input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Version argument is not a semantic version.
    #[error("invalid version \"{value}\": {reason}")]
    InvalidVersion {
        /// Offending input.
        value: String,
        /// Parser diagnostic.
        reason: String,
    },
}

impl InputError {
    /// Returns the failure classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidInput
    }
}
