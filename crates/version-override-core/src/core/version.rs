// crates/version-override-core/src/core/version.rs
// ============================================================================
// Module: Agent Version
// Description: Strict semantic version value forced onto a model.
// Purpose: Reject unparseable versions before any store interaction.
// Dependencies: semver
// ============================================================================

//! ## Overview
//! [`AgentVersion`] wraps a SemVer 2.0 version. Parsing is strict: no
//! surrounding whitespace, no `v` prefix, no missing components. The value is
//! written to the store in its canonical string form.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use crate::core::errors::InputError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Target agent version for a model.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgentVersion(semver::Version);

impl AgentVersion {
    /// Parses a strict semantic version string.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidVersion`] when the value is not a valid
    /// semantic version.
    pub fn parse(value: &str) -> Result<Self, InputError> {
        semver::Version::parse(value).map(Self).map_err(|err| InputError::InvalidVersion {
            value: value.to_string(),
            reason: err.to_string(),
        })
    }

    /// Returns the underlying semantic version.
    #[must_use]
    pub const fn as_semver(&self) -> &semver::Version {
        &self.0
    }
}

impl FromStr for AgentVersion {
    type Err = InputError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl fmt::Display for AgentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
