// crates/version-override-config/src/identity.rs
// ============================================================================
// Module: Machine Identity Resolver
// Description: Discovers the local machine tag from agent directories.
// Purpose: Determine which machine this host is before any config is read.
// Dependencies: version-override-core, thiserror
// ============================================================================

//! ## Overview
//! Every agent running on a host owns a directory named after its tag under
//! `<data-dir>/agents`. Exactly one `machine-*` directory must exist; zero or
//! several are fatal and the caller must not guess.
//!
//! [`resolve_machine_tag`] is pure and works on directory entry names.
//! [`discover_machine_tag`] is the filesystem adapter; it only lists.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;
use version_override_core::ErrorKind;
use version_override_core::IdentifierError;
use version_override_core::MachineTag;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Directory under the data dir holding one subdirectory per agent.
pub const AGENTS_DIR_NAME: &str = "agents";
/// Entry name prefix identifying machine agents.
const MACHINE_ENTRY_PREFIX: &str = "machine-";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Machine identity discovery errors.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// No machine agent directory exists.
    #[error("no machines found in {dir}")]
    NotFound {
        /// Directory that was searched.
        dir: String,
    },
    /// More than one machine agent directory exists.
    #[error("too many possible machine agents in {dir}: {}", .candidates.join(", "))]
    Ambiguous {
        /// Directory that was searched.
        dir: String,
        /// Matching entry names, sorted.
        candidates: Vec<String>,
    },
    /// The single candidate is not a well-formed machine tag.
    #[error("invalid machine identity: {0}")]
    Invalid(#[from] IdentifierError),
    /// The agents directory exists but could not be listed.
    #[error("unable to list {dir}: {reason}")]
    Unreadable {
        /// Directory that was searched.
        dir: String,
        /// I/O diagnostic.
        reason: String,
    },
}

impl IdentityError {
    /// Returns the failure classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound {
                ..
            }
            | Self::Unreadable {
                ..
            } => ErrorKind::NotFound,
            Self::Ambiguous {
                ..
            } => ErrorKind::AmbiguousIdentity,
            Self::Invalid(_) => ErrorKind::InvalidIdentity,
        }
    }
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Returns `<data_dir>/agents`.
#[must_use]
pub fn agents_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(AGENTS_DIR_NAME)
}

/// Selects the single machine tag among agent directory entry names.
///
/// `dir` only labels errors; no filesystem access happens here.
///
/// # Errors
///
/// Returns [`IdentityError`] when zero or several `machine-*` names exist, or
/// when the single match is not a valid machine tag.
pub fn resolve_machine_tag<I, S>(dir: &str, names: I) -> Result<MachineTag, IdentityError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut candidates: Vec<String> = names
        .into_iter()
        .filter(|name| name.as_ref().starts_with(MACHINE_ENTRY_PREFIX))
        .map(|name| name.as_ref().to_string())
        .collect();
    candidates.sort();
    if candidates.len() > 1 {
        return Err(IdentityError::Ambiguous {
            dir: dir.to_string(),
            candidates,
        });
    }
    let single = candidates.first().ok_or_else(|| IdentityError::NotFound {
        dir: dir.to_string(),
    })?;
    Ok(MachineTag::parse(single)?)
}

/// Lists `<data_dir>/agents` and resolves the local machine tag.
///
/// # Errors
///
/// Returns [`IdentityError::NotFound`] when the agents directory is missing,
/// [`IdentityError::Unreadable`] on other listing failures, and the
/// [`resolve_machine_tag`] errors otherwise.
pub fn discover_machine_tag(data_dir: &Path) -> Result<MachineTag, IdentityError> {
    let dir = agents_dir(data_dir);
    let label = dir.display().to_string();
    let unreadable = |err: io::Error| IdentityError::Unreadable {
        dir: label.clone(),
        reason: err.to_string(),
    };
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(IdentityError::NotFound {
                dir: label.clone(),
            });
        }
        Err(err) => return Err(unreadable(err)),
    };
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(unreadable)?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    resolve_machine_tag(&label, names)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
