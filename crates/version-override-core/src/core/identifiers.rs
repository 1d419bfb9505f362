// crates/version-override-core/src/core/identifiers.rs
// ============================================================================
// Module: Version Override Identifiers
// Description: Machine, controller, and model identifiers.
// Purpose: Provide strictly parsed identifiers with stable string forms.
// Dependencies: thiserror, uuid
// ============================================================================

//! ## Overview
//! Identifiers in this module are validated on construction. Tag strings use
//! the `<kind>-<id>` form found in agent directories and agent config files:
//! `machine-0`, `machine-0-lxd-2`, `controller-<uuid>`, `model-<uuid>`.
//! [`ModelId`] is the operator-supplied model key and is validated separately
//! because it never carries a kind prefix.
//!
//! ## Invariants
//! - A constructed identifier always round-trips to the string it was parsed
//!   from.
//! - No identifier accepts wildcard characters.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Tag prefix for machine identities.
pub const MACHINE_TAG_PREFIX: &str = "machine-";
/// Tag prefix for controller identities.
pub const CONTROLLER_TAG_PREFIX: &str = "controller-";
/// Tag prefix for model identities.
pub const MODEL_TAG_PREFIX: &str = "model-";
/// Maximum length of any tag string (one path component).
pub const MAX_TAG_LENGTH: usize = 255;
/// Maximum length of an operator-supplied model identifier.
pub const MAX_MODEL_ID_LENGTH: usize = 128;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Identifier parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// Tag string does not parse for the expected kind.
    #[error("invalid {kind} tag \"{value}\": {reason}")]
    InvalidTag {
        /// Tag kind label (`machine`, `controller`, `model`).
        kind: &'static str,
        /// Offending input.
        value: String,
        /// Reason the input was rejected.
        reason: &'static str,
    },
    /// Model identifier is not a complete, well-formed key.
    #[error("invalid model identifier \"{value}\": {reason}")]
    InvalidModelId {
        /// Offending input.
        value: String,
        /// Reason the input was rejected.
        reason: &'static str,
    },
}

// ============================================================================
// SECTION: Machine Tag
// ============================================================================

/// Identity tag of one machine (cluster node).
///
/// # Invariants
/// - `id` is a machine number without leading zeros, optionally followed by
///   `/<kind>/<number>` container segments.
/// - The tag form replaces `/` with `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MachineTag {
    /// Machine id in slash form (`0/lxd/2`).
    id: String,
}

impl MachineTag {
    /// Parses a machine tag string such as `machine-3` or `machine-0-lxd-2`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidTag`] when the string is not a
    /// machine tag.
    pub fn parse(tag: &str) -> Result<Self, IdentifierError> {
        let invalid = |reason| IdentifierError::InvalidTag {
            kind: "machine",
            value: tag.to_string(),
            reason,
        };
        if tag.len() > MAX_TAG_LENGTH {
            return Err(invalid("tag exceeds max length"));
        }
        let Some(rest) = tag.strip_prefix(MACHINE_TAG_PREFIX) else {
            return Err(invalid("missing machine- prefix"));
        };
        let id = rest.replace('-', "/");
        validate_machine_id(&id).map_err(invalid)?;
        Ok(Self {
            id,
        })
    }

    /// Returns the machine id in slash form.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the tag string (`machine-<id>`).
    #[must_use]
    pub fn as_tag(&self) -> String {
        format!("{MACHINE_TAG_PREFIX}{}", self.id.replace('/', "-"))
    }
}

impl fmt::Display for MachineTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_tag())
    }
}

/// Validates a machine id in slash form.
fn validate_machine_id(id: &str) -> Result<(), &'static str> {
    let mut segments = id.split('/');
    let machine = segments.next().unwrap_or_default();
    if !is_canonical_number(machine) {
        return Err("machine number must be decimal without leading zeros");
    }
    while let Some(kind) = segments.next() {
        if kind.is_empty() || !kind.bytes().all(|byte| byte.is_ascii_lowercase()) {
            return Err("container kind must be lowercase ascii letters");
        }
        let Some(number) = segments.next() else {
            return Err("container segment is missing its number");
        };
        if !is_canonical_number(number) {
            return Err("container number must be decimal without leading zeros");
        }
    }
    Ok(())
}

/// Returns true when `value` is a non-empty decimal without leading zeros.
fn is_canonical_number(value: &str) -> bool {
    !value.is_empty()
        && value.bytes().all(|byte| byte.is_ascii_digit())
        && (value == "0" || !value.starts_with('0'))
}

// ============================================================================
// SECTION: UUID Tags
// ============================================================================

/// Parses a `<prefix><uuid>` tag and returns the canonical UUID string.
fn parse_uuid_tag(
    kind: &'static str,
    prefix: &str,
    tag: &str,
) -> Result<String, IdentifierError> {
    let invalid = |reason| IdentifierError::InvalidTag {
        kind,
        value: tag.to_string(),
        reason,
    };
    let Some(raw) = tag.strip_prefix(prefix) else {
        return Err(invalid("missing tag prefix"));
    };
    let parsed = Uuid::try_parse(raw).map_err(|_| invalid("not a uuid"))?;
    let canonical = parsed.hyphenated().to_string();
    if canonical != raw {
        return Err(invalid("uuid must be lowercase and hyphenated"));
    }
    Ok(canonical)
}

/// Tag of the controller a machine belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ControllerTag {
    /// Controller UUID (lowercase, hyphenated).
    uuid: String,
}

impl ControllerTag {
    /// Parses a `controller-<uuid>` tag.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidTag`] when the tag is malformed.
    pub fn parse(tag: &str) -> Result<Self, IdentifierError> {
        parse_uuid_tag("controller", CONTROLLER_TAG_PREFIX, tag).map(|uuid| Self {
            uuid,
        })
    }

    /// Returns the controller UUID.
    #[must_use]
    pub fn uuid(&self) -> &str {
        &self.uuid
    }
}

impl fmt::Display for ControllerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CONTROLLER_TAG_PREFIX}{}", self.uuid)
    }
}

/// Tag of a model (used for the controller model in agent config).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelTag {
    /// Model UUID (lowercase, hyphenated).
    uuid: String,
}

impl ModelTag {
    /// Parses a `model-<uuid>` tag.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidTag`] when the tag is malformed.
    pub fn parse(tag: &str) -> Result<Self, IdentifierError> {
        parse_uuid_tag("model", MODEL_TAG_PREFIX, tag).map(|uuid| Self {
            uuid,
        })
    }

    /// Returns the model UUID.
    #[must_use]
    pub fn uuid(&self) -> &str {
        &self.uuid
    }
}

impl fmt::Display for ModelTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{MODEL_TAG_PREFIX}{}", self.uuid)
    }
}

// ============================================================================
// SECTION: Model Identifier
// ============================================================================

/// Operator-supplied key of the model whose agent version is forced.
///
/// # Invariants
/// - 1 to [`MAX_MODEL_ID_LENGTH`] bytes of `[a-z0-9-]`.
/// - Starts and ends with an ASCII lowercase letter or digit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(String);

impl ModelId {
    /// Parses an operator-supplied model key.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidModelId`] when the key is empty, too
    /// long, or contains characters outside `[a-z0-9-]`.
    pub fn parse(value: &str) -> Result<Self, IdentifierError> {
        let invalid = |reason| IdentifierError::InvalidModelId {
            value: value.to_string(),
            reason,
        };
        if value.is_empty() {
            return Err(invalid("identifier is empty"));
        }
        if value.len() > MAX_MODEL_ID_LENGTH {
            return Err(invalid("identifier exceeds max length"));
        }
        let allowed = |byte: u8| byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'-';
        if !value.bytes().all(allowed) {
            return Err(invalid("identifier must contain only [a-z0-9-]"));
        }
        if value.starts_with('-') || value.ends_with('-') {
            return Err(invalid("identifier must start and end with a letter or digit"));
        }
        Ok(Self(value.to_string()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
