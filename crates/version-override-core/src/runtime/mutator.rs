// crates/version-override-core/src/runtime/mutator.rs
// ============================================================================
// Module: Targeted Mutator
// Description: Forces one model's agent-version through a guarded write.
// Purpose: Perform the single break-glass mutation of the override tool.
// Dependencies: crate::{core, interfaces, logging}, thiserror
// ============================================================================

//! ## Overview
//! [`force_agent_version`] resolves exactly one model and overwrites its
//! `agent-version` with one revision-guarded write.
//!
//! This is an explicit override. The prior version is never read and no
//! upgrade-safety checks run: the tool exists for the cases where the normal
//! negotiation path cannot. Operators own the consequences of the value they
//! force.
//!
//! ## Invariants
//! - Malformed identifiers are rejected before the store is touched.
//! - At most one write is issued; nothing is retried.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::AgentVersion;
use crate::core::ErrorKind;
use crate::core::ModelId;
use crate::interfaces::ModelStore;
use crate::interfaces::WriteOutcome;
use crate::logging::LogEvent;
use crate::logging::LogLevel;
use crate::logging::OperatorLog;
use crate::logging::Stage;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Model config key holding the target agent version.
pub const AGENT_VERSION_KEY: &str = "agent-version";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Targeted mutation errors.
#[derive(Debug, Error)]
pub enum MutateError {
    /// Model identifier is malformed or does not resolve to a record.
    #[error("model \"{model}\" not found: {reason}")]
    DeploymentNotFound {
        /// Operator-supplied model identifier.
        model: String,
        /// Why the model did not resolve.
        reason: String,
    },
    /// The store failed or refused the write.
    #[error("writing agent-version for model \"{model}\" failed: {reason}")]
    WriteFailed {
        /// Operator-supplied model identifier.
        model: String,
        /// Store diagnostic.
        reason: String,
    },
}

impl MutateError {
    /// Returns the failure classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::DeploymentNotFound {
                ..
            } => ErrorKind::DeploymentNotFound,
            Self::WriteFailed {
                ..
            } => ErrorKind::WriteFailed,
        }
    }
}

// ============================================================================
// SECTION: Mutator
// ============================================================================

/// Forces the agent version of `model` to `version`.
///
/// # Errors
///
/// Returns [`MutateError::DeploymentNotFound`] when `model` is malformed or
/// unknown to the session's controller, and [`MutateError::WriteFailed`] when
/// the store fails during resolution or rejects the guarded write.
pub fn force_agent_version<S: ModelStore>(
    session: &mut S,
    model: &str,
    version: &AgentVersion,
    log: &dyn OperatorLog,
) -> Result<(), MutateError> {
    let model_id = ModelId::parse(model).map_err(|err| MutateError::DeploymentNotFound {
        model: model.to_string(),
        reason: err.to_string(),
    })?;
    let write_failed = |reason: String| MutateError::WriteFailed {
        model: model.to_string(),
        reason,
    };

    log.record(
        &LogEvent::new(LogLevel::Trace, Stage::Mutate, "resolving model")
            .with_field("model", model_id.as_str()),
    );
    let scope = session
        .resolve_model(&model_id)
        .map_err(|err| write_failed(err.to_string()))?
        .ok_or_else(|| MutateError::DeploymentNotFound {
            model: model.to_string(),
            reason: "no model config record in this controller".to_string(),
        })?;
    log.record(
        &LogEvent::new(LogLevel::Debug, Stage::Mutate, "resolved model config record")
            .with_field("model", model_id.as_str())
            .with_field("revision", scope.revision.to_string()),
    );

    match session.write_agent_version(&scope, version) {
        Ok(WriteOutcome::Applied {
            revision,
        }) => {
            log.record(
                &LogEvent::new(LogLevel::Info, Stage::Mutate, "set model agent version")
                    .with_field("model", model_id.as_str())
                    .with_field("version", version.to_string())
                    .with_field("revision", revision.to_string()),
            );
            Ok(())
        }
        Ok(WriteOutcome::RevisionConflict) => Err(write_failed(format!(
            "model config record changed after resolution (revision {})",
            scope.revision
        ))),
        Err(err) => Err(write_failed(err.to_string())),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        reason = "Test-only assertions are permitted."
    )]

    use std::collections::BTreeMap;

    use super::AGENT_VERSION_KEY;
    use super::MutateError;
    use super::force_agent_version;
    use crate::core::AgentVersion;
    use crate::core::ErrorKind;
    use crate::core::ModelId;
    use crate::logging::MemoryLogSink;
    use crate::runtime::store::InMemoryModelStore;

    const CONTROLLER: &str = "6f0f4a4c-4d1e-4b7a-9a53-2c1d5e0f9b11";

    fn seeded(model: &str, version: &str) -> InMemoryModelStore {
        let store = InMemoryModelStore::new(CONTROLLER);
        let mut settings = BTreeMap::new();
        settings.insert(AGENT_VERSION_KEY.to_string(), version.to_string());
        settings.insert("name".to_string(), "default".to_string());
        store.insert_model(&ModelId::parse(model).unwrap(), CONTROLLER, settings);
        store
    }

    #[test]
    fn malformed_model_is_not_found_without_store_access() {
        let mut store = seeded("model-abc-123", "2.9.4");
        let log = MemoryLogSink::new();
        let version = AgentVersion::parse("2.9.5").unwrap();
        let err = force_agent_version(&mut store, "model-*", &version, &log).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeploymentNotFound);
        assert!(log.events().is_empty());
        assert_eq!(store.resolve_calls(), 0);
    }

    #[test]
    fn unknown_model_is_not_found() {
        let mut store = seeded("model-abc-123", "2.9.4");
        let log = MemoryLogSink::new();
        let version = AgentVersion::parse("2.9.5").unwrap();
        let err = force_agent_version(&mut store, "model-abc-999", &version, &log).unwrap_err();
        assert!(matches!(err, MutateError::DeploymentNotFound { .. }));
    }

    #[test]
    fn model_from_other_controller_is_not_found() {
        let store = InMemoryModelStore::new(CONTROLLER);
        store.insert_model(
            &ModelId::parse("model-abc-123").unwrap(),
            "11111111-2222-4333-8444-555555555555",
            BTreeMap::new(),
        );
        let mut session = store.clone();
        let version = AgentVersion::parse("2.9.5").unwrap();
        let err = force_agent_version(&mut session, "model-abc-123", &version, &MemoryLogSink::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeploymentNotFound);
    }

    #[test]
    fn revision_conflict_is_write_failed() {
        let mut store = seeded("model-abc-123", "2.9.4");
        store.simulate_concurrent_update();
        let version = AgentVersion::parse("2.9.5").unwrap();
        let err = force_agent_version(&mut store, "model-abc-123", &version, &MemoryLogSink::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WriteFailed);
        assert_eq!(
            store.agent_version(&ModelId::parse("model-abc-123").unwrap()).as_deref(),
            Some("2.9.4")
        );
    }

    #[test]
    fn rejected_write_is_write_failed() {
        let mut store = seeded("model-abc-123", "2.9.4");
        store.reject_writes("permission denied for table settings");
        let version = AgentVersion::parse("2.9.5").unwrap();
        let err = force_agent_version(&mut store, "model-abc-123", &version, &MemoryLogSink::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WriteFailed);
        assert!(err.to_string().contains("permission denied"));
    }
}
