// crates/version-override-core/src/interfaces/mod.rs
// ============================================================================
// Module: Version Override Interfaces
// Description: Backend-agnostic store session and connector contracts.
// Purpose: Let the mutator run against any store without backend details.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! A [`StoreConnector`] opens exactly one [`ModelStore`] session per run from
//! loaded [`ConnectionCredentials`]. The session exposes only the two
//! operations the override needs: resolving a model's config record and
//! issuing a revision-guarded write of its `agent-version`.
//!
//! ## Invariants
//! - Sessions are owned and single-use; `close` consumes the session and
//!   dropping an unclosed session releases it.
//! - `write_agent_version` touches one record and no field other than
//!   `agent-version` and the record revision.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::AgentVersion;
use crate::core::ConnectionCredentials;
use crate::core::ErrorKind;
use crate::core::ModelId;

// ============================================================================
// SECTION: Model Store
// ============================================================================

/// Store session errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O or transport error.
    #[error("model store io error: {0}")]
    Io(String),
    /// Store refused the operation (permissions, constraints).
    #[error("model store rejected operation: {0}")]
    Rejected(String),
    /// Store data is invalid for this operation.
    #[error("model store invalid data: {0}")]
    Invalid(String),
}

/// Resolved handle to one model's config record.
///
/// # Invariants
/// - `revision` is the record revision observed at resolution time and is the
///   compare value for the guarded write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelScope {
    /// Model the record belongs to.
    pub model: ModelId,
    /// Record revision observed when the model was resolved.
    pub revision: i64,
}

/// Result of a revision-guarded write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The write was applied; carries the new record revision.
    Applied {
        /// Record revision after the write.
        revision: i64,
    },
    /// The record revision no longer matched; nothing was written.
    RevisionConflict,
}

/// Session to the replicated model store.
pub trait ModelStore {
    /// Resolves the config record of exactly `model` within the session's
    /// controller. Returns `None` when no such record exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn resolve_model(&mut self, model: &ModelId) -> Result<Option<ModelScope>, StoreError>;

    /// Sets `agent-version` on the resolved record if its revision still
    /// matches `scope.revision`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store fails or rejects the write.
    fn write_agent_version(
        &mut self,
        scope: &ModelScope,
        version: &AgentVersion,
    ) -> Result<WriteOutcome, StoreError>;

    /// Closes the session.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the session does not shut down cleanly.
    fn close(self) -> Result<(), StoreError>
    where
        Self: Sized;
}

// ============================================================================
// SECTION: Store Connector
// ============================================================================

/// Boxed transport error kept for diagnostics.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Store connection errors.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Dialing or authenticating against the store failed.
    #[error("dialing store at {endpoints} failed: {source}")]
    Dial {
        /// Endpoints that were tried.
        endpoints: String,
        /// Underlying transport error.
        #[source]
        source: TransportError,
    },
    /// TLS is required but no CA certificate is available.
    #[error("store tls is required but no ca certificate is configured")]
    TlsUnavailable,
    /// TLS client configuration could not be built.
    #[error("store tls setup failed: {0}")]
    Tls(String),
}

impl ConnectError {
    /// Returns the failure classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::ConnectionFailed
    }
}

/// Opens store sessions from loaded credentials.
pub trait StoreConnector {
    /// Session type produced by this connector.
    type Session: ModelStore;

    /// Opens one authenticated session.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError`] when the session cannot be established.
    fn connect(&self, credentials: &ConnectionCredentials) -> Result<Self::Session, ConnectError>;
}
