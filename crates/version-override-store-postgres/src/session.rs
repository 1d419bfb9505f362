// crates/version-override-store-postgres/src/session.rs
// ============================================================================
// Module: Postgres Model Store Session
// Description: ModelStore implementation over one PostgreSQL connection.
// Purpose: Resolve a model config record and apply the guarded write.
// Dependencies: version-override-core, postgres
// ============================================================================

//! ## Overview
//! A [`PostgresModelStore`] wraps one authenticated [`postgres::Client`] and
//! the controller the credentials belong to. Model lookups are scoped to that
//! controller, so a model of another controller sharing the cluster never
//! resolves.
//!
//! Model config lives in the `settings` table as one JSONB document per
//! model (row id `e`) with a monotonically increasing `revision`. The write
//! uses `jsonb_set` on the single `agent-version` key and is conditioned on
//! the revision observed at resolution; every other key is left untouched.
//! The update runs in its own transaction and is only committed when it
//! matched exactly one record.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use postgres::Client;
use postgres::error::SqlState;
use version_override_core::AgentVersion;
use version_override_core::ModelId;
use version_override_core::ModelScope;
use version_override_core::ModelStore;
use version_override_core::StoreError;
use version_override_core::WriteOutcome;

// ============================================================================
// SECTION: Statements
// ============================================================================

/// Looks up the config record revision of one model of one controller.
const RESOLVE_MODEL_SQL: &str = "SELECT s.revision FROM models m JOIN settings s ON s.model_uuid \
                                 = m.uuid AND s.id = 'e' WHERE m.uuid = $1 AND m.controller_uuid \
                                 = $2";

/// Sets `agent-version` if the record revision is unchanged. The revision only
/// moves when the stored value differs, so repeating a write is a no-op.
const WRITE_AGENT_VERSION_SQL: &str = "UPDATE settings SET settings = jsonb_set(settings, \
                                       '{agent-version}', to_jsonb($2::text), true), revision = \
                                       revision + CASE WHEN settings->>'agent-version' IS \
                                       DISTINCT FROM $2::text THEN 1 ELSE 0 END WHERE model_uuid = \
                                       $1 AND id = 'e' AND revision = $3 RETURNING revision";

// ============================================================================
// SECTION: Session
// ============================================================================

/// Model store session over one PostgreSQL connection.
pub struct PostgresModelStore {
    /// Authenticated client.
    client: Client,
    /// Controller the session is scoped to.
    controller_uuid: String,
}

impl PostgresModelStore {
    /// Wraps an authenticated client scoped to `controller_uuid`.
    #[must_use]
    pub fn new(client: Client, controller_uuid: impl Into<String>) -> Self {
        Self {
            client,
            controller_uuid: controller_uuid.into(),
        }
    }

    /// Returns the controller the session is scoped to.
    #[must_use]
    pub fn controller_uuid(&self) -> &str {
        &self.controller_uuid
    }
}

impl fmt::Debug for PostgresModelStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresModelStore")
            .field("controller_uuid", &self.controller_uuid)
            .field("closed", &self.client.is_closed())
            .finish_non_exhaustive()
    }
}

impl ModelStore for PostgresModelStore {
    fn resolve_model(&mut self, model: &ModelId) -> Result<Option<ModelScope>, StoreError> {
        let row = self
            .client
            .query_opt(RESOLVE_MODEL_SQL, &[&model.as_str(), &self.controller_uuid.as_str()])
            .map_err(|err| store_error(&err))?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(ModelScope {
            model: model.clone(),
            revision: row.try_get(0).map_err(|err| store_error(&err))?,
        }))
    }

    fn write_agent_version(
        &mut self,
        scope: &ModelScope,
        version: &AgentVersion,
    ) -> Result<WriteOutcome, StoreError> {
        let rendered = version.to_string();
        let mut tx = self.client.transaction().map_err(|err| store_error(&err))?;
        let rows = tx
            .query(WRITE_AGENT_VERSION_SQL, &[&scope.model.as_str(), &rendered, &scope.revision])
            .map_err(|err| store_error(&err))?;
        let outcome = match rows.as_slice() {
            [] => WriteOutcome::RevisionConflict,
            [row] => WriteOutcome::Applied {
                revision: row.try_get(0).map_err(|err| store_error(&err))?,
            },
            // Dropping the transaction rolls the multi-record update back.
            more => {
                return Err(StoreError::Invalid(format!(
                    "guarded write matched {} config records for one model",
                    more.len()
                )));
            }
        };
        tx.commit().map_err(|err| store_error(&err))?;
        Ok(outcome)
    }

    fn close(self) -> Result<(), StoreError> {
        self.client.close().map_err(|err| store_error(&err))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Classifies a driver error.
fn store_error(err: &postgres::Error) -> StoreError {
    match err.code() {
        Some(code)
            if code == &SqlState::INSUFFICIENT_PRIVILEGE
                || code == &SqlState::READ_ONLY_SQL_TRANSACTION =>
        {
            StoreError::Rejected(err.to_string())
        }
        _ => StoreError::Io(err.to_string()),
    }
}
