// crates/version-override-core/src/runtime/store.rs
// ============================================================================
// Module: Version Override In-Memory Store
// Description: In-memory model store and connector for tests and demos.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! This module provides an in-memory implementation of [`ModelStore`] and
//! [`StoreConnector`]. Clones share one backend, so a test can keep a handle,
//! hand a session to the pipeline, and inspect the result afterwards. It also
//! counts calls and can inject failures. It is not intended for production
//! use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use crate::core::AgentVersion;
use crate::core::ConnectionCredentials;
use crate::core::ModelId;
use crate::interfaces::ConnectError;
use crate::interfaces::ModelScope;
use crate::interfaces::ModelStore;
use crate::interfaces::StoreConnector;
use crate::interfaces::StoreError;
use crate::interfaces::WriteOutcome;
use crate::runtime::mutator::AGENT_VERSION_KEY;

// ============================================================================
// SECTION: Records
// ============================================================================

/// One model config record held by the in-memory store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRecord {
    /// Controller that owns the model.
    pub controller_uuid: String,
    /// Model config settings.
    pub settings: BTreeMap<String, String>,
    /// Record revision, bumped by every write that changes a setting.
    pub revision: i64,
}

/// Shared backend state.
#[derive(Debug, Default)]
struct Backend {
    /// Records keyed by model identifier.
    records: BTreeMap<String, ModelRecord>,
    /// Bump the revision just before the next write.
    concurrent_update: bool,
    /// Reject writes with this reason.
    reject_writes: Option<String>,
    /// Number of resolve calls.
    resolve_calls: usize,
    /// Number of write calls.
    write_calls: usize,
    /// Number of sessions closed explicitly.
    close_calls: usize,
}

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory model store for tests and examples.
#[derive(Debug, Clone)]
pub struct InMemoryModelStore {
    /// Controller this handle is scoped to.
    controller_uuid: String,
    /// Shared backend protected by a mutex.
    backend: Arc<Mutex<Backend>>,
}

impl InMemoryModelStore {
    /// Creates an empty store scoped to `controller_uuid`.
    #[must_use]
    pub fn new(controller_uuid: &str) -> Self {
        Self {
            controller_uuid: controller_uuid.to_string(),
            backend: Arc::new(Mutex::new(Backend::default())),
        }
    }

    /// Returns a handle sharing this backend but scoped to another controller.
    #[must_use]
    pub fn bound_to(&self, controller_uuid: &str) -> Self {
        Self {
            controller_uuid: controller_uuid.to_string(),
            backend: Arc::clone(&self.backend),
        }
    }

    /// Inserts or replaces a model record at revision 1.
    pub fn insert_model(
        &self,
        model: &ModelId,
        controller_uuid: &str,
        settings: BTreeMap<String, String>,
    ) {
        if let Ok(mut backend) = self.backend.lock() {
            backend.records.insert(
                model.as_str().to_string(),
                ModelRecord {
                    controller_uuid: controller_uuid.to_string(),
                    settings,
                    revision: 1,
                },
            );
        }
    }

    /// Returns a copy of the record for `model`.
    #[must_use]
    pub fn record(&self, model: &ModelId) -> Option<ModelRecord> {
        self.backend.lock().ok().and_then(|backend| backend.records.get(model.as_str()).cloned())
    }

    /// Returns the stored agent version for `model`.
    #[must_use]
    pub fn agent_version(&self, model: &ModelId) -> Option<String> {
        self.record(model).and_then(|record| record.settings.get(AGENT_VERSION_KEY).cloned())
    }

    /// Makes the next write observe a revision bumped by another writer.
    pub fn simulate_concurrent_update(&self) {
        if let Ok(mut backend) = self.backend.lock() {
            backend.concurrent_update = true;
        }
    }

    /// Makes every subsequent write fail with `reason`.
    pub fn reject_writes(&self, reason: &str) {
        if let Ok(mut backend) = self.backend.lock() {
            backend.reject_writes = Some(reason.to_string());
        }
    }

    /// Returns the number of resolve calls made against the backend.
    #[must_use]
    pub fn resolve_calls(&self) -> usize {
        self.backend.lock().map(|backend| backend.resolve_calls).unwrap_or_default()
    }

    /// Returns the number of write calls made against the backend.
    #[must_use]
    pub fn write_calls(&self) -> usize {
        self.backend.lock().map(|backend| backend.write_calls).unwrap_or_default()
    }

    /// Returns the number of sessions closed explicitly.
    #[must_use]
    pub fn close_calls(&self) -> usize {
        self.backend.lock().map(|backend| backend.close_calls).unwrap_or_default()
    }

    /// Locks the backend.
    fn lock(&self) -> Result<MutexGuard<'_, Backend>, StoreError> {
        self.backend.lock().map_err(|_| StoreError::Io("model store mutex poisoned".to_string()))
    }
}

impl ModelStore for InMemoryModelStore {
    fn resolve_model(&mut self, model: &ModelId) -> Result<Option<ModelScope>, StoreError> {
        let mut backend = self.lock()?;
        backend.resolve_calls += 1;
        let scope = backend
            .records
            .get(model.as_str())
            .filter(|record| record.controller_uuid == self.controller_uuid)
            .map(|record| ModelScope {
                model: model.clone(),
                revision: record.revision,
            });
        Ok(scope)
    }

    fn write_agent_version(
        &mut self,
        scope: &ModelScope,
        version: &AgentVersion,
    ) -> Result<WriteOutcome, StoreError> {
        let mut backend = self.lock()?;
        backend.write_calls += 1;
        if let Some(reason) = backend.reject_writes.clone() {
            return Err(StoreError::Rejected(reason));
        }
        let concurrent = std::mem::take(&mut backend.concurrent_update);
        let Some(record) = backend.records.get_mut(scope.model.as_str()) else {
            return Ok(WriteOutcome::RevisionConflict);
        };
        if concurrent {
            record.revision += 1;
        }
        if record.controller_uuid != self.controller_uuid || record.revision != scope.revision {
            return Ok(WriteOutcome::RevisionConflict);
        }
        let rendered = version.to_string();
        if record.settings.get(AGENT_VERSION_KEY) != Some(&rendered) {
            record.settings.insert(AGENT_VERSION_KEY.to_string(), rendered);
            record.revision += 1;
        }
        Ok(WriteOutcome::Applied {
            revision: record.revision,
        })
    }

    fn close(self) -> Result<(), StoreError> {
        self.lock()?.close_calls += 1;
        Ok(())
    }
}

// ============================================================================
// SECTION: In-Memory Connector
// ============================================================================

/// Connector handing out sessions on an [`InMemoryModelStore`].
#[derive(Debug, Clone)]
pub struct InMemoryConnector {
    /// Backend shared with every session.
    store: InMemoryModelStore,
    /// Number of connection attempts.
    attempts: Arc<AtomicUsize>,
    /// Fail every connection attempt with this reason.
    fail_with: Option<String>,
}

impl InMemoryConnector {
    /// Creates a connector over `store`.
    #[must_use]
    pub fn new(store: InMemoryModelStore) -> Self {
        Self {
            store,
            attempts: Arc::new(AtomicUsize::new(0)),
            fail_with: None,
        }
    }

    /// Creates a connector whose every attempt fails with `reason`.
    #[must_use]
    pub fn failing(store: InMemoryModelStore, reason: &str) -> Self {
        Self {
            fail_with: Some(reason.to_string()),
            ..Self::new(store)
        }
    }

    /// Returns the number of connection attempts made.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl StoreConnector for InMemoryConnector {
    type Session = InMemoryModelStore;

    fn connect(&self, credentials: &ConnectionCredentials) -> Result<Self::Session, ConnectError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.fail_with {
            return Err(ConnectError::Dial {
                endpoints: credentials.endpoints_label(),
                source: reason.clone().into(),
            });
        }
        Ok(self.store.bound_to(credentials.controller.uuid()))
    }
}
