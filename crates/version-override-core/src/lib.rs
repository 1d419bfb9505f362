// crates/version-override-core/src/lib.rs
// ============================================================================
// Module: Version Override Core Library
// Description: Public API surface for the version override core.
// Purpose: Expose core types, interfaces, logging, and the targeted mutator.
// Dependencies: crate::{core, interfaces, logging, runtime}
// ============================================================================

//! ## Overview
//! Version override core holds the backend-agnostic pieces of the break-glass
//! agent-version override: strongly typed identifiers, connection credentials,
//! the store interfaces, the operator log sink, and the targeted mutator that
//! forces one model's `agent-version`. Store backends and filesystem discovery
//! live in sibling crates and integrate through [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod logging;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::ConnectError;
pub use interfaces::ModelScope;
pub use interfaces::ModelStore;
pub use interfaces::StoreConnector;
pub use interfaces::StoreError;
pub use interfaces::TransportError;
pub use interfaces::WriteOutcome;
pub use logging::LogEvent;
pub use logging::LogLevel;
pub use logging::MemoryLogSink;
pub use logging::OperatorLog;
pub use logging::Stage;
pub use logging::StderrLogSink;
pub use runtime::InMemoryConnector;
pub use runtime::AGENT_VERSION_KEY;
pub use runtime::InMemoryModelStore;
pub use runtime::ModelRecord;
pub use runtime::MutateError;
pub use runtime::force_agent_version;
