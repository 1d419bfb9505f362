// crates/version-override-core/src/runtime/mod.rs
// ============================================================================
// Module: Version Override Runtime
// Description: Targeted mutator and in-memory store implementations.
// Purpose: Execute the guarded agent-version write against a store session.
// Dependencies: crate::{core, interfaces, logging}
// ============================================================================

//! ## Overview
//! The runtime holds the only mutating logic of the override. Store backends
//! plug in through [`crate::interfaces::ModelStore`]; the in-memory store
//! serves tests and local demos.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod mutator;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use mutator::AGENT_VERSION_KEY;
pub use mutator::MutateError;
pub use mutator::force_agent_version;
pub use store::InMemoryConnector;
pub use store::InMemoryModelStore;
pub use store::ModelRecord;
