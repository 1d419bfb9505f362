// crates/version-override-config/src/lib.rs
// ============================================================================
// Module: Version Override Config Library
// Description: Local machine identity and agent config loading.
// Purpose: Turn on-disk agent state into validated store credentials.
// Dependencies: version-override-core, serde, serde_yaml
// ============================================================================

//! ## Overview
//! `version-override-config` reads the local filesystem state that the
//! override tool depends on: which machine this host is, and the store
//! credentials persisted in that machine's agent config. It never writes.
//!
//! Security posture: agent config files are trusted for content but still
//! size-limited and parsed fail-closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod agent_config;
pub mod identity;
pub mod settings;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use agent_config::*;
pub use identity::*;
pub use settings::*;
