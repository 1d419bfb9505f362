// crates/version-override-core/src/core/mod.rs
// ============================================================================
// Module: Version Override Core Types
// Description: Identifiers, versions, credentials, and error kinds.
// Purpose: Provide strongly typed values shared by every pipeline stage.
// Dependencies: semver, serde, uuid
// ============================================================================

//! ## Overview
//! Core types are parsed strictly at the boundary where they enter the
//! process (directory listings, agent config files, CLI arguments) and are
//! immutable afterwards.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod credentials;
pub mod errors;
pub mod identifiers;
pub mod version;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use credentials::AddressError;
pub use credentials::ConnectionCredentials;
pub use credentials::Secret;
pub use credentials::StoreAddress;
pub use errors::ErrorKind;
pub use errors::InputError;
pub use identifiers::ControllerTag;
pub use identifiers::IdentifierError;
pub use identifiers::MachineTag;
pub use identifiers::ModelId;
pub use identifiers::ModelTag;
pub use version::AgentVersion;
