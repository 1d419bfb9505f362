// crates/version-override-cli/src/lib.rs
// ============================================================================
// Module: Version Override CLI Library
// Description: Override pipeline and message catalog behind the binary.
// Purpose: Keep the command logic testable without spawning a process.
// Dependencies: version-override-{core, config}, thiserror
// ============================================================================

//! ## Overview
//! The `force-agent-version` binary is a thin dispatcher over
//! [`pipeline::run_override`]. Everything that can fail lives here and
//! returns a classified error; only the binary maps failures to an exit code.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod i18n;
pub mod pipeline;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use pipeline::OverrideError;
pub use pipeline::OverrideOutcome;
pub use pipeline::OverrideRequest;
pub use pipeline::run_override;
