// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared fixtures for live-store system tests.
// Purpose: Start a disposable store and shape it like a controller.
// Dependencies: testcontainers, postgres
// ============================================================================

//! Fixtures shared by the live-store test binaries.

#![allow(dead_code, reason = "Helpers are shared across test binaries.")]

/// PostgreSQL container fixture.
pub mod infra;
