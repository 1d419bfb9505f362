// system-tests/src/lib.rs
// ============================================================================
// Module: Version Override System Tests Library
// Description: Controller store schema and seed helpers for live tests.
// Purpose: Shape a scratch PostgreSQL database like a controller store.
// Dependencies: postgres
// ============================================================================

//! ## Overview
//! System tests run the real connector and pipeline against a disposable
//! PostgreSQL instance. This crate holds the store layout they need: the
//! `models` and `settings` tables, a login role per machine tag, and helpers
//! to seed and inspect model config records through an admin connection.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod schema;
