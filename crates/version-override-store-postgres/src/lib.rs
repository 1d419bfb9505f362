// crates/version-override-store-postgres/src/lib.rs
// ============================================================================
// Module: Version Override Postgres Store Library
// Description: PostgreSQL-backed store connector and model store session.
// Purpose: Reach the replicated controller store with machine credentials.
// Dependencies: version-override-core, postgres, rustls, tokio-postgres-rustls
// ============================================================================

//! ## Overview
//! `version-override-store-postgres` implements the core
//! [`version_override_core::StoreConnector`] and
//! [`version_override_core::ModelStore`] contracts against PostgreSQL with
//! the synchronous `postgres` client. TLS runs over rustls.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod connector;
pub mod session;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use connector::APPLICATION_NAME;
pub use connector::DEFAULT_CONNECT_TIMEOUT;
pub use connector::DEFAULT_DATABASE;
pub use connector::DEFAULT_STATEMENT_TIMEOUT;
pub use connector::DialPolicy;
pub use connector::PostgresConnector;
pub use connector::tls_client_config;
pub use session::PostgresModelStore;
