// crates/version-override-store-postgres/src/connector.rs
// ============================================================================
// Module: Postgres Store Connector
// Description: Dial policy and authenticated session setup for PostgreSQL.
// Purpose: Open one store session from loaded machine credentials.
// Dependencies: version-override-core, postgres, rustls, tokio-postgres-rustls
// ============================================================================

//! ## Overview
//! [`PostgresConnector`] turns [`ConnectionCredentials`] into one
//! [`PostgresModelStore`] session under a fixed [`DialPolicy`]. Every store
//! address is handed to the driver, which tries them in order and keeps the
//! first writable primary (`target_session_attrs=read-write`). That host
//! iteration is the only retry; a failed dial is reported, not repeated.
//!
//! Security posture: TLS is required by default and verified against the CA
//! from the agent config. Without a CA the connector refuses to dial rather
//! than falling back to plaintext.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use postgres::Config;
use postgres::NoTls;
use postgres::config::SslMode;
use postgres::config::TargetSessionAttrs;
use rustls::ClientConfig;
use rustls::RootCertStore;
use rustls_pki_types::CertificateDer;
use rustls_pki_types::pem::PemObject;
use tokio_postgres_rustls::MakeRustlsConnect;
use version_override_core::ConnectError;
use version_override_core::ConnectionCredentials;
use version_override_core::StoreConnector;

use crate::session::PostgresModelStore;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default connect timeout per endpoint.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default server-side statement timeout.
pub const DEFAULT_STATEMENT_TIMEOUT: Duration = Duration::from_secs(21);
/// Default database holding controller state.
pub const DEFAULT_DATABASE: &str = "controller";
/// Application name reported to the server.
pub const APPLICATION_NAME: &str = "force-agent-version";

// ============================================================================
// SECTION: Dial Policy
// ============================================================================

/// Fixed connection parameters applied to every dial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialPolicy {
    /// Connect timeout per endpoint.
    pub connect_timeout: Duration,
    /// Server-side statement timeout.
    pub statement_timeout: Duration,
    /// Enables TCP keepalives.
    pub keepalives: bool,
    /// Refuses to dial without verified TLS.
    pub require_tls: bool,
    /// Database name.
    pub database: String,
}

impl Default for DialPolicy {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            statement_timeout: DEFAULT_STATEMENT_TIMEOUT,
            keepalives: true,
            require_tls: true,
            database: DEFAULT_DATABASE.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Connector
// ============================================================================

/// Store connector backed by PostgreSQL.
#[derive(Debug, Clone, Default)]
pub struct PostgresConnector {
    /// Dial policy.
    policy: DialPolicy,
}

impl PostgresConnector {
    /// Creates a connector with `policy`.
    #[must_use]
    pub const fn new(policy: DialPolicy) -> Self {
        Self {
            policy,
        }
    }

    /// Returns the dial policy.
    #[must_use]
    pub const fn policy(&self) -> &DialPolicy {
        &self.policy
    }

    /// Builds the driver configuration for `credentials`.
    ///
    /// The machine tag is the store user; all addresses are listed in config
    /// order.
    #[must_use]
    pub fn session_config(&self, credentials: &ConnectionCredentials) -> Config {
        let mut config = Config::new();
        for address in &credentials.addresses {
            config.host(&address.host);
            config.port(address.port);
        }
        config.user(&credentials.tag.as_tag());
        config.password(credentials.password.expose());
        config.dbname(&self.policy.database);
        config.application_name(APPLICATION_NAME);
        config.connect_timeout(self.policy.connect_timeout);
        config.keepalives(self.policy.keepalives);
        config.target_session_attrs(TargetSessionAttrs::ReadWrite);
        config.options(&format!(
            "-c statement_timeout={}",
            self.policy.statement_timeout.as_millis()
        ));
        config.ssl_mode(if self.policy.require_tls { SslMode::Require } else { SslMode::Prefer });
        config
    }
}

impl StoreConnector for PostgresConnector {
    type Session = PostgresModelStore;

    fn connect(&self, credentials: &ConnectionCredentials) -> Result<Self::Session, ConnectError> {
        let mut config = self.session_config(credentials);
        let dialed = match credentials.ca_cert.as_deref() {
            Some(pem) => config.connect(MakeRustlsConnect::new(tls_client_config(pem)?)),
            None if self.policy.require_tls => return Err(ConnectError::TlsUnavailable),
            None => {
                config.ssl_mode(SslMode::Disable);
                config.connect(NoTls)
            }
        };
        let client = dialed.map_err(|err| ConnectError::Dial {
            endpoints: credentials.endpoints_label(),
            source: Box::new(err),
        })?;
        Ok(PostgresModelStore::new(client, credentials.controller.uuid()))
    }
}

// ============================================================================
// SECTION: TLS
// ============================================================================

/// Builds a rustls client config trusting only the CA certificates in `pem`.
///
/// # Errors
///
/// Returns [`ConnectError::Tls`] when the PEM holds no usable certificate or
/// the client config cannot be built.
pub fn tls_client_config(pem: &str) -> Result<ClientConfig, ConnectError> {
    let mut roots = RootCertStore::empty();
    for cert in CertificateDer::pem_slice_iter(pem.as_bytes()) {
        let cert = cert.map_err(|err| ConnectError::Tls(format!("invalid ca pem: {err}")))?;
        roots.add(cert).map_err(|err| ConnectError::Tls(format!("invalid ca cert: {err}")))?;
    }
    if roots.is_empty() {
        return Err(ConnectError::Tls("no ca certificates in agent config".to_string()));
    }
    let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|err| ConnectError::Tls(err.to_string()))?
        .with_root_certificates(roots)
        .with_no_client_auth();
    Ok(config)
}
