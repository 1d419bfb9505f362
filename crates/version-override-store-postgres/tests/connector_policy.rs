//! Dial policy tests for version-override-store-postgres.
// crates/version-override-store-postgres/tests/connector_policy.rs
// ============================================================================
// Module: Connector Policy Tests
// Description: Validate session configuration and dial failure reporting.
// Purpose: Ensure the connector never dials without TLS unless told to and
//          reports unreachable stores as connection failures.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::use_debug,
    clippy::missing_docs_in_private_items,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::time::Duration;

use postgres::config::Host;
use postgres::config::SslMode;
use version_override_core::ConnectError;
use version_override_core::ConnectionCredentials;
use version_override_core::ControllerTag;
use version_override_core::ErrorKind;
use version_override_core::MachineTag;
use version_override_core::ModelTag;
use version_override_core::Secret;
use version_override_core::StoreAddress;
use version_override_core::StoreConnector;
use version_override_store_postgres::APPLICATION_NAME;
use version_override_store_postgres::DialPolicy;
use version_override_store_postgres::PostgresConnector;
use version_override_store_postgres::tls_client_config;

fn credentials(addresses: &[&str], ca_cert: Option<&str>) -> ConnectionCredentials {
    ConnectionCredentials {
        tag: MachineTag::parse("machine-3").unwrap(),
        addresses: addresses.iter().map(|address| StoreAddress::parse(address).unwrap()).collect(),
        password: Secret::new("state-secret"),
        ca_cert: ca_cert.map(str::to_string),
        controller: ControllerTag::parse("controller-6f0f4a4c-4d1e-4b7a-9a53-2c1d5e0f9b11")
            .unwrap(),
        controller_model: ModelTag::parse("model-0a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d").unwrap(),
    }
}

fn plaintext_policy() -> DialPolicy {
    DialPolicy {
        connect_timeout: Duration::from_secs(2),
        require_tls: false,
        ..DialPolicy::default()
    }
}

#[test]
fn default_policy_matches_operator_expectations() {
    let policy = DialPolicy::default();
    assert_eq!(policy.connect_timeout, Duration::from_secs(30));
    assert_eq!(policy.statement_timeout, Duration::from_secs(21));
    assert!(policy.keepalives);
    assert!(policy.require_tls);
    assert_eq!(policy.database, "controller");
}

#[test]
fn session_config_lists_every_endpoint_as_machine_user() {
    let connector = PostgresConnector::default();
    let config =
        connector.session_config(&credentials(&["127.0.0.1:37017", "[::1]:5432"], Some("pem")));

    let hosts = config.get_hosts();
    assert_eq!(hosts.len(), 2);
    assert!(matches!(&hosts[0], Host::Tcp(host) if host == "127.0.0.1"));
    assert!(matches!(&hosts[1], Host::Tcp(host) if host == "::1"));
    assert_eq!(config.get_ports(), &[37017, 5432]);
    assert_eq!(config.get_user(), Some("machine-3"));
    assert_eq!(config.get_dbname(), Some("controller"));
    assert_eq!(config.get_application_name(), Some(APPLICATION_NAME));
    assert_eq!(config.get_connect_timeout(), Some(&Duration::from_secs(30)));
    assert_eq!(config.get_options(), Some("-c statement_timeout=21000"));
    assert_eq!(config.get_ssl_mode(), SslMode::Require);
}

#[test]
fn required_tls_without_ca_refuses_to_dial() {
    let connector = PostgresConnector::default();
    let Err(err) = connector.connect(&credentials(&["127.0.0.1:1"], None)) else {
        panic!("connect without ca should fail");
    };
    assert!(matches!(err, ConnectError::TlsUnavailable));
    assert_eq!(err.kind(), ErrorKind::ConnectionFailed);
}

#[test]
fn unusable_ca_pem_is_a_tls_error() {
    let err = tls_client_config("not a certificate").unwrap_err();
    assert!(matches!(err, ConnectError::Tls(_)));
    assert_eq!(err.kind(), ErrorKind::ConnectionFailed);
}

#[test]
fn unreachable_store_is_connection_failed() {
    let connector = PostgresConnector::new(plaintext_policy());
    let Err(err) = connector.connect(&credentials(&["127.0.0.1:1"], None)) else {
        panic!("dialing a closed port should fail");
    };
    let ConnectError::Dial {
        endpoints, ..
    } = &err
    else {
        panic!("expected dial error, got {err:?}");
    };
    assert_eq!(endpoints, "127.0.0.1:1");
    assert_eq!(err.kind(), ErrorKind::ConnectionFailed);
    assert!(!err.to_string().contains("state-secret"));
}
