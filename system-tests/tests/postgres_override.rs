// system-tests/tests/postgres_override.rs
// ============================================================================
// Module: PostgreSQL Override System Tests
// Description: Forces agent versions against a live PostgreSQL store.
// Purpose: Validate the real connector, guarded write, and full pipeline.
// Dependencies: version-override crates, testcontainers, postgres
// ============================================================================

//! ## Overview
//! Each test starts (or attaches to) a PostgreSQL instance, installs the
//! controller tables, and connects as a machine role the way a controller
//! agent would:
//! - The guarded write touches only `agent-version` of the named model.
//! - Re-running with the same version leaves the record unchanged.
//! - Models of another controller are invisible.
//! - A revision bump between resolve and write is reported, not overwritten.
//! - A write that would touch several records is rolled back.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::missing_docs_in_private_items,
    reason = "Test-only assertions and helpers are permitted."
)]

mod helpers;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use helpers::infra::PostgresFixture;
use serde_json::Value;
use tempfile::TempDir;
use uuid::Uuid;
use version_override_cli::OverrideRequest;
use version_override_cli::run_override;
use version_override_config::ToolSettings;
use version_override_config::agents_dir;
use version_override_core::AgentVersion;
use version_override_core::ConnectionCredentials;
use version_override_core::ControllerTag;
use version_override_core::ErrorKind;
use version_override_core::MachineTag;
use version_override_core::MemoryLogSink;
use version_override_core::ModelId;
use version_override_core::ModelScope;
use version_override_core::ModelStore;
use version_override_core::ModelTag;
use version_override_core::MutateError;
use version_override_core::Secret;
use version_override_core::Stage;
use version_override_core::StoreAddress;
use version_override_core::StoreConnector;
use version_override_core::StoreError;
use version_override_core::WriteOutcome;
use version_override_core::force_agent_version;
use version_override_store_postgres::DialPolicy;
use version_override_store_postgres::PostgresConnector;
use version_override_store_postgres::PostgresModelStore;
use version_override_system_tests::schema;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

const MACHINE_TAG: &str = "machine-0";
const STATE_PASSWORD: &str = "state-secret";
const SEED_SETTINGS: &str = r#"{"agent-version":"2.9.4","name":"default","logging-config":"<root>=INFO"}"#;

/// Live store shaped like one controller, with a private model namespace.
struct Controller {
    fixture: PostgresFixture,
    uuid: String,
    model: String,
}

impl Controller {
    fn start() -> Self {
        let fixture = PostgresFixture::start().expect("postgres fixture");
        let mut admin = fixture.admin().expect("admin connection");
        schema::install_schema(&mut admin).expect("install schema");
        schema::create_machine_role(&mut admin, MACHINE_TAG, STATE_PASSWORD).expect("role");
        let uuid = Uuid::new_v4().to_string();
        let model = Uuid::new_v4().to_string();
        schema::seed_model(&mut admin, &model, &uuid, SEED_SETTINGS).expect("seed model");
        Self {
            fixture,
            uuid,
            model,
        }
    }

    fn connector(&self) -> PostgresConnector {
        PostgresConnector::new(DialPolicy {
            require_tls: false,
            database: self.fixture.database.clone(),
            ..DialPolicy::default()
        })
    }

    fn credentials(&self) -> ConnectionCredentials {
        ConnectionCredentials {
            tag: MachineTag::parse(MACHINE_TAG).unwrap(),
            addresses: vec![StoreAddress::parse(&self.fixture.address()).unwrap()],
            password: Secret::new(STATE_PASSWORD),
            ca_cert: None,
            controller: ControllerTag::parse(&format!("controller-{}", self.uuid)).unwrap(),
            controller_model: ModelTag::parse(&format!("model-{}", Uuid::new_v4())).unwrap(),
        }
    }

    fn settings(&self, model: &str) -> (Value, i64) {
        let mut admin = self.fixture.admin().unwrap();
        let (document, revision) = schema::read_settings(&mut admin, model).unwrap().unwrap();
        (serde_json::from_str(&document).unwrap(), revision)
    }
}

fn version(value: &str) -> AgentVersion {
    AgentVersion::parse(value).unwrap()
}

fn write_agent_config(data_dir: &Path, controller: &Controller) {
    let dir = agents_dir(data_dir).join(MACHINE_TAG);
    fs::create_dir_all(&dir).unwrap();
    let config = format!(
        "# format 2.0\ntag: {MACHINE_TAG}\ncontroller: controller-{}\nmodel: model-{}\njobs:\n- \
         JobManageModel\nstateaddresses:\n- {}\nstatepassword: {STATE_PASSWORD}\n",
        controller.uuid,
        Uuid::new_v4(),
        controller.fixture.address()
    );
    fs::write(dir.join("agent.conf"), config).unwrap();
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn forces_only_agent_version_of_named_model() {
    let controller = Controller::start();
    let (before, _) = controller.settings(&controller.model);
    let mut session = controller.connector().connect(&controller.credentials()).unwrap();
    let rendered = format!("{session:?}");
    assert!(rendered.contains(&controller.uuid));
    assert!(!rendered.contains(STATE_PASSWORD));

    force_agent_version(&mut session, &controller.model, &version("2.9.5"), &MemoryLogSink::new())
        .unwrap();
    session.close().unwrap();

    let (after, revision) = controller.settings(&controller.model);
    assert_eq!(after["agent-version"], "2.9.5");
    assert_eq!(revision, 2);
    let mut expected = before;
    expected["agent-version"] = Value::from("2.9.5");
    assert_eq!(after, expected);
}

#[test]
fn repeating_the_same_version_keeps_the_document() {
    let controller = Controller::start();
    let connector = controller.connector();
    for _ in 0 .. 2 {
        let mut session = connector.connect(&controller.credentials()).unwrap();
        force_agent_version(
            &mut session,
            &controller.model,
            &version("2.9.5"),
            &MemoryLogSink::new(),
        )
        .unwrap();
        session.close().unwrap();
    }
    let (after, revision) = controller.settings(&controller.model);
    let mut expected: Value = serde_json::from_str(SEED_SETTINGS).unwrap();
    expected["agent-version"] = Value::from("2.9.5");
    assert_eq!(after, expected);
    assert_eq!(revision, 2);
}

#[test]
fn forcing_the_stored_version_keeps_the_revision() {
    let controller = Controller::start();
    let model = ModelId::parse(&controller.model).unwrap();
    let mut session = controller.connector().connect(&controller.credentials()).unwrap();

    let scope = session.resolve_model(&model).unwrap().unwrap();
    let outcome = session.write_agent_version(&scope, &version("2.9.4")).unwrap();
    session.close().unwrap();

    assert_eq!(
        outcome,
        WriteOutcome::Applied {
            revision: 1,
        }
    );
    let (after, revision) = controller.settings(&controller.model);
    assert_eq!(after, serde_json::from_str::<Value>(SEED_SETTINGS).unwrap());
    assert_eq!(revision, 1);
}

#[test]
fn model_of_another_controller_is_not_found() {
    let controller = Controller::start();
    let foreign = Uuid::new_v4().to_string();
    let mut admin = controller.fixture.admin().unwrap();
    schema::seed_model(&mut admin, &foreign, &Uuid::new_v4().to_string(), SEED_SETTINGS).unwrap();

    let mut session = controller.connector().connect(&controller.credentials()).unwrap();
    let err = force_agent_version(&mut session, &foreign, &version("2.9.5"), &MemoryLogSink::new())
        .unwrap_err();
    session.close().unwrap();

    assert!(matches!(err, MutateError::DeploymentNotFound { .. }));
    assert_eq!(controller.settings(&foreign).0["agent-version"], "2.9.4");
}

#[test]
fn concurrent_revision_bump_is_a_conflict() {
    let controller = Controller::start();
    let model = ModelId::parse(&controller.model).unwrap();
    let mut session = controller.connector().connect(&controller.credentials()).unwrap();

    let scope = session.resolve_model(&model).unwrap().unwrap();
    assert_eq!(scope.revision, 1);
    let mut admin = controller.fixture.admin().unwrap();
    schema::bump_revision(&mut admin, &controller.model).unwrap();

    let outcome = session.write_agent_version(&scope, &version("2.9.5")).unwrap();
    session.close().unwrap();

    assert_eq!(outcome, WriteOutcome::RevisionConflict);
    let (after, revision) = controller.settings(&controller.model);
    assert_eq!(after["agent-version"], "2.9.4");
    assert_eq!(revision, 2);
}

#[test]
fn write_matching_several_records_is_rolled_back() {
    let controller = Controller::start();
    let namespace = format!("dup_{}", Uuid::new_v4().simple());
    let mut admin = controller.fixture.admin().unwrap();
    admin
        .batch_execute(&format!(
            "CREATE SCHEMA {namespace};CREATE TABLE {namespace}.models (uuid TEXT, \
             controller_uuid TEXT, name TEXT);CREATE TABLE {namespace}.settings (model_uuid \
             TEXT, id TEXT, settings JSONB, revision BIGINT);"
        ))
        .unwrap();
    for _ in 0 .. 2 {
        admin
            .execute(
                &format!(
                    "INSERT INTO {namespace}.settings (model_uuid, id, settings, revision) VALUES \
                     ($1, 'e', $2::text::jsonb, 1)"
                ),
                &[&controller.model, &SEED_SETTINGS],
            )
            .unwrap();
    }

    let mut config: postgres::Config = controller.fixture.url.parse().unwrap();
    config.options(&format!("-c search_path={namespace}"));
    let client = config.connect(postgres::NoTls).unwrap();
    let mut session = PostgresModelStore::new(client, controller.uuid.clone());
    let scope = ModelScope {
        model: ModelId::parse(&controller.model).unwrap(),
        revision: 1,
    };

    let err = session.write_agent_version(&scope, &version("2.9.5")).unwrap_err();
    session.close().unwrap();

    assert!(matches!(err, StoreError::Invalid(_)));
    let rows = admin
        .query(
            &format!("SELECT settings->>'agent-version', revision FROM {namespace}.settings"),
            &[],
        )
        .unwrap();
    assert_eq!(rows.len(), 2);
    for row in rows {
        assert_eq!(row.get::<_, String>(0), "2.9.4");
        assert_eq!(row.get::<_, i64>(1), 1);
    }
}

#[test]
fn wrong_password_fails_to_connect() {
    let controller = Controller::start();
    let mut credentials = controller.credentials();
    credentials.password = Secret::new("not-the-password");
    let err = controller.connector().connect(&credentials).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConnectionFailed);
    assert!(!err.to_string().contains("not-the-password"));
}

#[test]
fn pipeline_forces_version_from_agent_config() {
    let controller = Controller::start();
    let data_dir = TempDir::new().unwrap();
    write_agent_config(data_dir.path(), &controller);
    let log = MemoryLogSink::new();

    let outcome = run_override(
        &ToolSettings::with_data_dir(data_dir.path()).unwrap(),
        &OverrideRequest {
            model: controller.model.clone(),
            version: "2.9.5".to_string(),
        },
        &controller.connector(),
        &log,
    )
    .unwrap();

    assert_eq!(outcome.machine.as_tag(), MACHINE_TAG);
    assert_eq!(controller.settings(&controller.model).0["agent-version"], "2.9.5");
    assert!(log.saw_stage(Stage::Close));
    assert!(log.events().iter().all(|event| !event.message.contains(STATE_PASSWORD)));
}
