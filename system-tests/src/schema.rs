// system-tests/src/schema.rs
// ============================================================================
// Module: Controller Store Schema
// Description: DDL, machine roles, and model seeding for system tests.
// Purpose: Reproduce the store layout the override tool writes against.
// Dependencies: postgres
// ============================================================================

//! ## Overview
//! Admin-side helpers. Everything here runs over an administrative
//! connection; the tool under test only ever connects as a machine role with
//! `SELECT` on `models` and `SELECT, UPDATE` on `settings`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use postgres::Client;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Tables holding models and their config records.
pub const CONTROLLER_SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS models (uuid TEXT PRIMARY \
                                         KEY, controller_uuid TEXT NOT NULL, name TEXT NOT \
                                         NULL);CREATE TABLE IF NOT EXISTS settings (model_uuid \
                                         TEXT NOT NULL REFERENCES models (uuid), id TEXT NOT \
                                         NULL, settings JSONB NOT NULL, revision BIGINT NOT \
                                         NULL, PRIMARY KEY (model_uuid, id));";

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Creates the controller tables.
///
/// # Errors
///
/// Returns the driver error when DDL fails.
pub fn install_schema(admin: &mut Client) -> Result<(), postgres::Error> {
    admin.batch_execute(CONTROLLER_SCHEMA_SQL)
}

/// Creates (or re-keys) a login role for a machine tag with the grants the
/// tool needs.
///
/// # Errors
///
/// Returns the driver error when role creation or grants fail.
pub fn create_machine_role(
    admin: &mut Client,
    tag: &str,
    password: &str,
) -> Result<(), postgres::Error> {
    let role = tag.replace(['"', '\''], "");
    let secret = password.replace('\'', "''");
    admin.batch_execute(&format!(
        "DO $$ BEGIN IF NOT EXISTS (SELECT 1 FROM pg_roles WHERE rolname = '{role}') THEN CREATE \
         ROLE \"{role}\" LOGIN; END IF; END $$;ALTER ROLE \"{role}\" PASSWORD '{secret}';GRANT \
         SELECT ON models TO \"{role}\";GRANT SELECT, UPDATE ON settings TO \"{role}\";"
    ))
}

/// Inserts a model and its config record at revision 1.
///
/// # Errors
///
/// Returns the driver error when the inserts fail.
pub fn seed_model(
    admin: &mut Client,
    model_uuid: &str,
    controller_uuid: &str,
    settings_json: &str,
) -> Result<(), postgres::Error> {
    admin.execute(
        "INSERT INTO models (uuid, controller_uuid, name) VALUES ($1, $2, $1)",
        &[&model_uuid, &controller_uuid],
    )?;
    admin.execute(
        "INSERT INTO settings (model_uuid, id, settings, revision) VALUES ($1, 'e', \
         $2::text::jsonb, 1)",
        &[&model_uuid, &settings_json],
    )?;
    Ok(())
}

/// Reads a model's config document (as JSON text) and revision.
///
/// # Errors
///
/// Returns the driver error when the lookup fails.
pub fn read_settings(
    admin: &mut Client,
    model_uuid: &str,
) -> Result<Option<(String, i64)>, postgres::Error> {
    let row = admin.query_opt(
        "SELECT settings::text, revision FROM settings WHERE model_uuid = $1 AND id = 'e'",
        &[&model_uuid],
    )?;
    Ok(row.map(|row| (row.get(0), row.get(1))))
}

/// Bumps a model's config revision as a concurrent writer would.
///
/// # Errors
///
/// Returns the driver error when the update fails.
pub fn bump_revision(admin: &mut Client, model_uuid: &str) -> Result<(), postgres::Error> {
    admin.execute(
        "UPDATE settings SET revision = revision + 1 WHERE model_uuid = $1 AND id = 'e'",
        &[&model_uuid],
    )?;
    Ok(())
}
