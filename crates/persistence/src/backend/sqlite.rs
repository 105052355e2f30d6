// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Connection setup for the `SQLite` store.
//!
//! Everything that touches PRAGMAs or `SQLite`-only functions lives here so
//! the query and mutation modules stay plain Diesel DSL.

use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer};
use diesel::{Connection, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info};

use crate::error::PersistenceError;

/// Embedded schema migrations.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Default time to wait on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;

#[derive(QueryableByName)]
struct ForeignKeysPragma {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}

/// Executes a PRAGMA statement. Diesel has no PRAGMA DSL.
fn pragma(conn: &mut SqliteConnection, statement: &str) -> Result<(), PersistenceError> {
    debug!(statement, "Applying SQLite pragma");
    diesel::sql_query(statement)
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("{statement}: {e}")))?;
    Ok(())
}

/// Returns the rowid of the last insert on this connection.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_last_insert_rowid(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(diesel::select(sql::<BigInt>("last_insert_rowid()")).get_result(conn)?)
}

/// Fails unless `PRAGMA foreign_keys` is on for this connection.
///
/// Response rows cascade with their request and profiles reference users,
/// so the store refuses to run without enforcement.
///
/// # Errors
///
/// Returns `ForeignKeyEnforcementNotEnabled` if enforcement is off.
pub fn verify_foreign_key_enforcement(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    let row: ForeignKeysPragma = diesel::sql_query("PRAGMA foreign_keys").get_result(conn)?;
    if row.foreign_keys == 0 {
        return Err(PersistenceError::ForeignKeyEnforcementNotEnabled);
    }
    debug!("SQLite foreign key enforcement is enabled");
    Ok(())
}

/// Opens `database_url`, applies connection PRAGMAs and runs pending
/// migrations.
///
/// # Errors
///
/// Returns an error if the connection, a PRAGMA or a migration fails.
pub fn initialize_database(
    database_url: &str,
    busy_timeout_ms: u32,
) -> Result<SqliteConnection, PersistenceError> {
    info!(database_url, busy_timeout_ms, "Opening Lifeline store");

    let mut conn: SqliteConnection = SqliteConnection::establish(database_url)?;
    pragma(&mut conn, &format!("PRAGMA busy_timeout = {busy_timeout_ms}"))?;
    pragma(&mut conn, "PRAGMA foreign_keys = ON")?;

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;
    info!(applied = applied.len(), "Store migrations up to date");

    Ok(conn)
}

/// Switches a file-backed database to write-ahead logging so readers do not
/// block the expiry sweep.
///
/// # Errors
///
/// Returns an error if the PRAGMA statement fails.
pub fn enable_wal_mode(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    pragma(conn, "PRAGMA journal_mode = WAL")
}
