// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! SQLite-backed sheet.
//!
//! Each sheet row is one table row holding its cells as a JSON array.
//! Initialization, migrations and PRAGMA configuration live here as well.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use diesel::prelude::*;
use diesel::{Connection, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info};

use super::SheetBackend;
use crate::diesel_schema::sheet_rows;
use crate::error::PersistenceError;
use crate::row::header_row;

/// SQLite-specific migrations.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID, so
/// tests never share a database.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Queryable, Selectable)]
#[diesel(table_name = sheet_rows)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct SheetRow {
    row_number: i64,
    cells: String,
}

/// Run pending migrations on the provided connection.
///
/// # Errors
///
/// Returns an error if migration execution fails.
pub fn run_migrations(
    conn: &mut SqliteConnection,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Running SQLite database migrations");
    conn.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

/// Initialize a `SQLite` database at the given URL and run migrations.
///
/// # Arguments
///
/// * `database_url` - The `SQLite` database URL (e.g., `":memory:"` or file path)
///
/// # Errors
///
/// Returns an error if connection or migration fails.
pub fn initialize_database(database_url: &str) -> Result<SqliteConnection, PersistenceError> {
    info!("Initializing SQLite database at: {}", database_url);

    let mut conn: SqliteConnection = SqliteConnection::establish(database_url)
        .map_err(|e| PersistenceError::DatabaseConnectionFailed(e.to_string()))?;

    // NOTE: PRAGMA is raw SQL (justified - Diesel has no PRAGMA DSL)
    diesel::sql_query("PRAGMA busy_timeout = 5000")
        .execute(&mut conn)
        .map_err(|e| PersistenceError::QueryFailed(e.to_string()))?;

    run_migrations(&mut conn).map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;

    Ok(conn)
}

/// Enable WAL mode for file-based `SQLite` databases.
///
/// # Errors
///
/// Returns an error if the PRAGMA statement fails.
pub fn enable_wal_mode(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    // NOTE: PRAGMA is raw SQL (justified - Diesel has no PRAGMA DSL)
    diesel::sql_query("PRAGMA journal_mode = WAL")
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(e.to_string()))?;
    Ok(())
}

fn to_row_key(row_number: usize) -> Result<i64, PersistenceError> {
    i64::try_from(row_number).map_err(|_| PersistenceError::RowOutOfRange { row_number })
}

/// A sheet stored in `SQLite`.
pub struct SqliteSheet {
    conn: SqliteConnection,
}

impl SqliteSheet {
    /// Creates a sheet in a fresh in-memory `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:complaints_{db_id}?mode=memory&cache=shared");

        let conn: SqliteConnection = initialize_database(&shared_memory_url)?;
        Self::from_connection(conn)
    }

    /// Opens (or creates) a sheet in a `SQLite` database file.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = initialize_database(path_str)?;

        // Enable WAL mode for better read concurrency
        enable_wal_mode(&mut conn)?;

        Self::from_connection(conn)
    }

    /// Wraps an initialized connection, writing the header row into an
    /// empty sheet.
    fn from_connection(conn: SqliteConnection) -> Result<Self, PersistenceError> {
        let mut sheet: Self = Self { conn };

        let row_count: i64 = sheet_rows::table.count().get_result(&mut sheet.conn)?;
        if row_count == 0 {
            info!("Writing header row to empty complaint sheet");
            sheet.append_row(&header_row())?;
        }

        Ok(sheet)
    }
}

impl SheetBackend for SqliteSheet {
    fn read_rows(&mut self) -> Result<Vec<Vec<String>>, PersistenceError> {
        let stored: Vec<SheetRow> = sheet_rows::table
            .order(sheet_rows::row_number.asc())
            .select(SheetRow::as_select())
            .load(&mut self.conn)?;

        let mut rows: Vec<Vec<String>> = Vec::with_capacity(stored.len());
        for row in stored {
            let row_number: usize = usize::try_from(row.row_number).map_err(|_| {
                PersistenceError::SerializationError(format!(
                    "invalid row number {}",
                    row.row_number
                ))
            })?;
            // Keep index == row_number - 1 even if rows were removed by hand.
            rows.resize_with(row_number.saturating_sub(1).max(rows.len()), Vec::new);
            rows.push(serde_json::from_str(&row.cells)?);
        }

        debug!(rows = rows.len(), "Read complaint sheet");
        Ok(rows)
    }

    fn write_row(&mut self, row_number: usize, cells: &[String]) -> Result<(), PersistenceError> {
        let key: i64 = to_row_key(row_number)?;
        let encoded: String = serde_json::to_string(cells)?;

        let updated: usize = diesel::update(sheet_rows::table.filter(sheet_rows::row_number.eq(key)))
            .set(sheet_rows::cells.eq(&encoded))
            .execute(&mut self.conn)?;

        if updated == 0 {
            return Err(PersistenceError::RowOutOfRange { row_number });
        }

        debug!(row_number, "Wrote sheet row");
        Ok(())
    }

    fn append_row(&mut self, cells: &[String]) -> Result<usize, PersistenceError> {
        let encoded: String = serde_json::to_string(cells)?;

        let row_key: i64 = self
            .conn
            .transaction::<i64, PersistenceError, _>(|conn| {
                let last: Option<i64> = sheet_rows::table
                    .select(diesel::dsl::max(sheet_rows::row_number))
                    .get_result(conn)?;
                let next: i64 = last.unwrap_or(0) + 1;

                diesel::insert_into(sheet_rows::table)
                    .values((
                        sheet_rows::row_number.eq(next),
                        sheet_rows::cells.eq(&encoded),
                    ))
                    .execute(conn)?;
                Ok(next)
            })?;

        let row_number: usize = usize::try_from(row_key).map_err(|_| {
            PersistenceError::SerializationError(format!("invalid row number {row_key}"))
        })?;
        debug!(row_number, "Appended sheet row");
        Ok(row_number)
    }
}
