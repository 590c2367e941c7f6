/*!
Connection handling and guarded deletion
*/

use std::path::PathBuf;
use std::time::Duration;

use rusqlite::{Connection, OpenFlags, Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::entity::EntityKind;
use crate::error::{DataAccessError, Error};
use crate::guard::{self, BlockedDeletion};

/// How to reach the database. Passed in explicitly, never read from ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionOptions {
    /// Path to an existing SQLite database
    pub path: PathBuf,
    /// Open without write access
    pub read_only: bool,
    /// How long to wait on a locked database before failing
    pub busy_timeout_ms: u64,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./traffic.db"),
            read_only: false,
            busy_timeout_ms: 5000,
        }
    }
}

/// Result of [`Database::delete_guarded`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Row removed. `cascaded_vehicles` counts vehicles removed with their owner.
    Deleted { cascaded_vehicles: i64 },
    Blocked(BlockedDeletion),
    NotFound,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open an existing database. The file is never created.
    pub fn open(options: &ConnectionOptions) -> Result<Self, DataAccessError> {
        let access = if options.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE
        };
        let flags = access | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(&options.path, flags)
            .and_then(|conn| {
                conn.busy_timeout(Duration::from_millis(options.busy_timeout_ms))?;
                Ok(conn)
            })
            .map_err(|source| DataAccessError::Connection {
                path: options.path.clone(),
                source,
            })?;

        let db = Self::from_connection(conn)?;
        info!("Connected to traffic database at {:?}", options.path);
        Ok(db)
    }

    /// Wrap an open connection, enabling foreign key enforcement.
    pub fn from_connection(conn: Connection) -> Result<Self, DataAccessError> {
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Blocking reasons for deleting `kind`/`id`, read at this instant.
    pub fn check_dependencies(
        &self,
        kind: EntityKind,
        id: i64,
    ) -> Result<Vec<String>, DataAccessError> {
        guard::check(&self.conn, kind, id)
    }

    /// Vehicles that would be removed along with their owner.
    pub fn count_vehicles_for_driver(&self, driver_id: i64) -> Result<i64, DataAccessError> {
        count_vehicles(&self.conn, driver_id)
    }

    /// Delete a row only if nothing references it.
    ///
    /// The check and the delete share one IMMEDIATE transaction, so no other
    /// writer can add a violation in between. Any `Err` means nothing was deleted.
    pub fn delete_guarded(
        &mut self,
        kind: EntityKind,
        id: i64,
    ) -> Result<DeleteOutcome, DataAccessError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let reasons = guard::check(&*tx, kind, id)?;
        if !reasons.is_empty() {
            let blocked = BlockedDeletion { kind, id, reasons };
            warn!("{}", blocked);
            return Ok(DeleteOutcome::Blocked(blocked));
        }

        let cascaded_vehicles = match kind {
            EntityKind::Driver => count_vehicles(&tx, id)?,
            _ => 0,
        };

        let sql = format!(
            "DELETE FROM {} WHERE {} = ?1",
            kind.table(),
            kind.id_column()
        );
        debug!("Executing: {}", sql);
        let deleted = tx.execute(&sql, [id])?;
        if deleted == 0 {
            return Ok(DeleteOutcome::NotFound);
        }

        tx.commit()?;
        info!(
            "Deleted {} {} ({} vehicle(s) cascaded)",
            kind, id, cascaded_vehicles
        );
        Ok(DeleteOutcome::Deleted { cascaded_vehicles })
    }

    /// Run `f` inside an IMMEDIATE transaction. Commits only when `f` succeeds.
    pub(crate) fn write_locked<T, F>(&mut self, f: F) -> Result<T, Error>
    where
        F: FnOnce(&Transaction) -> Result<T, Error>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

fn count_vehicles(conn: &Connection, driver_id: i64) -> Result<i64, DataAccessError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM Vehicle WHERE Driver_ID = ?1",
        [driver_id],
        |row| row.get(0),
    )?;
    Ok(count)
}
