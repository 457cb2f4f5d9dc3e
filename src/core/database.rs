//! SQLite-backed store for the ledger
//!
//! The [`Database`] owns the single connection to the inventory file and is
//! the only place transactions are opened. Ledger components receive a
//! `&Connection` and never begin or commit on their own, so every mutating
//! command runs inside exactly one transaction opened by [`Database::write`].

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;
use tracing::{debug, warn};

use crate::core::error::LedgerResult;

/// How long to wait on a database locked by another process
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// The inventory database
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create the database file at `path` and ensure the schema exists
    pub fn open(path: &Path) -> LedgerResult<Self> {
        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        let db = Self { conn };
        db.init_schema()?;
        debug!(path = %path.display(), "opened inventory database");
        Ok(db)
    }

    /// Open a private in-memory database (used by tests)
    pub fn open_in_memory() -> LedgerResult<Self> {
        let db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Run a read-only query sequence outside a transaction
    pub fn read<T>(&self, f: impl FnOnce(&Connection) -> LedgerResult<T>) -> LedgerResult<T> {
        f(&self.conn)
    }

    /// Run `f` inside one transaction.
    ///
    /// The transaction commits only if `f` returns `Ok`; on error it is rolled
    /// back and the original error is returned unchanged.
    pub fn write<T>(&self, f: impl FnOnce(&Connection) -> LedgerResult<T>) -> LedgerResult<T> {
        let tx = self.conn.unchecked_transaction()?;
        match f(&*tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                warn!(error = %e, "rolling back ledger transaction");
                // Dropping the transaction rolls it back
                drop(tx);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::LedgerError;
    use tempfile::tempdir;

    fn count_locations(db: &Database) -> i64 {
        db.read(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM Locations", [], |row| row.get(0))?)
        })
        .unwrap()
    }

    #[test]
    fn test_write_commits_on_success() {
        let db = Database::open_in_memory().unwrap();
        db.write(|conn| {
            conn.execute(
                "INSERT INTO Locations (Category, Location) VALUES ('cables', 'Lab')",
                [],
            )?;
            Ok(())
        })
        .unwrap();
        assert_eq!(count_locations(&db), 1);
    }

    #[test]
    fn test_write_rolls_back_on_error() {
        let db = Database::open_in_memory().unwrap();
        let result: LedgerResult<()> = db.write(|conn| {
            conn.execute(
                "INSERT INTO Locations (Category, Location) VALUES ('cables', 'Lab')",
                [],
            )?;
            Err(LedgerError::InvalidQuantity(0))
        });
        assert!(matches!(result, Err(LedgerError::InvalidQuantity(0))));
        assert_eq!(count_locations(&db), 0);
    }

    #[test]
    fn test_open_file_persists_rows() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("inventory.db");
        {
            let db = Database::open(&path).unwrap();
            db.write(|conn| {
                conn.execute(
                    "INSERT INTO Locations (Category, Location) VALUES ('adapters', 'Office')",
                    [],
                )?;
                Ok(())
            })
            .unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(count_locations(&db), 1);
    }
}
