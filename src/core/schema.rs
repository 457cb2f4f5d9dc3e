//! Database schema initialization

use rusqlite::{params, OptionalExtension};

use super::category::Category;
use super::database::Database;
use super::error::{LedgerError, LedgerResult};

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

impl Database {
    /// Create any missing tables and record the schema version
    pub(super) fn init_schema(&self) -> LedgerResult<()> {
        self.write(|conn| {
            conn.execute_batch(
                r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS SchemaVersion (
                Version INTEGER PRIMARY KEY
            );

            -- Location catalog: every explicitly created location, including
            -- placeholders that hold no items
            CREATE TABLE IF NOT EXISTS Locations (
                Category TEXT NOT NULL,
                Location TEXT NOT NULL,
                UNIQUE (Category, Location)
            );
            CREATE INDEX IF NOT EXISTS idx_locations_path ON Locations(Category, Location);

            -- Append-only record of committed mutations
            CREATE TABLE IF NOT EXISTS Journal (
                Id INTEGER PRIMARY KEY AUTOINCREMENT,
                Timestamp TEXT NOT NULL,
                Category TEXT NOT NULL,
                Action TEXT NOT NULL,
                ItemType TEXT,
                Quantity INTEGER,
                Source TEXT,
                Destination TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_journal_category ON Journal(Category);
            "#,
            )?;

            // One item table per category, all with the same shape
            for category in Category::ALL {
                let table = category.table();
                conn.execute_batch(&format!(
                    r#"
                CREATE TABLE IF NOT EXISTS {table} (
                    Id INTEGER PRIMARY KEY AUTOINCREMENT,
                    ItemType TEXT NOT NULL,
                    Count INTEGER NOT NULL CHECK (Count > 0),
                    Location TEXT NOT NULL,
                    UNIQUE (ItemType, Location)
                );
                CREATE INDEX IF NOT EXISTS idx_{table}_location ON {table}(Location);
                "#
                ))?;
            }

            let stored: Option<i32> = conn
                .query_row("SELECT MAX(Version) FROM SchemaVersion", [], |row| row.get(0))
                .optional()?
                .flatten();

            match stored {
                None => {
                    conn.execute(
                        "INSERT INTO SchemaVersion (Version) VALUES (?1)",
                        params![SCHEMA_VERSION],
                    )?;
                }
                Some(found) if found > SCHEMA_VERSION => {
                    return Err(LedgerError::UnsupportedSchema {
                        found,
                        supported: SCHEMA_VERSION,
                    });
                }
                Some(_) => {}
            }

            Ok(())
        })
    }
}
