//! Location catalog
//!
//! The catalog is the registry of known locations for one category. A
//! location is real if it has a catalog row, holds at least one item row, or
//! is the ancestor of either. Catalog rows are what keep an emptied location
//! in the tree.

use std::collections::BTreeSet;

use rusqlite::{params, Connection};
use tracing::debug;

use crate::core::category::Category;
use crate::core::error::{LedgerError, LedgerResult};
use crate::core::path::{PathCodec, UNASSIGNED};

/// Registry of locations for one category
pub struct LocationCatalog<'c> {
    conn: &'c Connection,
    category: Category,
    codec: PathCodec,
}

impl<'c> LocationCatalog<'c> {
    pub fn new(conn: &'c Connection, category: Category, codec: PathCodec) -> Self {
        Self {
            conn,
            category,
            codec,
        }
    }

    /// True if the location is reachable: the root `Unassigned`, a catalog
    /// row, an item row, or a prefix of any of those
    pub fn exists(&self, path: &str) -> LedgerResult<bool> {
        if path == UNASSIGNED {
            return Ok(true);
        }

        let prefix = self.codec.child_prefix(path);
        let sql = format!(
            r#"SELECT EXISTS (
                   SELECT 1 FROM Locations
                   WHERE Category = ?1
                     AND (Location = ?2 OR substr(Location, 1, length(?3)) = ?3)
                   UNION ALL
                   SELECT 1 FROM {table}
                   WHERE Location = ?2 OR substr(Location, 1, length(?3)) = ?3
               )"#,
            table = self.category.table()
        );
        let found: bool =
            self.conn
                .query_row(&sql, params![self.category.as_str(), path, prefix], |row| {
                    row.get(0)
                })?;
        Ok(found)
    }

    /// True if a catalog row exists for exactly this path
    pub fn has_row(&self, path: &str) -> LedgerResult<bool> {
        let found: bool = self.conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM Locations WHERE Category = ?1 AND Location = ?2)",
            params![self.category.as_str(), path],
            |row| row.get(0),
        )?;
        Ok(found)
    }

    /// Register a new location below an existing parent
    pub fn create(&self, path: &str, parent: Option<&str>) -> LedgerResult<()> {
        if self.exists(path)? {
            return Err(LedgerError::AlreadyExists(path.to_string()));
        }
        if let Some(parent) = parent {
            if !self.exists(parent)? {
                return Err(LedgerError::ParentNotFound(parent.to_string()));
            }
        }
        self.insert_row(path)
    }

    /// Make `path` exist, registering it and any missing ancestors.
    ///
    /// Walks up until an existing ancestor (or the top level) is found, then
    /// creates the missing locations from the top down. Returns the paths
    /// that were created.
    pub fn ensure(&self, path: &str) -> LedgerResult<Vec<String>> {
        let mut missing = Vec::new();
        let mut current = Some(path);
        while let Some(p) = current {
            if self.exists(p)? {
                break;
            }
            missing.push(p);
            current = self.codec.parent_of(p);
        }

        let mut created = Vec::with_capacity(missing.len());
        for p in missing.into_iter().rev() {
            self.create(p, self.codec.parent_of(p))?;
            created.push(p.to_string());
        }
        if !created.is_empty() {
            debug!(category = %self.category, ?created, "implicitly created locations");
        }
        Ok(created)
    }

    /// Insert a placeholder row without validation; duplicates are ignored
    pub(crate) fn insert_row(&self, path: &str) -> LedgerResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO Locations (Category, Location) VALUES (?1, ?2)",
            params![self.category.as_str(), path],
        )?;
        Ok(())
    }

    /// Next path segment of every location strictly below `parent`.
    ///
    /// With no parent the top-level segments are returned, which always
    /// include `Unassigned`.
    pub fn child_segments(&self, parent: Option<&str>) -> LedgerResult<BTreeSet<String>> {
        let paths = match parent {
            Some(parent) => self.descendant_paths(parent)?,
            None => self.all_paths()?,
        };

        let mut segments: BTreeSet<String> = paths
            .iter()
            .filter_map(|p| self.codec.next_segment(p, parent))
            .map(str::to_string)
            .collect();

        if parent.is_none() {
            segments.insert(UNASSIGNED.to_string());
        }
        Ok(segments)
    }

    /// Remove the catalog row for exactly this path
    pub fn delete(&self, path: &str) -> LedgerResult<()> {
        self.conn.execute(
            "DELETE FROM Locations WHERE Category = ?1 AND Location = ?2",
            params![self.category.as_str(), path],
        )?;
        Ok(())
    }

    /// Remove catalog rows for the path and every descendant. Returns the
    /// number of rows removed.
    pub fn delete_subtree(&self, path: &str) -> LedgerResult<usize> {
        let removed = self.conn.execute(
            r#"DELETE FROM Locations
               WHERE Category = ?1
                 AND (Location = ?2 OR substr(Location, 1, length(?3)) = ?3)"#,
            params![self.category.as_str(), path, self.codec.child_prefix(path)],
        )?;
        Ok(removed)
    }

    /// Every catalog path for the category
    pub fn paths(&self) -> LedgerResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT Location FROM Locations WHERE Category = ?1 ORDER BY Location")?;
        let rows = stmt.query_map(params![self.category.as_str()], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<String>, _>>()?)
    }

    /// Distinct catalog and item paths strictly below `parent`
    fn descendant_paths(&self, parent: &str) -> LedgerResult<Vec<String>> {
        let sql = format!(
            r#"SELECT Location FROM Locations
               WHERE Category = ?1 AND substr(Location, 1, length(?2)) = ?2
               UNION
               SELECT Location FROM {table}
               WHERE substr(Location, 1, length(?2)) = ?2"#,
            table = self.category.table()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![self.category.as_str(), self.codec.child_prefix(parent)],
            |row| row.get(0),
        )?;
        Ok(rows.collect::<Result<Vec<String>, _>>()?)
    }

    /// Distinct catalog and item paths for the category
    pub(crate) fn all_paths(&self) -> LedgerResult<Vec<String>> {
        let sql = format!(
            r#"SELECT Location FROM Locations WHERE Category = ?1
               UNION
               SELECT Location FROM {table}"#,
            table = self.category.table()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![self.category.as_str()], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<String>, _>>()?)
    }
}
