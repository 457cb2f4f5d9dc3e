//! Subtree rollups
//!
//! Summaries combine the items at a location with those of all of its
//! descendants. They are what a location with children shows, as opposed to
//! the exact-location listing of [`ItemLedger::by_location`].
//!
//! [`ItemLedger::by_location`]: crate::core::ledger::ItemLedger::by_location

use rusqlite::{params, Connection};

use crate::core::category::Category;
use crate::core::error::LedgerResult;
use crate::core::ledger::StockLine;
use crate::core::path::PathCodec;

pub struct SubtreeAggregator<'c> {
    conn: &'c Connection,
    category: Category,
    codec: PathCodec,
}

impl<'c> SubtreeAggregator<'c> {
    pub fn new(conn: &'c Connection, category: Category, codec: PathCodec) -> Self {
        Self {
            conn,
            category,
            codec,
        }
    }

    /// Total quantity per item type at or below `location`
    pub fn summarize(&self, location: &str) -> LedgerResult<Vec<StockLine>> {
        let sql = format!(
            r#"SELECT ItemType, SUM(Count) AS Total FROM {}
               WHERE Location = ?1 OR substr(Location, 1, length(?2)) = ?2
               GROUP BY ItemType
               ORDER BY Total DESC, ItemType ASC"#,
            self.category.table()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![location, self.codec.child_prefix(location)],
            |row| {
                Ok(StockLine {
                    item_type: row.get(0)?,
                    quantity: row.get(1)?,
                })
            },
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Grand total at or below `location`
    pub fn total(&self, location: &str) -> LedgerResult<i64> {
        let sql = format!(
            r#"SELECT COALESCE(SUM(Count), 0) FROM {}
               WHERE Location = ?1 OR substr(Location, 1, length(?2)) = ?2"#,
            self.category.table()
        );
        Ok(self.conn.query_row(
            &sql,
            params![location, self.codec.child_prefix(location)],
            |row| row.get(0),
        )?)
    }
}
