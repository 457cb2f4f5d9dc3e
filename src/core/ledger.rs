//! Item ledger
//!
//! Maps `(item type, location)` to a positive quantity for one category.
//! A row whose quantity would reach zero is deleted instead; empty
//! locations survive through their catalog row.

use std::fmt;
use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use crate::core::catalog::LocationCatalog;
use crate::core::category::Category;
use crate::core::error::{LedgerError, LedgerResult};
use crate::core::path::PathCodec;

/// Store-assigned identifier of an item row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(ItemId)
    }
}

/// One stocked item row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRecord {
    pub id: ItemId,
    pub item_type: String,
    pub quantity: i64,
    pub location: String,
}

impl ItemRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: ItemId(row.get(0)?),
            item_type: row.get(1)?,
            quantity: row.get(2)?,
            location: row.get(3)?,
        })
    }
}

/// Quantity of one item type, as shown for a location
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockLine {
    pub item_type: String,
    pub quantity: i64,
}

/// Item table access for one category
pub struct ItemLedger<'c> {
    conn: &'c Connection,
    category: Category,
    codec: PathCodec,
}

impl<'c> ItemLedger<'c> {
    pub fn new(conn: &'c Connection, category: Category, codec: PathCodec) -> Self {
        Self {
            conn,
            category,
            codec,
        }
    }

    fn table(&self) -> &'static str {
        self.category.table()
    }

    /// Add `count` of `item_type` at `location`.
    ///
    /// The location and any missing ancestors are created on first use. An
    /// existing row for the pair is incremented; otherwise a new row is
    /// inserted.
    pub fn add(&self, item_type: &str, location: &str, count: i64) -> LedgerResult<ItemId> {
        if count <= 0 {
            return Err(LedgerError::InvalidQuantity(count));
        }
        let item_type = item_type.trim();
        if item_type.is_empty() {
            return Err(LedgerError::InvalidItemType);
        }

        LocationCatalog::new(self.conn, self.category, self.codec).ensure(location)?;

        match self.id_of(item_type, location)? {
            Some(id) => {
                self.adjust(id, count)?;
                Ok(id)
            }
            None => self.insert(item_type, location, count),
        }
    }

    /// Take `count` out of the row `id`, deleting it if it empties
    pub fn remove(&self, id: ItemId, count: i64) -> LedgerResult<ItemRecord> {
        if count <= 0 {
            return Err(LedgerError::InvalidQuantity(count));
        }
        let record = self.require(id)?;
        if record.quantity < count {
            return Err(LedgerError::InsufficientQuantity {
                item_type: record.item_type,
                requested: count,
                available: record.quantity,
            });
        }
        self.adjust(id, -count)?;
        Ok(ItemRecord {
            quantity: record.quantity - count,
            ..record
        })
    }

    /// True if the row exists with stock to remove
    pub fn can_remove(&self, id: ItemId) -> LedgerResult<bool> {
        Ok(self.get(id)?.is_some_and(|r| r.quantity > 0))
    }

    /// Items at exactly `location`, largest quantity first, then by type
    pub fn by_location(&self, location: &str) -> LedgerResult<Vec<StockLine>> {
        let sql = format!(
            "SELECT ItemType, Count FROM {} WHERE Location = ?1 ORDER BY Count DESC, ItemType ASC",
            self.table()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![location], |row| {
            Ok(StockLine {
                item_type: row.get(0)?,
                quantity: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Full rows at exactly `location`, ordered like [`Self::by_location`]
    pub fn records_at(&self, location: &str) -> LedgerResult<Vec<ItemRecord>> {
        self.select(
            "WHERE Location = ?1 ORDER BY Count DESC, ItemType ASC",
            params![location],
        )
    }

    pub fn id_of(&self, item_type: &str, location: &str) -> LedgerResult<Option<ItemId>> {
        let sql = format!(
            "SELECT Id FROM {} WHERE ItemType = ?1 AND Location = ?2",
            self.table()
        );
        let id = self
            .conn
            .query_row(&sql, params![item_type, location], |row| row.get(0))
            .optional()?;
        Ok(id.map(ItemId))
    }

    pub fn get(&self, id: ItemId) -> LedgerResult<Option<ItemRecord>> {
        let sql = format!(
            "SELECT Id, ItemType, Count, Location FROM {} WHERE Id = ?1",
            self.table()
        );
        Ok(self
            .conn
            .query_row(&sql, params![id.0], ItemRecord::from_row)
            .optional()?)
    }

    /// Like [`Self::get`] but an unknown id is an error
    pub fn require(&self, id: ItemId) -> LedgerResult<ItemRecord> {
        self.get(id)?.ok_or(LedgerError::ItemNotFound(id))
    }

    /// Rows at `location` or anywhere below it, in id order
    pub fn in_subtree(&self, location: &str) -> LedgerResult<Vec<ItemRecord>> {
        self.select(
            "WHERE Location = ?1 OR substr(Location, 1, length(?2)) = ?2 ORDER BY Id",
            params![location, self.codec.child_prefix(location)],
        )
    }

    /// Every location holding `item_type`, largest quantity first
    pub fn find_by_type(&self, item_type: &str) -> LedgerResult<Vec<ItemRecord>> {
        self.select(
            "WHERE ItemType = ?1 COLLATE NOCASE ORDER BY Count DESC, Location ASC",
            params![item_type.trim()],
        )
    }

    /// Every row in the category, ordered by location then type
    pub fn all(&self) -> LedgerResult<Vec<ItemRecord>> {
        self.select("ORDER BY Location ASC, ItemType ASC", params![])
    }

    /// Change the row's quantity by `delta`, deleting it at zero
    pub(crate) fn adjust(&self, id: ItemId, delta: i64) -> LedgerResult<()> {
        let record = self.require(id)?;
        let quantity = record
            .quantity
            .checked_add(delta)
            .ok_or(LedgerError::InvalidQuantity(delta))?;

        if quantity < 0 {
            return Err(LedgerError::InsufficientQuantity {
                item_type: record.item_type,
                requested: -delta,
                available: record.quantity,
            });
        }

        if quantity == 0 {
            self.delete(id)?;
        } else {
            let sql = format!("UPDATE {} SET Count = ?1 WHERE Id = ?2", self.table());
            self.conn.execute(&sql, params![quantity, id.0])?;
        }
        Ok(())
    }

    pub(crate) fn insert(&self, item_type: &str, location: &str, count: i64) -> LedgerResult<ItemId> {
        let sql = format!(
            "INSERT INTO {} (ItemType, Count, Location) VALUES (?1, ?2, ?3)",
            self.table()
        );
        self.conn.execute(&sql, params![item_type, count, location])?;
        Ok(ItemId(self.conn.last_insert_rowid()))
    }

    /// Point an existing row at another location
    pub(crate) fn relocate(&self, id: ItemId, location: &str) -> LedgerResult<()> {
        let sql = format!("UPDATE {} SET Location = ?1 WHERE Id = ?2", self.table());
        self.conn.execute(&sql, params![location, id.0])?;
        Ok(())
    }

    pub(crate) fn delete(&self, id: ItemId) -> LedgerResult<()> {
        let sql = format!("DELETE FROM {} WHERE Id = ?1", self.table());
        self.conn.execute(&sql, params![id.0])?;
        Ok(())
    }

    fn select(&self, clause: &str, params: &[&dyn rusqlite::ToSql]) -> LedgerResult<Vec<ItemRecord>> {
        let sql = format!(
            "SELECT Id, ItemType, Count, Location FROM {} {}",
            self.table(),
            clause
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params, ItemRecord::from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
