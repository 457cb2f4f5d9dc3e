//! Mutation journal
//!
//! Every committed ledger command appends one line. Lines are written through
//! the same connection as the mutation, so a rolled-back command leaves no
//! trace.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::Serialize;
use std::fmt;

use crate::core::category::Category;
use crate::core::error::LedgerResult;

/// Kind of journaled command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Add,
    Remove,
    Move,
    CreateLocation,
    DeleteLocation,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Add => "add",
            Action::Remove => "remove",
            Action::Move => "move",
            Action::CreateLocation => "create-location",
            Action::DeleteLocation => "delete-location",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "add" => Some(Action::Add),
            "remove" => Some(Action::Remove),
            "move" => Some(Action::Move),
            "create-location" => Some(Action::CreateLocation),
            "delete-location" => Some(Action::DeleteLocation),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One journal line
#[derive(Debug, Clone, Serialize)]
pub struct JournalEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub category: Category,
    pub action: Action,
    pub item_type: Option<String>,
    pub quantity: Option<i64>,
    pub source: Option<String>,
    pub destination: Option<String>,
}

/// A line to append; the store assigns id and timestamp
#[derive(Debug, Clone, Default)]
pub struct NewEntry<'a> {
    pub item_type: Option<&'a str>,
    pub quantity: Option<i64>,
    pub source: Option<&'a str>,
    pub destination: Option<&'a str>,
}

pub struct Journal<'c> {
    conn: &'c Connection,
}

impl<'c> Journal<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn record(&self, category: Category, action: Action, entry: NewEntry<'_>) -> LedgerResult<()> {
        self.conn.execute(
            r#"INSERT INTO Journal (Timestamp, Category, Action, ItemType, Quantity, Source, Destination)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
            params![
                Utc::now().to_rfc3339(),
                category.as_str(),
                action.as_str(),
                entry.item_type,
                entry.quantity,
                entry.source,
                entry.destination,
            ],
        )?;
        Ok(())
    }

    /// Newest lines first, optionally for one category
    pub fn recent(&self, category: Option<Category>, limit: usize) -> LedgerResult<Vec<JournalEntry>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(
            r#"SELECT Id, Timestamp, Category, Action, ItemType, Quantity, Source, Destination
               FROM Journal
               WHERE ?1 IS NULL OR Category = ?1
               ORDER BY Id DESC
               LIMIT ?2"#,
        )?;
        let rows = stmt.query_map(params![category.map(|c| c.as_str()), limit], from_row)?;

        let mut entries = Vec::new();
        for row in rows {
            if let Some(entry) = row? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }
}

/// Lines with an unknown category, action or timestamp are skipped
fn from_row(row: &Row<'_>) -> rusqlite::Result<Option<JournalEntry>> {
    let timestamp: String = row.get(1)?;
    let category: String = row.get(2)?;
    let action: String = row.get(3)?;

    let (Ok(timestamp), Ok(category), Some(action)) = (
        DateTime::parse_from_rfc3339(&timestamp),
        category.parse::<Category>(),
        Action::parse(&action),
    ) else {
        return Ok(None);
    };
    let timestamp = timestamp.with_timezone(&Utc);

    Ok(Some(JournalEntry {
        id: row.get(0)?,
        timestamp,
        category,
        action,
        item_type: row.get(4)?,
        quantity: row.get(5)?,
        source: row.get(6)?,
        destination: row.get(7)?,
    }))
}
