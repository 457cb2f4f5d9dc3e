//! Location creation and cascading deletion
//!
//! Deleting a location never loses stock. Everything at the location and
//! below it is folded into the parent location (or `Unassigned` at the top
//! level), merging quantities with rows already there, and then the
//! subtree's catalog rows are purged.
//!
//! The caller provides the transaction: run [`LocationLifecycle::delete`]
//! through [`Database::write`] so a failure at any step rolls back the whole
//! cascade.
//!
//! [`Database::write`]: crate::core::database::Database::write

use std::collections::BTreeMap;

use rusqlite::Connection;
use serde::Serialize;
use tracing::debug;

use crate::core::catalog::LocationCatalog;
use crate::core::category::Category;
use crate::core::error::{LedgerError, LedgerResult};
use crate::core::ledger::{ItemLedger, ItemRecord, StockLine};
use crate::core::path::{PathCodec, UNASSIGNED};

/// What a cascading delete did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    pub location: String,
    pub destination: String,
    /// Quantity per item type folded into the destination
    pub merged: Vec<StockLine>,
    /// Catalog rows purged
    pub locations_removed: usize,
}

pub struct LocationLifecycle<'c> {
    category: Category,
    codec: PathCodec,
    catalog: LocationCatalog<'c>,
    ledger: ItemLedger<'c>,
}

impl<'c> LocationLifecycle<'c> {
    pub fn new(conn: &'c Connection, category: Category, codec: PathCodec) -> Self {
        Self {
            category,
            codec,
            catalog: LocationCatalog::new(conn, category, codec),
            ledger: ItemLedger::new(conn, category, codec),
        }
    }

    /// Create `path` below `parent`.
    ///
    /// Unlike adding items, missing intermediate ancestors are not created:
    /// the parent must already be reachable.
    pub fn create(&self, path: &str, parent: Option<&str>) -> LedgerResult<()> {
        if let Some(parent) = parent {
            if self.codec.parent_of(path) != Some(parent) {
                return Err(LedgerError::invalid_segment(
                    path,
                    format!("not a direct child of '{}'", parent),
                ));
            }
        } else if let Some(implied) = self.codec.parent_of(path) {
            if !self.catalog.exists(implied)? {
                return Err(LedgerError::ParentNotFound(implied.to_string()));
            }
        }

        self.catalog
            .create(path, parent.or_else(|| self.codec.parent_of(path)))
    }

    /// Delete `path` and everything below it, folding their stock into the
    /// parent location
    pub fn delete(&self, path: &str) -> LedgerResult<DeletionReport> {
        // Validate
        if self.codec.is_protected(path) {
            return Err(LedgerError::ProtectedLocation(path.to_string()));
        }
        if !self.catalog.exists(path)? {
            return Err(LedgerError::LocationNotFound(path.to_string()));
        }

        // Collect
        let collected = self.ledger.in_subtree(path)?;

        // Resolve destination
        let destination = self.resolve_destination(path)?;
        debug!(
            category = %self.category,
            location = path,
            destination = %destination,
            rows = collected.len(),
            "cascading location delete"
        );

        // Merge
        let merged = self.merge_into(&collected, &destination)?;

        // Purge
        for record in &collected {
            if self.ledger.get(record.id)?.is_some_and(|r| r.location != destination) {
                self.ledger.delete(record.id)?;
            }
        }
        let locations_removed = self.catalog.delete_subtree(path)?;
        if destination != UNASSIGNED && !self.catalog.has_row(&destination)? {
            self.catalog.insert_row(&destination)?;
        }

        Ok(DeletionReport {
            location: path.to_string(),
            destination,
            merged,
            locations_removed,
        })
    }

    /// Parent of `path` if it is reachable outside the subtree being
    /// deleted, otherwise `Unassigned`
    fn resolve_destination(&self, path: &str) -> LedgerResult<String> {
        match self.codec.parent_of(path) {
            Some(parent) if self.catalog.exists(parent)? => Ok(parent.to_string()),
            _ => Ok(UNASSIGNED.to_string()),
        }
    }

    /// Fold each record into `destination`: add into an existing row of the
    /// same type, else re-point the record itself
    fn merge_into(&self, records: &[ItemRecord], destination: &str) -> LedgerResult<Vec<StockLine>> {
        let mut merged: BTreeMap<&str, i64> = BTreeMap::new();

        for record in records {
            match self.ledger.id_of(&record.item_type, destination)? {
                Some(existing) if existing != record.id => {
                    self.ledger.adjust(existing, record.quantity)?;
                }
                Some(_) => {}
                None => self.ledger.relocate(record.id, destination)?,
            }
            *merged.entry(record.item_type.as_str()).or_default() += record.quantity;
        }

        let mut lines: Vec<StockLine> = merged
            .into_iter()
            .map(|(item_type, quantity)| StockLine {
                item_type: item_type.to_string(),
                quantity,
            })
            .collect();
        lines.sort_by(|a, b| {
            b.quantity
                .cmp(&a.quantity)
                .then_with(|| a.item_type.cmp(&b.item_type))
        });
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::database::Database;
    use crate::core::error::ErrorKind;

    struct Fixture {
        db: Database,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                db: Database::open_in_memory().unwrap(),
            }
        }

        fn run<T>(
            &self,
            f: impl FnOnce(&LocationLifecycle, &ItemLedger, &LocationCatalog) -> LedgerResult<T>,
        ) -> LedgerResult<T> {
            self.db.write(|conn| {
                let codec = PathCodec::default();
                let lifecycle = LocationLifecycle::new(conn, Category::Cables, codec);
                let ledger = ItemLedger::new(conn, Category::Cables, codec);
                let catalog = LocationCatalog::new(conn, Category::Cables, codec);
                f(&lifecycle, &ledger, &catalog)
            })
        }
    }

    #[test]
    fn test_create_requires_reachable_parent() {
        let fx = Fixture::new();
        let err = fx
            .run(|lc, _, _| lc.create("Lab/Bench3", Some("Lab")))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParentNotFound);

        let err = fx.run(|lc, _, _| lc.create("Lab/Bench3", None)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParentNotFound);

        fx.run(|lc, _, _| {
            lc.create("Lab", None)?;
            lc.create("Lab/Bench3", Some("Lab"))
        })
        .unwrap();
    }

    #[test]
    fn test_create_rejects_mismatched_parent() {
        let fx = Fixture::new();
        let err = fx
            .run(|lc, _, _| {
                lc.create("Lab", None)?;
                lc.create("Office/Desk", Some("Lab"))
            })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSegment);
    }

    #[test]
    fn test_delete_drawer_folds_into_bench() {
        let fx = Fixture::new();
        let report = fx
            .run(|lc, ledger, catalog| {
                lc.create("Lab", None)?;
                lc.create("Lab/Bench3", Some("Lab"))?;
                lc.create("Lab/Bench3/Drawer1", Some("Lab/Bench3"))?;
                ledger.add("USB-C Cable", "Lab/Bench3/Drawer1", 4)?;

                let report = lc.delete("Lab/Bench3/Drawer1")?;
                assert!(!catalog.exists("Lab/Bench3/Drawer1")?);
                assert_eq!(
                    ledger.by_location("Lab/Bench3")?,
                    vec![StockLine {
                        item_type: "USB-C Cable".into(),
                        quantity: 4
                    }]
                );
                Ok(report)
            })
            .unwrap();
        assert_eq!(report.destination, "Lab/Bench3");
        assert_eq!(report.locations_removed, 1);
    }

    #[test]
    fn test_delete_merges_with_existing_destination_rows() {
        let fx = Fixture::new();
        fx.run(|lc, ledger, catalog| {
            ledger.add("HDMI", "Lab", 1)?;
            ledger.add("HDMI", "Lab/Bench1", 2)?;
            ledger.add("HDMI", "Lab/Bench1/Drawer", 3)?;
            ledger.add("VGA", "Lab/Bench1/Drawer", 5)?;

            let report = lc.delete("Lab/Bench1")?;
            assert_eq!(report.destination, "Lab");
            assert_eq!(report.locations_removed, 2);

            let lab = ledger.by_location("Lab")?;
            assert_eq!(
                lab,
                vec![
                    StockLine {
                        item_type: "HDMI".into(),
                        quantity: 6
                    },
                    StockLine {
                        item_type: "VGA".into(),
                        quantity: 5
                    },
                ]
            );
            assert!(!catalog.exists("Lab/Bench1")?);
            assert!(!catalog.exists("Lab/Bench1/Drawer")?);
            assert_eq!(ledger.all()?.len(), 2);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_delete_top_level_goes_to_unassigned() {
        let fx = Fixture::new();
        fx.run(|lc, ledger, catalog| {
            ledger.add("HDMI", "Office/Desk", 2)?;
            ledger.add("HDMI", "Unassigned", 1)?;

            let report = lc.delete("Office")?;
            assert_eq!(report.destination, UNASSIGNED);
            assert_eq!(ledger.by_location(UNASSIGNED)?[0].quantity, 3);
            assert!(!catalog.exists("Office")?);
            assert!(!catalog.has_row(UNASSIGNED)?);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_delete_keeps_destination_reachable() {
        let fx = Fixture::new();
        fx.run(|lc, _, catalog| {
            // Only the child has a catalog row; the parent is implied
            catalog.insert_row("Lab/Bench1")?;
            lc.delete("Lab/Bench1")?;
            assert!(catalog.exists("Lab")?);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_unassigned_is_protected() {
        let fx = Fixture::new();
        for path in ["Unassigned", "Unassigned/Box"] {
            let err = fx.run(|lc, _, _| lc.delete(path)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ProtectedLocation);
        }
    }

    #[test]
    fn test_nested_unassigned_is_ordinary() {
        let fx = Fixture::new();
        fx.run(|lc, ledger, _| {
            ledger.add("HDMI", "Lab/Unassigned", 2)?;
            let report = lc.delete("Lab/Unassigned")?;
            assert_eq!(report.destination, "Lab");
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_delete_unknown_location() {
        let fx = Fixture::new();
        let err = fx.run(|lc, _, _| lc.delete("Nowhere")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_failed_delete_rolls_back_whole_cascade() {
        let fx = Fixture::new();
        fx.run(|_, ledger, _| {
            ledger.add("HDMI", "Lab/Bench1", 2)?;
            Ok(())
        })
        .unwrap();

        let err = fx
            .run(|lc, _, _| {
                lc.delete("Lab/Bench1")?;
                // Fail after the cascade has already written
                Err::<(), _>(LedgerError::InvalidQuantity(0))
            })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidQuantity);

        fx.run(|_, ledger, catalog| {
            assert_eq!(ledger.by_location("Lab/Bench1")?[0].quantity, 2);
            assert!(ledger.by_location("Lab")?.is_empty());
            assert!(catalog.has_row("Lab/Bench1")?);
            Ok(())
        })
        .unwrap();
    }
}
