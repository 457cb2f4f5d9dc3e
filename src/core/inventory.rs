//! Inventory command/query API
//!
//! [`Inventory`] is the entry point for front ends. It is bound to one
//! category, normalizes every location argument, and wraps each command in
//! exactly one transaction together with its journal line.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::core::catalog::LocationCatalog;
use crate::core::category::Category;
use crate::core::database::Database;
use crate::core::error::LedgerResult;
use crate::core::journal::{Action, Journal, JournalEntry, NewEntry};
use crate::core::ledger::{ItemId, ItemLedger, ItemRecord, StockLine};
use crate::core::lifecycle::{DeletionReport, LocationLifecycle};
use crate::core::path::{PathCodec, UNASSIGNED};
use crate::core::summary::SubtreeAggregator;
use crate::core::transfer::{MoveOutcome, TransferCoordinator};
use crate::core::tree::LocationTree;

/// Ledger API for one category
pub struct Inventory<'db> {
    db: &'db Database,
    category: Category,
    codec: PathCodec,
}

impl<'db> Inventory<'db> {
    pub fn new(db: &'db Database, category: Category, codec: PathCodec) -> Self {
        Self {
            db,
            category,
            codec,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Normalize a user-supplied location
    pub fn parse_location(&self, text: &str) -> LedgerResult<String> {
        self.codec.parse(text)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Every reachable location, depth-first, with `Unassigned` always present
    pub fn list_locations(&self) -> LedgerResult<Vec<String>> {
        Ok(self.tree()?.paths())
    }

    /// The full location tree for the category
    pub fn tree(&self) -> LedgerResult<LocationTree> {
        let paths = self.db.read(|conn| {
            LocationCatalog::new(conn, self.category, self.codec).all_paths()
        })?;
        let mut tree = LocationTree::from_paths(self.codec, paths);
        tree.insert(UNASSIGNED);
        Ok(tree)
    }

    pub fn child_segments(&self, parent: Option<&str>) -> LedgerResult<BTreeSet<String>> {
        let parent = parent.map(|p| self.parse_location(p)).transpose()?;
        self.db.read(|conn| {
            LocationCatalog::new(conn, self.category, self.codec).child_segments(parent.as_deref())
        })
    }

    pub fn exists(&self, location: &str) -> LedgerResult<bool> {
        let location = self.parse_location(location)?;
        self.db
            .read(|conn| LocationCatalog::new(conn, self.category, self.codec).exists(&location))
    }

    /// Items at exactly `location`
    pub fn by_location(&self, location: &str) -> LedgerResult<Vec<StockLine>> {
        let location = self.parse_location(location)?;
        self.db.read(|conn| self.ledger(conn).by_location(&location))
    }

    /// Item rows, with ids, at exactly `location`
    pub fn records_at(&self, location: &str) -> LedgerResult<Vec<ItemRecord>> {
        let location = self.parse_location(location)?;
        self.db.read(|conn| self.ledger(conn).records_at(&location))
    }

    /// Items at `location` and all of its descendants, per item type
    pub fn summarize(&self, location: &str) -> LedgerResult<Vec<StockLine>> {
        let location = self.parse_location(location)?;
        self.db.read(|conn| {
            SubtreeAggregator::new(conn, self.category, self.codec).summarize(&location)
        })
    }

    /// Quantity of every item type at or below `location`
    pub fn total(&self, location: &str) -> LedgerResult<i64> {
        let location = self.parse_location(location)?;
        self.db
            .read(|conn| SubtreeAggregator::new(conn, self.category, self.codec).total(&location))
    }

    pub fn item(&self, id: ItemId) -> LedgerResult<Option<ItemRecord>> {
        self.db.read(|conn| self.ledger(conn).get(id))
    }

    pub fn id_of(&self, item_type: &str, location: &str) -> LedgerResult<Option<ItemId>> {
        let location = self.parse_location(location)?;
        self.db
            .read(|conn| self.ledger(conn).id_of(item_type.trim(), &location))
    }

    pub fn can_remove(&self, id: ItemId) -> LedgerResult<bool> {
        self.db.read(|conn| self.ledger(conn).can_remove(id))
    }

    pub fn find_by_type(&self, item_type: &str) -> LedgerResult<Vec<ItemRecord>> {
        self.db.read(|conn| self.ledger(conn).find_by_type(item_type))
    }

    /// Every item row in the category
    pub fn stock(&self) -> LedgerResult<Vec<ItemRecord>> {
        self.db.read(|conn| self.ledger(conn).all())
    }

    pub fn journal(&self, limit: usize) -> LedgerResult<Vec<JournalEntry>> {
        self.db
            .read(|conn| Journal::new(conn).recent(Some(self.category), limit))
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Create a location named `name` below `parent` (or at the top level).
    /// Returns the new path.
    pub fn create_location(&self, parent: Option<&str>, name: &str) -> LedgerResult<String> {
        let parent = parent.map(|p| self.parse_location(p)).transpose()?;
        let path = self.codec.join(parent.as_deref(), name)?;
        self.create_path(&path, parent.as_deref())
    }

    /// Create a location from a full path; its parent must already exist
    pub fn create_location_path(&self, path: &str) -> LedgerResult<String> {
        let path = self.parse_location(path)?;
        let parent = self.codec.parent_of(&path).map(str::to_string);
        self.create_path(&path, parent.as_deref())
    }

    fn create_path(&self, path: &str, parent: Option<&str>) -> LedgerResult<String> {
        debug!(category = %self.category, location = path, "create location");
        self.db.write(|conn| {
            LocationLifecycle::new(conn, self.category, self.codec).create(path, parent)?;
            Journal::new(conn).record(
                self.category,
                Action::CreateLocation,
                NewEntry {
                    destination: Some(path),
                    ..Default::default()
                },
            )
        })?;
        info!(category = %self.category, location = path, "location created");
        Ok(path.to_string())
    }

    /// Delete a location and its descendants, folding their stock into the
    /// parent (or `Unassigned`)
    pub fn delete_location(&self, location: &str) -> LedgerResult<DeletionReport> {
        let location = self.parse_location(location)?;
        debug!(category = %self.category, location = %location, "delete location");
        let report = self.db.write(|conn| {
            let report = LocationLifecycle::new(conn, self.category, self.codec).delete(&location)?;
            let total: i64 = report.merged.iter().map(|l| l.quantity).sum();
            Journal::new(conn).record(
                self.category,
                Action::DeleteLocation,
                NewEntry {
                    quantity: Some(total),
                    source: Some(&location),
                    destination: Some(&report.destination),
                    ..Default::default()
                },
            )?;
            Ok(report)
        })?;
        info!(
            category = %self.category,
            location = %location,
            destination = %report.destination,
            removed = report.locations_removed,
            "location deleted"
        );
        Ok(report)
    }

    /// Add stock, creating the location on first use
    pub fn add_item(&self, item_type: &str, count: i64, location: &str) -> LedgerResult<ItemId> {
        let location = self.parse_location(location)?;
        let item_type = item_type.trim();
        debug!(category = %self.category, item_type, count, location = %location, "add item");
        let id = self.db.write(|conn| {
            let id = self.ledger(conn).add(item_type, &location, count)?;
            Journal::new(conn).record(
                self.category,
                Action::Add,
                NewEntry {
                    item_type: Some(item_type),
                    quantity: Some(count),
                    destination: Some(&location),
                    ..Default::default()
                },
            )?;
            Ok(id)
        })?;
        info!(category = %self.category, %id, item_type, count, location = %location, "item added");
        Ok(id)
    }

    /// Take stock out of an item row. Returns the row as it now stands
    /// (quantity zero if it was deleted).
    pub fn remove_item(&self, id: ItemId, count: i64) -> LedgerResult<ItemRecord> {
        debug!(category = %self.category, %id, count, "remove item");
        let record = self.db.write(|conn| {
            let record = self.ledger(conn).remove(id, count)?;
            Journal::new(conn).record(
                self.category,
                Action::Remove,
                NewEntry {
                    item_type: Some(&record.item_type),
                    quantity: Some(count),
                    source: Some(&record.location),
                    ..Default::default()
                },
            )?;
            Ok(record)
        })?;
        info!(category = %self.category, %id, count, remaining = record.quantity, "item removed");
        Ok(record)
    }

    /// Move `count` of item `id` to `destination`
    pub fn move_item(&self, id: ItemId, destination: &str, count: i64) -> LedgerResult<MoveOutcome> {
        let destination = self.parse_location(destination)?;
        debug!(category = %self.category, %id, count, destination = %destination, "move item");
        let outcome = self.db.write(|conn| {
            let outcome =
                TransferCoordinator::new(conn, self.category, self.codec).transfer(id, &destination, count)?;
            Journal::new(conn).record(
                self.category,
                Action::Move,
                NewEntry {
                    item_type: Some(&outcome.item_type),
                    quantity: Some(count),
                    source: Some(&outcome.source),
                    destination: Some(&outcome.destination),
                },
            )?;
            Ok(outcome)
        })?;
        info!(
            category = %self.category,
            %id,
            count,
            source = %outcome.source,
            destination = %outcome.destination,
            "item moved"
        );
        Ok(outcome)
    }

    fn ledger<'c>(&self, conn: &'c rusqlite::Connection) -> ItemLedger<'c> {
        ItemLedger::new(conn, self.category, self.codec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::core::journal::Action;
    use proptest::prelude::*;

    fn line(item_type: &str, quantity: i64) -> StockLine {
        StockLine {
            item_type: item_type.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_move_then_add_scenario() {
        let db = Database::open_in_memory().unwrap();
        let inv = Inventory::new(&db, Category::Cables, PathCodec::default());

        let id = inv.add_item("USB-C Cable", 5, "Lab/Bench3").unwrap();
        let err = inv.move_item(id, "Lab/Bench1", 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DestinationNotFound);
        assert!(!inv.exists("Lab/Bench1").unwrap());
        // Bench1 does not exist yet; create it and retry
        inv.create_location(Some("Lab"), "Bench1").unwrap();
        inv.move_item(id, "Lab/Bench1", 3).unwrap();
        inv.add_item("USB-C Cable", 2, "Lab/Bench1").unwrap();

        assert_eq!(inv.by_location("Lab/Bench3").unwrap(), vec![line("USB-C Cable", 2)]);
        assert_eq!(inv.by_location("Lab/Bench1").unwrap(), vec![line("USB-C Cable", 5)]);
        assert_eq!(inv.summarize("Lab").unwrap(), vec![line("USB-C Cable", 7)]);
    }

    #[test]
    fn test_total_includes_descendants_only() {
        let db = Database::open_in_memory().unwrap();
        let inv = Inventory::new(&db, Category::Cables, PathCodec::default());

        inv.add_item("HDMI", 1, "Lab").unwrap();
        inv.add_item("HDMI", 2, "Lab/Bench1").unwrap();
        inv.add_item("VGA", 4, "Lab/Bench1/Drawer").unwrap();
        inv.add_item("HDMI", 40, "Laboratory").unwrap();

        assert_eq!(inv.total("Lab").unwrap(), 7);
        assert_eq!(inv.total(" Lab / Bench1 ").unwrap(), 6);
        assert_eq!(inv.total("Office").unwrap(), 0);
        assert_eq!(inv.total(UNASSIGNED).unwrap(), 0);
    }

    #[test]
    fn test_full_self_move_keeps_row() {
        let db = Database::open_in_memory().unwrap();
        let inv = Inventory::new(&db, Category::Cables, PathCodec::default());

        let id = inv.add_item("HDMI", 3, "Lab").unwrap();
        let outcome = inv.move_item(id, "Lab", 3).unwrap();
        assert_eq!(outcome.destination_id, id);
        assert_eq!(inv.item(id).unwrap().map(|r| r.quantity), Some(3));
    }

    #[test]
    fn test_delete_drawer_scenario() {
        let db = Database::open_in_memory().unwrap();
        let inv = Inventory::new(&db, Category::Chargers, PathCodec::default());

        inv.create_location(None, "Lab").unwrap();
        inv.create_location_path("Lab/Bench3").unwrap();
        inv.create_location_path("Lab/Bench3/Drawer1").unwrap();
        inv.add_item("65W USB-C", 4, "Lab/Bench3/Drawer1").unwrap();

        let report = inv.delete_location("Lab/Bench3/Drawer1").unwrap();
        assert_eq!(report.destination, "Lab/Bench3");
        assert_eq!(inv.by_location("Lab/Bench3").unwrap(), vec![line("65W USB-C", 4)]);
        assert!(!inv.exists("Lab/Bench3/Drawer1").unwrap());
    }

    #[test]
    fn test_delete_unassigned_is_protected() {
        let db = Database::open_in_memory().unwrap();
        let inv = Inventory::new(&db, Category::Cables, PathCodec::default());
        let err = inv.delete_location("Unassigned").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProtectedLocation);
    }

    #[test]
    fn test_create_location_skips_no_ancestors() {
        let db = Database::open_in_memory().unwrap();
        let inv = Inventory::new(&db, Category::Cables, PathCodec::default());
        let err = inv.create_location_path("Lab/Bench3").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParentNotFound);
        assert!(!inv.exists("Lab").unwrap());
    }

    #[test]
    fn test_locations_are_normalized() {
        let db = Database::open_in_memory().unwrap();
        let inv = Inventory::new(&db, Category::Cables, PathCodec::default());
        inv.add_item(" HDMI ", 1, " Lab / Bench3/ ").unwrap();
        assert_eq!(inv.by_location("Lab/Bench3").unwrap(), vec![line("HDMI", 1)]);
        assert!(inv.id_of("HDMI", "Lab/Bench3/").unwrap().is_some());
    }

    #[test]
    fn test_list_locations_includes_unassigned_and_implied() {
        let db = Database::open_in_memory().unwrap();
        let inv = Inventory::new(&db, Category::Accessories, PathCodec::default());
        inv.add_item("Mouse", 2, "Office/Desk").unwrap();
        assert_eq!(
            inv.list_locations().unwrap(),
            vec!["Office", "Office/Desk", "Unassigned"]
        );
        let top: Vec<_> = inv.child_segments(None).unwrap().into_iter().collect();
        assert_eq!(top, vec!["Office", "Unassigned"]);
    }

    #[test]
    fn test_journal_skips_failed_commands() {
        let db = Database::open_in_memory().unwrap();
        let inv = Inventory::new(&db, Category::Cables, PathCodec::default());
        let id = inv.add_item("HDMI", 2, "Lab").unwrap();
        inv.remove_item(id, 5).unwrap_err();
        inv.remove_item(id, 1).unwrap();

        let actions: Vec<_> = inv.journal(10).unwrap().into_iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![Action::Remove, Action::Add]);
    }

    #[test]
    fn test_requery_is_stable() {
        let db = Database::open_in_memory().unwrap();
        let inv = Inventory::new(&db, Category::Cables, PathCodec::default());
        inv.add_item("HDMI", 2, "Lab").unwrap();
        inv.add_item("VGA", 2, "Lab").unwrap();
        inv.add_item("DisplayPort", 7, "Lab").unwrap();
        assert_eq!(inv.by_location("Lab").unwrap(), inv.by_location("Lab").unwrap());
        assert_eq!(
            inv.by_location("Lab").unwrap(),
            vec![line("DisplayPort", 7), line("HDMI", 2), line("VGA", 2)]
        );
    }

    #[test]
    fn test_custom_separator() {
        let db = Database::open_in_memory().unwrap();
        let inv = Inventory::new(&db, Category::Adapters, PathCodec::new('>'));
        inv.add_item("DVI to VGA", 1, "Rack 1/2 > Shelf").unwrap();
        assert!(inv.exists("Rack 1/2").unwrap());
        let report = inv.delete_location("Rack 1/2>Shelf").unwrap();
        assert_eq!(report.destination, "Rack 1/2");
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(usize, usize, i64),
        Remove(usize, i64),
        Move(usize, usize, i64),
        Delete(usize),
    }

    const TYPES: [&str; 3] = ["HDMI", "VGA", "USB-C"];
    const PLACES: [&str; 5] = ["Lab", "Lab/Bench1", "Lab/Bench1/Drawer", "Office", "Unassigned"];

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..TYPES.len(), 0..PLACES.len(), -2i64..10).prop_map(|(t, p, n)| Op::Add(t, p, n)),
            (0..8usize, -2i64..10).prop_map(|(i, n)| Op::Remove(i, n)),
            (0..8usize, 0..PLACES.len(), -2i64..10).prop_map(|(i, p, n)| Op::Move(i, p, n)),
            (0..PLACES.len()).prop_map(Op::Delete),
        ]
    }

    fn totals(inv: &Inventory) -> i64 {
        inv.stock().unwrap().iter().map(|r| r.quantity).sum()
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: no sequence of commands leaves a quantity at or below
        /// zero, and only add/remove change the overall total.
        #[test]
        fn quantities_stay_positive_and_are_conserved(ops in prop::collection::vec(op(), 1..30)) {
            let db = Database::open_in_memory().unwrap();
            let inv = Inventory::new(&db, Category::Cables, PathCodec::default());

            for op in ops {
                let before = totals(&inv);
                let rows = inv.stock().unwrap();
                let pick = |i: usize| rows.get(i % rows.len().max(1)).map(|r| r.id);

                let expected = match op {
                    Op::Add(t, p, n) => match inv.add_item(TYPES[t], n, PLACES[p]) {
                        Ok(_) => before + n,
                        Err(_) => before,
                    },
                    Op::Remove(i, n) => match pick(i).map(|id| inv.remove_item(id, n)) {
                        Some(Ok(_)) => before - n,
                        _ => before,
                    },
                    Op::Move(i, p, n) => {
                        if let Some(id) = pick(i) {
                            let _ = inv.move_item(id, PLACES[p], n);
                        }
                        before
                    }
                    Op::Delete(p) => {
                        let _ = inv.delete_location(PLACES[p]);
                        before
                    }
                };

                prop_assert_eq!(totals(&inv), expected);
                for row in inv.stock().unwrap() {
                    prop_assert!(row.quantity > 0);
                    prop_assert!(inv.exists(&row.location).unwrap());
                }
            }
        }

        /// Property: a failed move leaves both ends untouched; a successful
        /// one shifts exactly `count`.
        #[test]
        fn moves_are_atomic(start in 1i64..20, count in -3i64..25) {
            let db = Database::open_in_memory().unwrap();
            let inv = Inventory::new(&db, Category::Cables, PathCodec::default());
            let id = inv.add_item("HDMI", start, "Lab").unwrap();
            inv.add_item("HDMI", 1, "Office").unwrap();

            let result = inv.move_item(id, "Office", count);
            let src = inv.by_location("Lab").unwrap().first().map_or(0, |l| l.quantity);
            let dst = inv.by_location("Office").unwrap()[0].quantity;

            if result.is_ok() {
                prop_assert_eq!(src, start - count);
                prop_assert_eq!(dst, 1 + count);
            } else {
                prop_assert_eq!(src, start);
                prop_assert_eq!(dst, 1);
            }
            prop_assert_eq!(src + dst, start + 1);
        }

        /// Property: deleting a location moves its whole subtree total, per
        /// type, into the destination.
        #[test]
        fn deletion_conserves_per_type(counts in prop::collection::vec(1i64..50, 3)) {
            let db = Database::open_in_memory().unwrap();
            let inv = Inventory::new(&db, Category::Cables, PathCodec::default());
            inv.add_item("HDMI", counts[0], "Lab").unwrap();
            inv.add_item("HDMI", counts[1], "Lab/Bench1").unwrap();
            inv.add_item("HDMI", counts[2], "Lab/Bench1/Drawer").unwrap();

            let subtree = inv.summarize("Lab/Bench1").unwrap();
            inv.delete_location("Lab/Bench1").unwrap();

            prop_assert_eq!(subtree[0].quantity, counts[1] + counts[2]);
            prop_assert_eq!(
                inv.by_location("Lab").unwrap()[0].quantity,
                counts[0] + counts[1] + counts[2]
            );
            prop_assert!(!inv.exists("Lab/Bench1").unwrap());
            prop_assert!(!inv.exists("Lab/Bench1/Drawer").unwrap());
        }
    }
}
