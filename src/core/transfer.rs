//! Cross-location transfers
//!
//! Callers are expected to reject moving an item onto its own location
//! before calling [`TransferCoordinator::transfer`]; if such a move does get
//! through it validates as usual and then writes nothing, so the row keeps
//! its id and quantity.

use rusqlite::Connection;
use serde::Serialize;

use crate::core::catalog::LocationCatalog;
use crate::core::category::Category;
use crate::core::error::{LedgerError, LedgerResult};
use crate::core::ledger::{ItemId, ItemLedger};
use crate::core::path::PathCodec;

/// Result of a successful move
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveOutcome {
    pub item_type: String,
    pub source: String,
    /// Quantity left at the source; zero means its row was deleted
    pub source_remaining: i64,
    pub destination: String,
    pub destination_id: ItemId,
    pub destination_quantity: i64,
}

pub struct TransferCoordinator<'c> {
    catalog: LocationCatalog<'c>,
    ledger: ItemLedger<'c>,
}

impl<'c> TransferCoordinator<'c> {
    pub fn new(conn: &'c Connection, category: Category, codec: PathCodec) -> Self {
        Self {
            catalog: LocationCatalog::new(conn, category, codec),
            ledger: ItemLedger::new(conn, category, codec),
        }
    }

    /// Move `count` of item `id` to `destination`, merging into a row of the
    /// same type already there
    pub fn transfer(&self, id: ItemId, destination: &str, count: i64) -> LedgerResult<MoveOutcome> {
        if count <= 0 {
            return Err(LedgerError::InvalidQuantity(count));
        }
        if !self.catalog.exists(destination)? {
            return Err(LedgerError::DestinationNotFound(destination.to_string()));
        }
        let source = self.ledger.require(id)?;
        if count > source.quantity {
            return Err(LedgerError::InsufficientQuantity {
                item_type: source.item_type,
                requested: count,
                available: source.quantity,
            });
        }
        if source.location == destination {
            return Ok(MoveOutcome {
                item_type: source.item_type,
                source: source.location.clone(),
                source_remaining: source.quantity,
                destination: source.location,
                destination_id: id,
                destination_quantity: source.quantity,
            });
        }

        self.ledger.adjust(id, -count)?;
        let destination_id = match self.ledger.id_of(&source.item_type, destination)? {
            Some(existing) => {
                self.ledger.adjust(existing, count)?;
                existing
            }
            None => self.ledger.insert(&source.item_type, destination, count)?,
        };

        let source_remaining = self.ledger.get(id)?.map_or(0, |r| r.quantity);
        let destination_quantity = self.ledger.require(destination_id)?.quantity;

        Ok(MoveOutcome {
            item_type: source.item_type,
            source: source.location,
            source_remaining,
            destination: destination.to_string(),
            destination_id,
            destination_quantity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::database::Database;
    use crate::core::error::ErrorKind;
    use crate::core::path::UNASSIGNED;

    fn with_transfer<T>(
        f: impl FnOnce(&TransferCoordinator, &ItemLedger, &LocationCatalog) -> LedgerResult<T>,
    ) -> LedgerResult<T> {
        let db = Database::open_in_memory().unwrap();
        db.write(|conn| {
            let codec = PathCodec::default();
            f(
                &TransferCoordinator::new(conn, Category::Cables, codec),
                &ItemLedger::new(conn, Category::Cables, codec),
                &LocationCatalog::new(conn, Category::Cables, codec),
            )
        })
    }

    #[test]
    fn test_partial_move_creates_destination_row() {
        with_transfer(|tc, ledger, _| {
            let id = ledger.add("USB-C Cable", "Lab/Bench3", 5)?;
            ledger.add("Mouse", "Lab/Bench1", 1)?;

            let outcome = tc.transfer(id, "Lab/Bench1", 3)?;
            assert_eq!(outcome.source_remaining, 2);
            assert_eq!(outcome.destination_quantity, 3);
            assert_ne!(outcome.destination_id, id);

            ledger.add("USB-C Cable", "Lab/Bench1", 2)?;
            assert_eq!(ledger.by_location("Lab/Bench3")?[0].quantity, 2);
            assert_eq!(
                ledger.require(outcome.destination_id)?.quantity,
                5
            );
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_full_move_merges_and_deletes_source() {
        with_transfer(|tc, ledger, catalog| {
            let src = ledger.add("HDMI", "Lab", 4)?;
            let dst = ledger.add("HDMI", "Office", 1)?;

            let outcome = tc.transfer(src, "Office", 4)?;
            assert_eq!(outcome.destination_id, dst);
            assert_eq!(outcome.destination_quantity, 5);
            assert_eq!(outcome.source_remaining, 0);
            assert!(ledger.get(src)?.is_none());
            // The emptied source stays as a placeholder
            assert!(catalog.exists("Lab")?);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_move_to_unassigned() {
        with_transfer(|tc, ledger, _| {
            let id = ledger.add("HDMI", "Lab", 2)?;
            tc.transfer(id, UNASSIGNED, 2)?;
            assert_eq!(ledger.by_location(UNASSIGNED)?[0].quantity, 2);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_validation_order_and_no_side_effects() {
        with_transfer(|tc, ledger, _| {
            let id = ledger.add("HDMI", "Lab", 2)?;
            ledger.add("VGA", "Office", 1)?;

            let kind = |r: LedgerResult<MoveOutcome>| r.unwrap_err().kind();
            assert_eq!(kind(tc.transfer(id, "Nowhere", 0)), ErrorKind::InvalidQuantity);
            assert_eq!(
                kind(tc.transfer(ItemId(99), "Nowhere", 1)),
                ErrorKind::DestinationNotFound
            );
            assert_eq!(kind(tc.transfer(ItemId(99), "Office", 1)), ErrorKind::NotFound);
            assert_eq!(
                kind(tc.transfer(id, "Office", 3)),
                ErrorKind::InsufficientQuantity
            );

            assert_eq!(ledger.require(id)?.quantity, 2);
            assert_eq!(ledger.by_location("Office")?.len(), 1);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_self_move_is_harmless() {
        with_transfer(|tc, ledger, _| {
            let id = ledger.add("HDMI", "Lab", 3)?;
            tc.transfer(id, "Lab", 1)?;
            assert_eq!(ledger.require(id)?.quantity, 3);

            // Moving the whole row onto itself keeps the same id
            let outcome = tc.transfer(id, "Lab", 3)?;
            assert_eq!(outcome.destination_id, id);
            assert_eq!(outcome.source_remaining, 3);
            assert_eq!(outcome.destination_quantity, 3);
            assert_eq!(ledger.require(id)?.quantity, 3);
            assert_eq!(ledger.by_location("Lab")?.len(), 1);

            let kind = tc.transfer(id, "Lab", 4).unwrap_err().kind();
            assert_eq!(kind, ErrorKind::InsufficientQuantity);
            Ok(())
        })
        .unwrap();
    }
}
