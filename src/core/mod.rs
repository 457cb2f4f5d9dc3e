//! Core module - the ledger, its storage and its configuration

pub mod catalog;
pub mod category;
pub mod config;
pub mod database;
pub mod error;
pub mod inventory;
pub mod journal;
pub mod ledger;
pub mod lifecycle;
pub mod path;
pub mod project;
mod schema;
pub mod summary;
pub mod transfer;
pub mod tree;

pub use catalog::LocationCatalog;
pub use category::Category;
pub use config::Config;
pub use database::Database;
pub use error::{ErrorKind, LedgerError, LedgerResult};
pub use inventory::Inventory;
pub use journal::{Action, Journal, JournalEntry};
pub use ledger::{ItemId, ItemLedger, ItemRecord, StockLine};
pub use lifecycle::{DeletionReport, LocationLifecycle};
pub use path::{PathCodec, DEFAULT_SEPARATOR, UNASSIGNED};
pub use project::{Project, ProjectError};
pub use schema::SCHEMA_VERSION;
pub use summary::SubtreeAggregator;
pub use transfer::{MoveOutcome, TransferCoordinator};
pub use tree::{LocationNode, LocationTree};
