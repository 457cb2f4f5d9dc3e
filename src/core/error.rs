//! Ledger error types
//!
//! Every ledger operation returns a typed [`LedgerError`]. The variants map
//! onto a small set of [`ErrorKind`]s that callers can match on without
//! caring about the payload.

use miette::Diagnostic;
use thiserror::Error;

use crate::core::ledger::ItemId;

/// Result alias used throughout the ledger
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

/// Coarse classification of ledger failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidQuantity,
    InvalidItemType,
    NotFound,
    InsufficientQuantity,
    AlreadyExists,
    ParentNotFound,
    DestinationNotFound,
    ProtectedLocation,
    InvalidSegment,
    SameLocation,
    Database,
}

/// Errors returned by ledger queries and commands
#[derive(Debug, Error, Diagnostic)]
pub enum LedgerError {
    #[error("quantity must be a positive integer, got {0}")]
    #[diagnostic(code(stockpath::invalid_quantity))]
    InvalidQuantity(i64),

    #[error("item type must not be empty")]
    #[diagnostic(code(stockpath::invalid_item_type))]
    InvalidItemType,

    #[error("no item with id {0}")]
    #[diagnostic(
        code(stockpath::not_found),
        help("List the location with `stockpath item list <LOCATION>` to see item ids")
    )]
    ItemNotFound(ItemId),

    #[error("no '{item_type}' stocked at '{location}'")]
    #[diagnostic(code(stockpath::not_found))]
    StockNotFound { item_type: String, location: String },

    #[error("location '{0}' does not exist")]
    #[diagnostic(code(stockpath::not_found))]
    LocationNotFound(String),

    #[error("cannot take {requested} of '{item_type}': only {available} in stock")]
    #[diagnostic(code(stockpath::insufficient_quantity))]
    InsufficientQuantity {
        item_type: String,
        requested: i64,
        available: i64,
    },

    #[error("location '{0}' already exists")]
    #[diagnostic(code(stockpath::already_exists))]
    AlreadyExists(String),

    #[error("parent location '{0}' does not exist")]
    #[diagnostic(
        code(stockpath::parent_not_found),
        help("Create each parent location first; intermediate locations are not created automatically")
    )]
    ParentNotFound(String),

    #[error("destination location '{0}' does not exist")]
    #[diagnostic(code(stockpath::destination_not_found))]
    DestinationNotFound(String),

    #[error("location '{0}' is protected and cannot be deleted")]
    #[diagnostic(
        code(stockpath::protected_location),
        help("'Unassigned' and everything below it always exist")
    )]
    ProtectedLocation(String),

    #[error("invalid path segment '{segment}': {reason}")]
    #[diagnostic(code(stockpath::invalid_segment))]
    InvalidSegment { segment: String, reason: String },

    #[error("item {0} is already at '{1}'")]
    #[diagnostic(code(stockpath::same_location))]
    SameLocation(ItemId, String),

    #[error("database schema version {found} is newer than supported version {supported}")]
    #[diagnostic(
        code(stockpath::unsupported_schema),
        help("Upgrade stockpath to open this database")
    )]
    UnsupportedSchema { found: i32, supported: i32 },

    #[error("database error: {0}")]
    #[diagnostic(code(stockpath::database))]
    Database(#[from] rusqlite::Error),
}

impl LedgerError {
    /// The error kind, independent of payload
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidQuantity(_) => ErrorKind::InvalidQuantity,
            LedgerError::InvalidItemType => ErrorKind::InvalidItemType,
            LedgerError::ItemNotFound(_)
            | LedgerError::StockNotFound { .. }
            | LedgerError::LocationNotFound(_) => ErrorKind::NotFound,
            LedgerError::InsufficientQuantity { .. } => ErrorKind::InsufficientQuantity,
            LedgerError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            LedgerError::ParentNotFound(_) => ErrorKind::ParentNotFound,
            LedgerError::DestinationNotFound(_) => ErrorKind::DestinationNotFound,
            LedgerError::ProtectedLocation(_) => ErrorKind::ProtectedLocation,
            LedgerError::InvalidSegment { .. } => ErrorKind::InvalidSegment,
            LedgerError::SameLocation(..) => ErrorKind::SameLocation,
            LedgerError::UnsupportedSchema { .. } | LedgerError::Database(_) => {
                ErrorKind::Database
            }
        }
    }

    pub(crate) fn invalid_segment(segment: &str, reason: impl Into<String>) -> Self {
        LedgerError::InvalidSegment {
            segment: segment.to_string(),
            reason: reason.into(),
        }
    }
}
