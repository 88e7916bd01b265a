//! Unified error type for the stock ledger.
//!
//! Every core operation returns [`Result`]. Business-rule failures carry the ids of the
//! entities involved so callers can log or report them without another lookup.

use sea_orm::DbErr;
use thiserror::Error;

/// Errors produced by the ledger, capacity engine and order workflow.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed input. Raised before anything is written.
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Name of the offending input field
        field: String,
        /// Human-readable explanation
        message: String,
    },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. `"item"`
        entity: &'static str,
        /// Identifier or key that was looked up
        id: String,
    },

    /// A uniqueness rule would be violated.
    #[error("{entity} conflict: {message}")]
    Conflict {
        /// Entity kind, e.g. `"inventory location"`
        entity: &'static str,
        /// Human-readable explanation
        message: String,
    },

    /// A debit asked for more stock than the item holds.
    #[error(
        "Insufficient quantity for item {item_id}: available {available}, requested {requested}"
    )]
    InsufficientQuantity {
        /// Item being debited
        item_id: i64,
        /// Stock on hand when the debit was attempted
        available: i64,
        /// Quantity the debit asked for
        requested: i64,
    },

    /// Adding to the location would exceed its configured maximum.
    #[error(
        "Location {location_id} capacity exceeded: occupancy {occupancy}, max threshold {max_threshold}"
    )]
    CapacityExceeded {
        /// Location that refused the addition
        location_id: i64,
        /// Cumulative occupancy at the time of the check
        occupancy: i64,
        /// Configured maximum
        max_threshold: i64,
    },

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable explanation
        message: String,
    },

    /// Storage failure, propagated unchanged.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] on `field`.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::NotFound`] keyed by any displayable id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
