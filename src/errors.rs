//! Unified error type for the quoting core.
//!
//! Catalog and discount fetch failures are returned as `Err` by the fetch layer and
//! recovered by the fail-open wrappers; they never reach the user. Only persistence
//! and validation failures are meant to block an interaction.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the quoting core.
#[derive(Debug, Error)]
pub enum Error {
    /// Settings or seed catalog could not be loaded.
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong with the configuration
        message: String,
    },

    /// A query against the store failed.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A JSON column could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The quote store rejected a write; carries the store's message verbatim.
    #[error("Could not save the quote: {message}")]
    PersistenceFailed {
        /// Message reported by the store
        message: String,
    },

    /// A selection the family requires is absent or no longer offered.
    #[error("Missing required selection: {field}")]
    MissingSelection {
        /// Name of the missing selection
        field: &'static str,
    },

    /// The price table has no row for the current selection.
    #[error("No price is available for this {family} configuration, please consult us")]
    PriceUnresolved {
        /// Family tag of the configuration
        family: String,
    },

    /// The total does not reach the family's minimum order.
    #[error("The minimum order for this product is {minimum}, current total is {total}")]
    BelowMinimumOrder {
        /// Computed total
        total: Decimal,
        /// Minimum accepted total
        minimum: Decimal,
    },

    /// A stored amount is NaN or infinite.
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The offending value
        amount: f64,
    },

    /// A measure is zero or negative.
    #[error("Invalid {field}: {value}")]
    InvalidDimension {
        /// Which measure was rejected
        field: &'static str,
        /// The rejected value in millimetres
        value: i64,
    },

    /// No quote with this id is visible to the caller.
    #[error("Quote not found: {id}")]
    QuoteNotFound {
        /// Requested quote id
        id: i64,
    },

    /// The quote is paid and read-only.
    #[error("Quote {id} has been paid and can no longer be modified")]
    QuoteLocked {
        /// Id of the paid quote
        id: i64,
    },

    /// Payment was confirmed for a quote without an order.
    #[error("No order exists for quote {quote_id}")]
    OrderNotFound {
        /// Quote the order was looked up by
        quote_id: i64,
    },

    /// A family tag did not match any known family.
    #[error("Unknown product family: {value}")]
    UnknownFamily {
        /// The unrecognized tag
        value: String,
    },
}

impl Error {
    /// True for failures raised before anything is persisted.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingSelection { .. }
                | Self::PriceUnresolved { .. }
                | Self::BelowMinimumOrder { .. }
                | Self::InvalidDimension { .. }
                | Self::QuoteLocked { .. }
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
