/// Per-family catalog loading and administration
pub mod catalog;

/// Client discount resolution
pub mod discount;

/// Domain events for notifiers
pub mod events;

/// Product families and their pricing strategies
pub mod family;

/// Payment confirmation and order fulfillment
pub mod order;

/// Base price lookup against the price table
pub mod price_lookup;

/// Money arithmetic and price breakdowns
pub mod pricing;

/// Quote persistence
pub mod quote;

/// Rebuilding form state from stored quotes
pub mod rehydrate;

/// Interactive configurator sessions
pub mod session;
