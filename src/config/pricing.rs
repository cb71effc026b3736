//! Pricing policy settings loaded from the `[pricing]` table of config.toml.
//!
//! Every field has a default so the table may be omitted entirely.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Tunable pricing rules that are not part of the catalog data.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    /// Minimum order total for pergolas
    pub pergola_minimum_order: Decimal,
    /// Whether the minimum order is also checked when re-saving an existing quote
    pub enforce_minimum_on_edit: bool,
    /// Whether saving is blocked when no price row matches the configuration
    pub block_unresolved_price: bool,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            pergola_minimum_order: Decimal::from(2500),
            enforce_minimum_on_edit: false,
            block_unresolved_price: true,
        }
    }
}
