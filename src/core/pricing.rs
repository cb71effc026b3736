//! Pricing engine - Turns a resolved base price, finish, accessories and client discount
//! into a price breakdown.
//!
//! All families share this engine; the family only changes how the finish increment
//! scales (see [`PricingStrategy`]). Amounts are rounded half-up to two decimals at each
//! step rather than once at the end, which is what stored totals were computed with.

use crate::{
    config::pricing::PricingSettings,
    core::family::{Basis, Dimensions, PricingStrategy, ProductFamily},
    errors::{Error, Result},
};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Rounds half away from zero to two decimal places.
#[must_use]
pub fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a stored `f64` amount into a two-decimal `Decimal`.
///
/// # Errors
/// Returns `Error::InvalidAmount` for NaN or infinite values.
pub fn money_from_f64(amount: f64) -> Result<Decimal> {
    Decimal::from_f64(amount)
        .map(round2)
        .ok_or(Error::InvalidAmount { amount })
}

/// Converts a `Decimal` amount into the `f64` stored in the database.
#[must_use]
pub fn money_to_f64(amount: Decimal) -> f64 {
    round2(amount).to_f64().unwrap_or_default()
}

/// One selected accessory with its unit price and quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryLine {
    /// Catalog identifier of the accessory
    pub id: i64,
    /// Accessory name
    pub name: String,
    /// Price per unit
    pub unit_price: Decimal,
    /// Selected quantity, never negative
    pub quantity: u32,
}

impl AccessoryLine {
    /// Creates a line from a user-requested quantity, clamping negative requests to zero.
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>, unit_price: Decimal, requested: i64) -> Self {
        Self {
            id,
            name: name.into(),
            unit_price,
            quantity: clamp_quantity(requested),
        }
    }

    /// `unit_price * quantity`, unrounded.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Clamps a requested quantity into `0..=u32::MAX`.
#[must_use]
pub fn clamp_quantity(requested: i64) -> u32 {
    u32::try_from(requested.max(0)).unwrap_or(u32::MAX)
}

/// Everything the engine needs for one computation.
#[derive(Debug, Clone)]
pub struct PricingInputs<'a> {
    /// Family being priced
    pub family: ProductFamily,
    /// Resolved base amount (already scaled by the base basis)
    pub base: Decimal,
    /// Raw increment of the selected finish, if any
    pub finish_increment: Option<Decimal>,
    /// Selected dimensions, if the family uses them
    pub dimensions: Option<Dimensions>,
    /// Selected accessories
    pub accessories: &'a [AccessoryLine],
    /// Client discount percentage (0-100)
    pub discount_pct: Decimal,
}

/// Result of a computation; every field is rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Base price
    pub base: Decimal,
    /// Finish/color increment
    pub color_increment: Decimal,
    /// Sum of accessory lines
    pub accessory_total: Decimal,
    /// `base + color_increment + accessory_total`
    pub subtotal: Decimal,
    /// Discount percentage that was applied
    pub discount_pct: Decimal,
    /// `subtotal * discount_pct / 100`
    pub discount_amount: Decimal,
    /// `subtotal - discount_amount`
    pub total: Decimal,
}

/// Finish increment scaled by the family's increment basis.
///
/// A scaled basis without dimensions yields zero; required dimensions are enforced
/// before submission, not here.
#[must_use]
pub fn color_increment(
    strategy: &PricingStrategy,
    increment: Option<Decimal>,
    dimensions: Option<Dimensions>,
) -> Decimal {
    let Some(increment) = increment else {
        return Decimal::ZERO;
    };

    let amount = match (strategy.increment_basis, dimensions) {
        (Basis::Flat, _) => increment,
        (basis, Some(dims)) => increment * dims.factor(basis),
        (_, None) => Decimal::ZERO,
    };
    round2(amount)
}

/// Sum of `unit_price * quantity` over all lines.
#[must_use]
pub fn accessory_total(lines: &[AccessoryLine]) -> Decimal {
    round2(lines.iter().map(AccessoryLine::line_total).sum())
}

/// Clamps a discount percentage into `0..=100` and rounds it to two decimals.
#[must_use]
pub fn normalize_discount(pct: Decimal) -> Decimal {
    round2(pct.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED))
}

/// Computes the full price breakdown.
#[must_use]
pub fn compute_total(inputs: &PricingInputs<'_>) -> PriceBreakdown {
    let strategy = inputs.family.strategy();

    let base = round2(inputs.base);
    let color_increment = color_increment(&strategy, inputs.finish_increment, inputs.dimensions);
    let accessory_total = accessory_total(inputs.accessories);
    let subtotal = round2(base + color_increment + accessory_total);

    let discount_pct = normalize_discount(inputs.discount_pct);
    let discount_amount = round2(subtotal * discount_pct / Decimal::ONE_HUNDRED);
    let total = round2(subtotal - discount_amount);

    PriceBreakdown {
        base,
        color_increment,
        accessory_total,
        subtotal,
        discount_pct,
        discount_amount,
        total,
    }
}

/// Rejects totals below the family's minimum order.
///
/// The minimum is always checked for new quotes. Re-saving an existing quote skips it
/// unless `enforce_minimum_on_edit` is set.
///
/// # Errors
/// Returns `Error::BelowMinimumOrder` when the total is under the minimum.
pub fn check_minimum_order(
    family: ProductFamily,
    total: Decimal,
    editing: bool,
    settings: &PricingSettings,
) -> Result<()> {
    if !family.strategy().has_minimum_order {
        return Ok(());
    }
    if editing && !settings.enforce_minimum_on_edit {
        return Ok(());
    }

    let minimum = settings.pergola_minimum_order;
    if total < minimum {
        return Err(Error::BelowMinimumOrder { total, minimum });
    }
    Ok(())
}
