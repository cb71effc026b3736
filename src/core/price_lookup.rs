//! Price lookup - Resolves the base price of a configuration from the price table.
//!
//! A missing row is an expected outcome ("consult us") and is reported as
//! [`PriceResult::Unresolved`], never as zero and never as an error.

use crate::{
    core::{
        family::{Basis, Dimensions, ProductFamily},
        pricing::{money_from_f64, round2},
    },
    entities::{PriceRow, price_row},
    errors::Result,
};
use rust_decimal::Decimal;
use sea_orm::{Condition, QueryOrder, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The selection a price is looked up for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceKey {
    /// Selected model, for model-based families
    pub model_id: Option<i64>,
    /// Selected finish/color
    pub finish_id: Option<i64>,
    /// Selected dimensions
    pub dimensions: Option<Dimensions>,
}

/// A matched price row scaled to the selected dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPrice {
    /// Identifier of the matched row
    pub row_id: i64,
    /// Price as stored, in `basis` units
    pub unit_price: Decimal,
    /// Unit the stored price is expressed in
    pub basis: Basis,
    /// Base amount for the whole unit, rounded to two decimals
    pub amount: Decimal,
}

/// Outcome of a price lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceResult {
    /// A row matched the selection
    Resolved(ResolvedPrice),
    /// No row matches; the configuration must be quoted on request
    Unresolved,
}

impl PriceResult {
    /// The base amount, if resolved.
    #[must_use]
    pub const fn amount(&self) -> Option<Decimal> {
        match self {
            Self::Resolved(price) => Some(price.amount),
            Self::Unresolved => None,
        }
    }

    /// True when a price row matched.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// A row key column matches when it is unset (wildcard) or equal to the selection.
fn column_matches<T: PartialEq>(row: Option<T>, selected: Option<T>) -> bool {
    row.is_none_or(|value| selected == Some(value))
}

fn specificity(row: &price_row::Model) -> u8 {
    u8::from(row.finish_id.is_some()) * 4
        + u8::from(row.model_id.is_some()) * 2
        + u8::from(row.first_mm.is_some() && row.second_mm.is_some())
}

/// Finds the best row for `key` among `rows`.
///
/// Rows of other families are ignored. When several rows match, a finish-specific row
/// wins over a finish-agnostic one, then a model-specific row over a generic one; the
/// lowest id breaks any remaining tie.
#[must_use]
pub fn match_price_row<'a>(
    family: ProductFamily,
    rows: &'a [price_row::Model],
    key: &PriceKey,
) -> Option<&'a price_row::Model> {
    let first = key.dimensions.map(|d| d.first_mm);
    let second = key.dimensions.map(|d| d.second_mm);

    rows.iter()
        .filter(|row| row.family == family.as_str())
        .filter(|row| column_matches(row.model_id, key.model_id))
        .filter(|row| column_matches(row.finish_id, key.finish_id))
        .filter(|row| column_matches(row.first_mm, first))
        .filter(|row| column_matches(row.second_mm, second))
        .max_by(|a, b| {
            specificity(a)
                .cmp(&specificity(b))
                .then_with(|| b.id.cmp(&a.id))
        })
}

/// Scales a matched row to the selected dimensions.
///
/// Returns `Unresolved` when the family prices by perimeter or area but no dimensions
/// were given.
///
/// # Errors
/// Returns `Error::InvalidAmount` if the stored price is not a finite number.
pub fn resolve_row(
    family: ProductFamily,
    row: &price_row::Model,
    dimensions: Option<Dimensions>,
) -> Result<PriceResult> {
    let basis = family.strategy().base_basis;
    let unit_price = money_from_f64(row.unit_price)?;

    let factor = match (basis, dimensions) {
        (Basis::Flat, _) => Decimal::ONE,
        (basis, Some(dims)) => dims.factor(basis),
        (_, None) => return Ok(PriceResult::Unresolved),
    };

    Ok(PriceResult::Resolved(ResolvedPrice {
        row_id: row.id,
        unit_price,
        basis,
        amount: round2(unit_price * factor),
    }))
}

/// Looks up the base price of a configuration.
///
/// # Errors
/// Returns an error if the price table cannot be read. A missing row is not an error.
pub async fn lookup_price(
    db: &DatabaseConnection,
    family: ProductFamily,
    key: &PriceKey,
) -> Result<PriceResult> {
    let mut model_condition = Condition::any().add(price_row::Column::ModelId.is_null());
    if let Some(model_id) = key.model_id {
        model_condition = model_condition.add(price_row::Column::ModelId.eq(model_id));
    }

    let rows = PriceRow::find()
        .filter(price_row::Column::Family.eq(family.as_str()))
        .filter(model_condition)
        .order_by_asc(price_row::Column::Id)
        .all(db)
        .await?;

    match match_price_row(family, &rows, key) {
        Some(row) => resolve_row(family, row, key.dimensions),
        None => {
            debug!(%family, ?key, "No price row matches, price is unresolved");
            Ok(PriceResult::Unresolved)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn row(id: i64, family: ProductFamily, unit_price: f64) -> price_row::Model {
        price_row::Model {
            id,
            family: family.as_str().to_string(),
            model_id: None,
            finish_id: None,
            first_mm: None,
            second_mm: None,
            unit_price,
        }
    }

    #[test]
    fn test_perimeter_pricing() {
        let mut r = row(1, ProductFamily::MosquitoScreen, 10.0);
        r.first_mm = Some(1000);
        r.second_mm = Some(1000);
        let dims = Dimensions::new(1000, 1000).unwrap();

        let result = resolve_row(ProductFamily::MosquitoScreen, &r, Some(dims)).unwrap();
        assert_eq!(result.amount(), Some(dec("40.00")));
    }

    #[test]
    fn test_compact_box_row_priced_over_perimeter() {
        let r = row(1, ProductFamily::CompactBox, 38.0);
        let dims = Dimensions::new(1000, 1000).unwrap();

        let result = resolve_row(ProductFamily::CompactBox, &r, Some(dims)).unwrap();
        let PriceResult::Resolved(price) = result else {
            panic!("expected a resolved price");
        };
        assert_eq!(price.basis, Basis::PerLinearMeter);
        assert_eq!(price.amount, dec("152.00"));
    }

    #[test]
    fn test_area_pricing() {
        let r = row(1, ProductFamily::Panel, 50.0);
        let dims = Dimensions::new(2000, 1000).unwrap();

        let result = resolve_row(ProductFamily::Panel, &r, Some(dims)).unwrap();
        assert_eq!(result.amount(), Some(dec("100.00")));
    }

    #[test]
    fn test_scaled_basis_without_dimensions_is_unresolved() {
        let r = row(1, ProductFamily::CompactBox, 35.0);
        let result = resolve_row(ProductFamily::CompactBox, &r, None).unwrap();
        assert_eq!(result, PriceResult::Unresolved);
    }

    #[test]
    fn test_finish_specific_row_wins() {
        let mut generic = row(1, ProductFamily::SectionalDoor, 1200.0);
        generic.first_mm = Some(2500);
        generic.second_mm = Some(2000);
        let mut specific = generic.clone();
        specific.id = 2;
        specific.finish_id = Some(7);
        specific.unit_price = 1300.0;
        let rows = vec![generic, specific];

        let key = PriceKey {
            finish_id: Some(7),
            dimensions: Some(Dimensions::new(2500, 2000).unwrap()),
            ..PriceKey::default()
        };
        assert_eq!(
            match_price_row(ProductFamily::SectionalDoor, &rows, &key).map(|r| r.id),
            Some(2)
        );

        let other_finish = PriceKey {
            finish_id: Some(8),
            ..key
        };
        assert_eq!(
            match_price_row(ProductFamily::SectionalDoor, &rows, &other_finish).map(|r| r.id),
            Some(1)
        );
    }

    #[test]
    fn test_other_family_rows_ignored() {
        let rows = vec![row(1, ProductFamily::Pergola, 3000.0)];
        let key = PriceKey::default();
        assert!(match_price_row(ProductFamily::SectionalDoor, &rows, &key).is_none());
    }

    #[test]
    fn test_dimension_mismatch_does_not_match() {
        let mut r = row(1, ProductFamily::Pergola, 3000.0);
        r.first_mm = Some(3000);
        r.second_mm = Some(4000);
        let rows = vec![r];

        let key = PriceKey {
            dimensions: Some(Dimensions::new(3000, 4500).unwrap()),
            ..PriceKey::default()
        };
        assert!(match_price_row(ProductFamily::Pergola, &rows, &key).is_none());

        let no_dims = PriceKey::default();
        assert!(match_price_row(ProductFamily::Pergola, &rows, &no_dims).is_none());
    }

    #[tokio::test]
    async fn test_lookup_price_resolved_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let model = create_test_model(&db, ProductFamily::Panel, "Panel 45").await?;
        let finish = create_test_finish(&db, ProductFamily::Panel, "Blanco", 0.0).await?;
        let family = ProductFamily::Panel;
        create_test_price_row(&db, family, Some(model.id), Some(finish.id), None, 50.0).await?;

        let key = PriceKey {
            model_id: Some(model.id),
            finish_id: Some(finish.id),
            dimensions: Some(Dimensions::new(2000, 1000)?),
        };
        let result = lookup_price(&db, ProductFamily::Panel, &key).await?;

        let PriceResult::Resolved(price) = result else {
            panic!("expected a resolved price");
        };
        assert_eq!(price.basis, Basis::PerSquareMeter);
        assert_eq!(price.unit_price, dec("50.00"));
        assert_eq!(price.amount, dec("100.00"));

        Ok(())
    }

    #[tokio::test]
    async fn test_lookup_price_absent_is_unresolved() -> Result<()> {
        let db = setup_test_db().await?;
        let model = create_test_model(&db, ProductFamily::Panel, "Panel 45").await?;
        let finish = create_test_finish(&db, ProductFamily::Panel, "Blanco", 0.0).await?;
        let other = create_test_finish(&db, ProductFamily::Panel, "Gris", 0.0).await?;
        let family = ProductFamily::Panel;
        create_test_price_row(&db, family, Some(model.id), Some(finish.id), None, 50.0).await?;

        let key = PriceKey {
            model_id: Some(model.id),
            finish_id: Some(other.id),
            dimensions: Some(Dimensions::new(2000, 1000)?),
        };
        let result = lookup_price(&db, ProductFamily::Panel, &key).await?;
        assert_eq!(result, PriceResult::Unresolved);
        assert_eq!(result.amount(), None);

        Ok(())
    }

    #[tokio::test]
    async fn test_lookup_price_by_catalog_size_integration() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_price_row(
            &db,
            ProductFamily::Pergola,
            None,
            None,
            Some((3000, 4000)),
            2890.0,
        )
        .await?;

        let key = PriceKey {
            dimensions: Some(Dimensions::new(3000, 4000)?),
            ..PriceKey::default()
        };
        let result = lookup_price(&db, ProductFamily::Pergola, &key).await?;
        assert_eq!(result.amount(), Some(dec("2890.00")));

        Ok(())
    }
}
