//! Product families and their pricing strategies.
//!
//! Every family is priced by the same engine; what differs is captured by a
//! [`PricingStrategy`]: where sellable dimensions come from, which unit the base price
//! is expressed in, how the finish increment scales, and whether a minimum order applies.

use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The six product categories offered by the configurator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductFamily {
    /// Mosquito screens, priced per linear metre of perimeter from a size catalog
    MosquitoScreen,
    /// Roller-shutter panels, priced per square metre
    Panel,
    /// Solar protection, priced per model and color
    SolarProtection,
    /// Sectional garage doors, priced per catalog size
    SectionalDoor,
    /// Bioclimatic pergolas, priced per catalog size with a minimum order
    Pergola,
    /// Compact shutter boxes, priced per linear metre of guide rail
    CompactBox,
}

/// Unit in which an amount is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Basis {
    /// A fixed amount for the whole unit
    Flat,
    /// Amount per linear metre of perimeter
    PerLinearMeter,
    /// Amount per square metre of area
    PerSquareMeter,
}

/// Where the sellable dimensions of a family come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionSource {
    /// The family has no dimension selection, or it is optional free input
    None,
    /// Any measures typed in by the user
    FreeInput,
    /// The dimension table, unfiltered
    DimensionTable,
    /// The distinct dimension pairs present in the price table
    PriceRows,
}

/// Per-family pricing parameters consumed by the catalog resolver, price lookup and engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingStrategy {
    /// Where the dimension choices come from
    pub dimensions: DimensionSource,
    /// Whether dimensions must be set before a quote can be saved
    pub requires_dimensions: bool,
    /// Unit of the price table's `unit_price`
    pub base_basis: Basis,
    /// Unit of the finish's `increment`
    pub increment_basis: Basis,
    /// Whether a model must be chosen
    pub requires_model: bool,
    /// Whether a finish must be chosen
    pub requires_finish: bool,
    /// Whether a minimum order total applies
    pub has_minimum_order: bool,
    /// Labels of the dimension pair, in storage order
    pub dimension_labels: (&'static str, &'static str),
}

impl ProductFamily {
    /// All families, in display order.
    pub const ALL: [Self; 6] = [
        Self::MosquitoScreen,
        Self::Panel,
        Self::SolarProtection,
        Self::SectionalDoor,
        Self::Pergola,
        Self::CompactBox,
    ];

    /// Stable tag stored in the `family` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MosquitoScreen => "mosquito_screen",
            Self::Panel => "panel",
            Self::SolarProtection => "solar_protection",
            Self::SectionalDoor => "sectional_door",
            Self::Pergola => "pergola",
            Self::CompactBox => "compact_box",
        }
    }

    /// Returns the pricing parameters of this family.
    #[must_use]
    pub const fn strategy(self) -> PricingStrategy {
        match self {
            Self::MosquitoScreen => PricingStrategy {
                dimensions: DimensionSource::PriceRows,
                requires_dimensions: true,
                base_basis: Basis::PerLinearMeter,
                increment_basis: Basis::PerLinearMeter,
                requires_model: false,
                requires_finish: true,
                has_minimum_order: false,
                dimension_labels: ("height", "width"),
            },
            Self::Panel => PricingStrategy {
                dimensions: DimensionSource::FreeInput,
                requires_dimensions: true,
                base_basis: Basis::PerSquareMeter,
                increment_basis: Basis::PerSquareMeter,
                requires_model: true,
                requires_finish: true,
                has_minimum_order: false,
                dimension_labels: ("height", "width"),
            },
            // Finish increment is flat, not scaled by area
            Self::SolarProtection => PricingStrategy {
                dimensions: DimensionSource::None,
                requires_dimensions: false,
                base_basis: Basis::Flat,
                increment_basis: Basis::Flat,
                requires_model: true,
                requires_finish: true,
                has_minimum_order: false,
                dimension_labels: ("height", "width"),
            },
            Self::SectionalDoor => PricingStrategy {
                dimensions: DimensionSource::DimensionTable,
                requires_dimensions: true,
                base_basis: Basis::Flat,
                increment_basis: Basis::PerSquareMeter,
                requires_model: false,
                requires_finish: false,
                has_minimum_order: false,
                dimension_labels: ("width", "height"),
            },
            Self::Pergola => PricingStrategy {
                dimensions: DimensionSource::PriceRows,
                requires_dimensions: true,
                base_basis: Basis::Flat,
                increment_basis: Basis::PerSquareMeter,
                requires_model: false,
                requires_finish: false,
                has_minimum_order: true,
                dimension_labels: ("width", "depth"),
            },
            Self::CompactBox => PricingStrategy {
                dimensions: DimensionSource::FreeInput,
                requires_dimensions: true,
                base_basis: Basis::PerLinearMeter,
                increment_basis: Basis::Flat,
                requires_model: true,
                requires_finish: true,
                has_minimum_order: false,
                dimension_labels: ("height", "width"),
            },
        }
    }

    /// Whether the dimension choices come from a fixed catalog rather than free input.
    #[must_use]
    pub const fn uses_size_catalog(self) -> bool {
        matches!(
            self.strategy().dimensions,
            DimensionSource::DimensionTable | DimensionSource::PriceRows
        )
    }
}

impl fmt::Display for ProductFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductFamily {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|family| family.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| Error::UnknownFamily {
                value: s.to_string(),
            })
    }
}

/// A dimension pair in millimetres, in the family's storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// First measure (height for screens/panels/boxes, width for doors/pergolas)
    pub first_mm: i32,
    /// Second measure (width for screens/panels/boxes, height or depth for doors/pergolas)
    pub second_mm: i32,
}

impl Dimensions {
    /// Creates a dimension pair, rejecting non-positive measures.
    ///
    /// # Errors
    /// Returns `Error::InvalidDimension` if either measure is zero or negative.
    pub fn new(first_mm: i32, second_mm: i32) -> Result<Self> {
        if first_mm <= 0 {
            return Err(Error::InvalidDimension {
                field: "first_mm",
                value: i64::from(first_mm),
            });
        }
        if second_mm <= 0 {
            return Err(Error::InvalidDimension {
                field: "second_mm",
                value: i64::from(second_mm),
            });
        }
        Ok(Self {
            first_mm,
            second_mm,
        })
    }

    /// Perimeter in metres: `2 * (first + second) / 1000`.
    #[must_use]
    pub fn perimeter_m(self) -> Decimal {
        Decimal::from(2 * (i64::from(self.first_mm) + i64::from(self.second_mm)))
            / Decimal::from(1000)
    }

    /// Area in square metres: `first * second / 1_000_000`.
    #[must_use]
    pub fn area_m2(self) -> Decimal {
        Decimal::from(i64::from(self.first_mm) * i64::from(self.second_mm))
            / Decimal::from(1_000_000)
    }

    /// Scale factor for an amount expressed in `basis`.
    #[must_use]
    pub fn factor(self, basis: Basis) -> Decimal {
        match basis {
            Basis::Flat => Decimal::ONE,
            Basis::PerLinearMeter => self.perimeter_m(),
            Basis::PerSquareMeter => self.area_m2(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_family_tag_roundtrip() {
        for family in ProductFamily::ALL {
            assert_eq!(family.as_str().parse::<ProductFamily>().unwrap(), family);
        }
        assert_eq!(
            " Pergola ".parse::<ProductFamily>().unwrap(),
            ProductFamily::Pergola
        );
    }

    #[test]
    fn test_unknown_family_rejected() {
        let result = "awning".parse::<ProductFamily>();
        assert!(matches!(result, Err(Error::UnknownFamily { value }) if value == "awning"));
    }

    #[test]
    fn test_perimeter_of_square_metre() {
        let dims = Dimensions::new(1000, 1000).unwrap();
        assert_eq!(dims.perimeter_m(), Decimal::from(4));
    }

    #[test]
    fn test_area_in_square_metres() {
        let dims = Dimensions::new(2000, 1000).unwrap();
        assert_eq!(dims.area_m2(), Decimal::from(2));
        assert_eq!(dims.factor(Basis::Flat), Decimal::ONE);
    }

    #[test]
    fn test_non_positive_dimensions_rejected() {
        assert!(matches!(
            Dimensions::new(0, 1000),
            Err(Error::InvalidDimension {
                field: "first_mm",
                ..
            })
        ));
        assert!(matches!(
            Dimensions::new(1000, -5),
            Err(Error::InvalidDimension { value: -5, .. })
        ));
    }

    #[test]
    fn test_only_pergola_has_minimum_order() {
        let with_minimum: Vec<_> = ProductFamily::ALL
            .into_iter()
            .filter(|f| f.strategy().has_minimum_order)
            .collect();
        assert_eq!(with_minimum, vec![ProductFamily::Pergola]);
    }

    #[test]
    fn test_size_catalog_families() {
        assert!(ProductFamily::SectionalDoor.uses_size_catalog());
        assert!(ProductFamily::Pergola.uses_size_catalog());
        assert!(ProductFamily::MosquitoScreen.uses_size_catalog());
        assert!(!ProductFamily::Panel.uses_size_catalog());
        assert!(!ProductFamily::SolarProtection.uses_size_catalog());
    }
}
