//! Quote editor rehydration - Rebuilds configurator form state from a stored quote.
//!
//! Stored quotes reference the catalog by display name and keep their own accessory
//! snapshot, so reopening one for editing maps those values back onto the live catalog:
//!
//! - the finish is matched by name, ignoring case; no match leaves it unselected
//! - accessories are matched by id, keeping the sold quantity but showing the live
//!   unit price (the price stored at sale time is kept alongside for display)
//! - model and catalog sizes fall back to the first available option when the stored
//!   one is gone, which may change the product if it was deactivated

use crate::{
    core::{
        catalog::Catalog,
        family::{DimensionSource, Dimensions, ProductFamily},
        price_lookup::PriceKey,
        pricing::{AccessoryLine, money_from_f64},
        quote::{AccessorySnapshot, accessory_snapshot},
    },
    entities::quote,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// One accessory row of the configurator form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessorySelection {
    /// Catalog identifier
    pub accessory_id: i64,
    /// Current catalog name
    pub name: String,
    /// Current catalog unit price
    pub unit_price: Decimal,
    /// Unit price recorded in the quote being edited, if it contained this accessory
    pub stored_unit_price: Option<Decimal>,
    /// Selected quantity
    pub quantity: u32,
}

/// Selections of a configurator form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    /// Family being configured
    pub family: ProductFamily,
    /// Selected dimensions
    pub dimensions: Option<Dimensions>,
    /// Selected model
    pub model_id: Option<i64>,
    /// Selected finish/color
    pub finish_id: Option<i64>,
    /// One row per catalog accessory
    pub accessories: Vec<AccessorySelection>,
}

impl FormState {
    /// An empty form listing every catalog accessory at quantity zero.
    #[must_use]
    pub fn blank(catalog: &Catalog) -> Self {
        Self {
            family: catalog.family,
            dimensions: None,
            model_id: None,
            finish_id: None,
            accessories: catalog
                .accessories
                .iter()
                .map(|a| AccessorySelection {
                    accessory_id: a.id,
                    name: a.name.clone(),
                    unit_price: money_from_f64(a.unit_price).unwrap_or_else(|e| {
                        warn!(accessory_id = a.id, error = %e, "Unreadable accessory price");
                        Decimal::ZERO
                    }),
                    stored_unit_price: None,
                    quantity: 0,
                })
                .collect(),
        }
    }

    /// The price table key for the current selection.
    #[must_use]
    pub const fn price_key(&self) -> PriceKey {
        PriceKey {
            model_id: self.model_id,
            finish_id: self.finish_id,
            dimensions: self.dimensions,
        }
    }

    /// Sets the quantity of an accessory, clamping negative requests to zero.
    ///
    /// Returns false if the accessory is not part of the form.
    pub fn set_quantity(&mut self, accessory_id: i64, requested: i64) -> bool {
        let quantity = crate::core::pricing::clamp_quantity(requested);
        self.accessories
            .iter_mut()
            .find(|a| a.accessory_id == accessory_id)
            .map(|a| a.quantity = quantity)
            .is_some()
    }

    /// Accessory lines with a positive quantity, priced at the live catalog price.
    #[must_use]
    pub fn accessory_lines(&self) -> Vec<AccessoryLine> {
        self.accessories
            .iter()
            .filter(|a| a.quantity > 0)
            .map(|a| AccessoryLine {
                id: a.accessory_id,
                name: a.name.clone(),
                unit_price: a.unit_price,
                quantity: a.quantity,
            })
            .collect()
    }
}

fn stored_dimensions(quote: &quote::Model) -> Option<Dimensions> {
    Dimensions::new(quote.first_mm?, quote.second_mm?).ok()
}

fn rehydrate_dimensions(
    family: ProductFamily,
    quote: &quote::Model,
    catalog: &Catalog,
) -> Option<Dimensions> {
    let stored = stored_dimensions(quote);
    match family.strategy().dimensions {
        DimensionSource::DimensionTable | DimensionSource::PriceRows => stored
            .filter(|d| catalog.dimensions.contains(d))
            .or_else(|| {
                let fallback = catalog.dimensions.first().copied();
                if stored.is_some() {
                    debug!(quote_id = quote.id, ?stored, ?fallback, "Size no longer sold");
                }
                fallback
            }),
        DimensionSource::FreeInput | DimensionSource::None => stored,
    }
}

fn rehydrate_model(family: ProductFamily, quote: &quote::Model, catalog: &Catalog) -> Option<i64> {
    if !family.strategy().requires_model {
        return None;
    }
    quote
        .model_name
        .as_deref()
        .and_then(|name| catalog.model_by_name(name))
        .or_else(|| catalog.models.first())
        .map(|m| m.id)
}

/// Rebuilds the form state of a stored quote against the live catalog.
#[must_use]
pub fn rehydrate(family: ProductFamily, quote: &quote::Model, catalog: &Catalog) -> FormState {
    let mut form = FormState::blank(catalog);
    form.family = family;
    form.dimensions = rehydrate_dimensions(family, quote, catalog);
    form.model_id = rehydrate_model(family, quote, catalog);
    form.finish_id = quote
        .color
        .as_deref()
        .and_then(|name| catalog.finish_by_name(name))
        .map(|f| f.id);

    let stored: HashMap<i64, AccessorySnapshot> = accessory_snapshot(quote)
        .unwrap_or_else(|e| {
            warn!(quote_id = quote.id, error = %e, "Unreadable accessory snapshot");
            Vec::new()
        })
        .into_iter()
        .map(|line| (line.id, line))
        .collect();

    for selection in &mut form.accessories {
        if let Some(line) = stored.get(&selection.accessory_id) {
            selection.quantity = line.quantity;
            selection.stored_unit_price = money_from_f64(line.unit_price)
                .inspect_err(|e| {
                    warn!(
                        quote_id = quote.id,
                        accessory_id = line.id,
                        error = %e,
                        "Unreadable stored accessory price"
                    );
                })
                .ok();
        }
    }

    let dropped = stored
        .keys()
        .filter(|id| catalog.accessory_by_id(**id).is_none())
        .count();
    if dropped > 0 {
        debug!(quote_id = quote.id, dropped, "Dropped accessories missing from the catalog");
    }

    form
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::{accessory, finish, product_model};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn finish_row(id: i64, name: &str) -> finish::Model {
        finish::Model {
            id,
            family: "panel".to_string(),
            name: name.to_string(),
            increment: 0.0,
            swatch: "#FFFFFF".to_string(),
            active: true,
            sort_order: 0,
        }
    }

    fn model_row(id: i64, name: &str) -> product_model::Model {
        product_model::Model {
            id,
            family: "panel".to_string(),
            name: name.to_string(),
            active: true,
            sort_order: 0,
        }
    }

    fn accessory_row(id: i64, name: &str, unit_price: f64) -> accessory::Model {
        accessory::Model {
            id,
            family: "panel".to_string(),
            name: name.to_string(),
            unit_price,
            unit_label: "ud".to_string(),
            active: true,
            sort_order: 0,
        }
    }

    fn stored_quote(family: ProductFamily) -> quote::Model {
        let now = chrono::Utc::now();
        quote::Model {
            id: 1,
            client_id: "client-1".to_string(),
            family: family.as_str().to_string(),
            first_mm: Some(2000),
            second_mm: Some(1000),
            model_name: Some("Panel 45".to_string()),
            color: Some("Blanco".to_string()),
            accessories: serde_json::json!([
                {"id": 10, "name": "Motor", "unit_price": 120.0, "quantity": 2},
                {"id": 11, "name": "Crank", "unit_price": 15.0, "quantity": 1}
            ]),
            base_price: 100.0,
            color_increment: 0.0,
            accessory_total: 255.0,
            subtotal: 355.0,
            discount_pct: 0.0,
            discount_amount: 0.0,
            total: 355.0,
            paid: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn panel_catalog() -> Catalog {
        let mut catalog = Catalog::empty(ProductFamily::Panel);
        catalog.models = vec![model_row(1, "Panel 37"), model_row(2, "Panel 45")];
        catalog.finishes = vec![finish_row(5, "blanco"), finish_row(6, "Gris")];
        catalog.accessories = vec![
            accessory_row(10, "Motor", 135.0),
            accessory_row(12, "Sensor", 40.0),
        ];
        catalog
    }

    #[test]
    fn test_finish_matched_case_insensitively() {
        let form = rehydrate(
            ProductFamily::Panel,
            &stored_quote(ProductFamily::Panel),
            &panel_catalog(),
        );
        assert_eq!(form.finish_id, Some(5));
    }

    #[test]
    fn test_unknown_finish_left_empty() {
        let mut quote = stored_quote(ProductFamily::Panel);
        quote.color = Some("Unknown Color".to_string());

        let form = rehydrate(ProductFamily::Panel, &quote, &panel_catalog());
        assert_eq!(form.finish_id, None);
    }

    #[test]
    fn test_accessories_keep_quantity_with_live_price() {
        let form = rehydrate(
            ProductFamily::Panel,
            &stored_quote(ProductFamily::Panel),
            &panel_catalog(),
        );

        let motor = form.accessories.iter().find(|a| a.accessory_id == 10).unwrap();
        assert_eq!(motor.quantity, 2);
        assert_eq!(motor.unit_price, dec("135"));
        assert_eq!(motor.stored_unit_price, Some(dec("120")));

        let sensor = form.accessories.iter().find(|a| a.accessory_id == 12).unwrap();
        assert_eq!(sensor.quantity, 0);
        assert_eq!(sensor.stored_unit_price, None);

        // The crank left the catalog and is dropped
        assert!(form.accessories.iter().all(|a| a.accessory_id != 11));

        let lines = form.accessory_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].line_total(), dec("270"));
    }

    #[test]
    fn test_model_matched_by_name_then_first() {
        let form = rehydrate(
            ProductFamily::Panel,
            &stored_quote(ProductFamily::Panel),
            &panel_catalog(),
        );
        assert_eq!(form.model_id, Some(2));
        assert_eq!(form.dimensions, Some(Dimensions::new(2000, 1000).unwrap()));

        let mut quote = stored_quote(ProductFamily::Panel);
        quote.model_name = Some("Panel 60".to_string());
        let form = rehydrate(ProductFamily::Panel, &quote, &panel_catalog());
        assert_eq!(form.model_id, Some(1));
    }

    #[test]
    fn test_catalog_size_falls_back_to_first() {
        let mut catalog = Catalog::empty(ProductFamily::SectionalDoor);
        catalog.dimensions = vec![
            Dimensions::new(2500, 2000).unwrap(),
            Dimensions::new(3000, 2200).unwrap(),
        ];

        let mut quote = stored_quote(ProductFamily::SectionalDoor);
        quote.first_mm = Some(3000);
        quote.second_mm = Some(2200);
        let form = rehydrate(ProductFamily::SectionalDoor, &quote, &catalog);
        assert_eq!(form.dimensions, Some(Dimensions::new(3000, 2200).unwrap()));
        assert_eq!(form.model_id, None);

        quote.first_mm = Some(3500);
        let form = rehydrate(ProductFamily::SectionalDoor, &quote, &catalog);
        assert_eq!(form.dimensions, Some(Dimensions::new(2500, 2000).unwrap()));
    }

    #[test]
    fn test_malformed_snapshot_gives_no_accessories() {
        let mut quote = stored_quote(ProductFamily::Panel);
        quote.accessories = serde_json::json!({"not": "a list"});

        let form = rehydrate(ProductFamily::Panel, &quote, &panel_catalog());
        assert!(form.accessories.iter().all(|a| a.quantity == 0));
    }

    #[test]
    fn test_non_finite_accessory_price_reads_as_zero() {
        let mut catalog = panel_catalog();
        catalog.accessories[1].unit_price = f64::NAN;

        let form = FormState::blank(&catalog);
        assert_eq!(form.accessories[0].unit_price, dec("135"));
        assert_eq!(form.accessories[1].unit_price, Decimal::ZERO);
    }

    #[test]
    fn test_set_quantity_clamps() {
        let mut form = FormState::blank(&panel_catalog());
        assert!(form.set_quantity(10, -3));
        assert_eq!(form.accessories[0].quantity, 0);
        assert!(form.set_quantity(12, 4));
        assert!(!form.set_quantity(99, 1));
        assert_eq!(form.accessory_lines().len(), 1);
    }
}
