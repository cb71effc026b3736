//! Catalog resolver - Fetches the sellable options of a product family.
//!
//! Models, finishes and accessories are filtered to active rows. Dimensions follow the
//! family's [`DimensionSource`]: the sectional door size table is returned unfiltered,
//! while mosquito screens and pergolas derive their sizes from the price table, where a
//! size being priced is what makes it sellable.
//!
//! [`fetch_catalog`] reports store failures; [`get_catalog`] is the fail-open variant
//! used by configurators, returning an empty catalog so the caller can render
//! "no options available".

use crate::{
    config::catalog::CatalogSeed,
    core::family::{DimensionSource, Dimensions, ProductFamily},
    entities::{
        Accessory, Dimension, Finish, PriceRow, ProductModel, accessory, dimension, finish,
        price_row, product_model,
    },
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use std::collections::{BTreeSet, HashMap};
use tracing::{info, warn};

/// Sellable options of one family.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    /// Family these options belong to
    pub family: ProductFamily,
    /// Size choices, empty for free-input families
    pub dimensions: Vec<Dimensions>,
    /// Active models
    pub models: Vec<product_model::Model>,
    /// Active finishes/colors
    pub finishes: Vec<finish::Model>,
    /// Active accessories
    pub accessories: Vec<accessory::Model>,
}

impl Catalog {
    /// An empty catalog for `family`.
    #[must_use]
    pub const fn empty(family: ProductFamily) -> Self {
        Self {
            family,
            dimensions: Vec::new(),
            models: Vec::new(),
            finishes: Vec::new(),
            accessories: Vec::new(),
        }
    }

    /// True when the family has nothing to offer.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
            && self.models.is_empty()
            && self.finishes.is_empty()
            && self.accessories.is_empty()
    }

    /// Finds an offered model by id.
    #[must_use]
    pub fn model_by_id(&self, id: i64) -> Option<&product_model::Model> {
        self.models.iter().find(|m| m.id == id)
    }

    /// Finds an offered finish by id.
    #[must_use]
    pub fn finish_by_id(&self, id: i64) -> Option<&finish::Model> {
        self.finishes.iter().find(|f| f.id == id)
    }

    /// Finds an offered accessory by id.
    #[must_use]
    pub fn accessory_by_id(&self, id: i64) -> Option<&accessory::Model> {
        self.accessories.iter().find(|a| a.id == id)
    }

    /// Finds a finish by display name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn finish_by_name(&self, name: &str) -> Option<&finish::Model> {
        let wanted = name.trim().to_lowercase();
        self.finishes
            .iter()
            .find(|f| f.name.trim().to_lowercase() == wanted)
    }

    /// Finds a model by display name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn model_by_name(&self, name: &str) -> Option<&product_model::Model> {
        let wanted = name.trim().to_lowercase();
        self.models
            .iter()
            .find(|m| m.name.trim().to_lowercase() == wanted)
    }
}

async fn fetch_dimensions(
    db: &DatabaseConnection,
    family: ProductFamily,
) -> Result<Vec<Dimensions>> {
    match family.strategy().dimensions {
        DimensionSource::None | DimensionSource::FreeInput => Ok(Vec::new()),
        DimensionSource::DimensionTable => {
            let rows = Dimension::find()
                .filter(dimension::Column::Family.eq(family.as_str()))
                .order_by_asc(dimension::Column::SortOrder)
                .order_by_asc(dimension::Column::FirstMm)
                .order_by_asc(dimension::Column::SecondMm)
                .all(db)
                .await?;
            Ok(rows
                .into_iter()
                .filter_map(|d| Dimensions::new(d.first_mm, d.second_mm).ok())
                .collect())
        }
        DimensionSource::PriceRows => {
            let rows = PriceRow::find()
                .filter(price_row::Column::Family.eq(family.as_str()))
                .filter(price_row::Column::FirstMm.is_not_null())
                .filter(price_row::Column::SecondMm.is_not_null())
                .all(db)
                .await?;
            let pairs: BTreeSet<(i32, i32)> = rows
                .into_iter()
                .filter_map(|r| Some((r.first_mm?, r.second_mm?)))
                .collect();
            Ok(pairs
                .into_iter()
                .filter_map(|(first, second)| Dimensions::new(first, second).ok())
                .collect())
        }
    }
}

/// Fetches the active catalog of a family.
///
/// # Errors
/// Returns an error if any catalog table cannot be read.
pub async fn fetch_catalog(db: &DatabaseConnection, family: ProductFamily) -> Result<Catalog> {
    let tag = family.as_str();

    let models = ProductModel::find()
        .filter(product_model::Column::Family.eq(tag))
        .filter(product_model::Column::Active.eq(true))
        .order_by_asc(product_model::Column::SortOrder)
        .order_by_asc(product_model::Column::Name)
        .all(db)
        .await?;

    let finishes = Finish::find()
        .filter(finish::Column::Family.eq(tag))
        .filter(finish::Column::Active.eq(true))
        .order_by_asc(finish::Column::SortOrder)
        .order_by_asc(finish::Column::Name)
        .all(db)
        .await?;

    let accessories = Accessory::find()
        .filter(accessory::Column::Family.eq(tag))
        .filter(accessory::Column::Active.eq(true))
        .order_by_asc(accessory::Column::SortOrder)
        .order_by_asc(accessory::Column::Name)
        .all(db)
        .await?;

    let dimensions = fetch_dimensions(db, family).await?;

    Ok(Catalog {
        family,
        dimensions,
        models,
        finishes,
        accessories,
    })
}

/// Fetches the active catalog of a family, returning an empty catalog on failure.
pub async fn get_catalog(db: &DatabaseConnection, family: ProductFamily) -> Catalog {
    fetch_catalog(db, family).await.unwrap_or_else(|e| {
        warn!(%family, error = %e, "Catalog unavailable, showing no options");
        Catalog::empty(family)
    })
}

fn validate_name(name: &str, what: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::Config {
            message: format!("{what} name cannot be empty"),
        });
    }
    Ok(trimmed.to_string())
}

fn validate_price(amount: f64) -> Result<f64> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(amount)
}

/// Creates an active product model.
///
/// # Errors
/// Returns an error if the name is empty or the insert fails.
pub async fn create_model(
    db: &DatabaseConnection,
    family: ProductFamily,
    name: &str,
    sort_order: i32,
) -> Result<product_model::Model> {
    let model = product_model::ActiveModel {
        family: Set(family.as_str().to_string()),
        name: Set(validate_name(name, "Model")?),
        active: Set(true),
        sort_order: Set(sort_order),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Creates an active finish.
///
/// # Errors
/// Returns an error if the name is empty, the increment is negative or not finite,
/// or the insert fails.
pub async fn create_finish(
    db: &DatabaseConnection,
    family: ProductFamily,
    name: &str,
    increment: f64,
    swatch: &str,
    sort_order: i32,
) -> Result<finish::Model> {
    let finish = finish::ActiveModel {
        family: Set(family.as_str().to_string()),
        name: Set(validate_name(name, "Finish")?),
        increment: Set(validate_price(increment)?),
        swatch: Set(swatch.to_string()),
        active: Set(true),
        sort_order: Set(sort_order),
        ..Default::default()
    };
    finish.insert(db).await.map_err(Into::into)
}

/// Creates an active accessory.
///
/// # Errors
/// Returns an error if the name is empty, the price is negative or not finite,
/// or the insert fails.
pub async fn create_accessory(
    db: &DatabaseConnection,
    family: ProductFamily,
    name: &str,
    unit_price: f64,
    unit_label: &str,
    sort_order: i32,
) -> Result<accessory::Model> {
    let accessory = accessory::ActiveModel {
        family: Set(family.as_str().to_string()),
        name: Set(validate_name(name, "Accessory")?),
        unit_price: Set(validate_price(unit_price)?),
        unit_label: Set(unit_label.to_string()),
        active: Set(true),
        sort_order: Set(sort_order),
        ..Default::default()
    };
    accessory.insert(db).await.map_err(Into::into)
}

/// Adds a size to a family's dimension table.
///
/// # Errors
/// Returns an error if a measure is not positive or the insert fails.
pub async fn create_dimension(
    db: &DatabaseConnection,
    family: ProductFamily,
    dims: Dimensions,
    sort_order: i32,
) -> Result<dimension::Model> {
    let dims = Dimensions::new(dims.first_mm, dims.second_mm)?;
    let entry = dimension::ActiveModel {
        family: Set(family.as_str().to_string()),
        first_mm: Set(dims.first_mm),
        second_mm: Set(dims.second_mm),
        sort_order: Set(sort_order),
        ..Default::default()
    };
    entry.insert(db).await.map_err(Into::into)
}

/// Adds a price row.
///
/// # Errors
/// Returns an error if the price is negative or not finite, or the insert fails.
pub async fn create_price_row(
    db: &DatabaseConnection,
    family: ProductFamily,
    model_id: Option<i64>,
    finish_id: Option<i64>,
    dimensions: Option<Dimensions>,
    unit_price: f64,
) -> Result<price_row::Model> {
    let row = price_row::ActiveModel {
        family: Set(family.as_str().to_string()),
        model_id: Set(model_id),
        finish_id: Set(finish_id),
        first_mm: Set(dimensions.map(|d| d.first_mm)),
        second_mm: Set(dimensions.map(|d| d.second_mm)),
        unit_price: Set(validate_price(unit_price)?),
        ..Default::default()
    };
    row.insert(db).await.map_err(Into::into)
}

/// Activates or deactivates a finish. Deactivated finishes stay referenced by old quotes.
///
/// # Errors
/// Returns an error if the finish does not exist or the update fails.
pub async fn set_finish_active(
    db: &DatabaseConnection,
    finish_id: i64,
    active: bool,
) -> Result<finish::Model> {
    let mut finish: finish::ActiveModel = Finish::find_by_id(finish_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::Config {
            message: format!("Finish {finish_id} does not exist"),
        })?
        .into();
    finish.active = Set(active);
    finish.update(db).await.map_err(Into::into)
}

/// Activates or deactivates a product model.
///
/// # Errors
/// Returns an error if the model does not exist or the update fails.
pub async fn set_model_active(
    db: &DatabaseConnection,
    model_id: i64,
    active: bool,
) -> Result<product_model::Model> {
    let mut model: product_model::ActiveModel = ProductModel::find_by_id(model_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::Config {
            message: format!("Model {model_id} does not exist"),
        })?
        .into();
    model.active = Set(active);
    model.update(db).await.map_err(Into::into)
}

/// Activates or deactivates an accessory.
///
/// # Errors
/// Returns an error if the accessory does not exist or the update fails.
pub async fn set_accessory_active(
    db: &DatabaseConnection,
    accessory_id: i64,
    active: bool,
) -> Result<accessory::Model> {
    let mut accessory: accessory::ActiveModel = Accessory::find_by_id(accessory_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::Config {
            message: format!("Accessory {accessory_id} does not exist"),
        })?
        .into();
    accessory.active = Set(active);
    accessory.update(db).await.map_err(Into::into)
}

/// Changes the live unit price of an accessory. Stored quotes keep their snapshot.
///
/// # Errors
/// Returns an error if the price is invalid, the accessory does not exist, or the update
/// fails.
pub async fn set_accessory_price(
    db: &DatabaseConnection,
    accessory_id: i64,
    unit_price: f64,
) -> Result<accessory::Model> {
    let unit_price = validate_price(unit_price)?;
    let mut accessory: accessory::ActiveModel = Accessory::find_by_id(accessory_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::Config {
            message: format!("Accessory {accessory_id} does not exist"),
        })?
        .into();
    accessory.unit_price = Set(unit_price);
    let updated = accessory.update(db).await?;
    info!(accessory_id, unit_price, "Accessory price changed");
    Ok(updated)
}

/// Whether the store already holds any catalog data.
pub async fn has_catalog(db: &DatabaseConnection) -> Result<bool> {
    let models = ProductModel::find().count(db).await?;
    let finishes = Finish::find().count(db).await?;
    let prices = PriceRow::find().count(db).await?;
    Ok(models + finishes + prices > 0)
}

fn lookup_seeded(
    ids: &HashMap<(ProductFamily, String), i64>,
    family: ProductFamily,
    name: Option<&String>,
    what: &str,
) -> Result<Option<i64>> {
    name.map(|n| {
        ids.get(&(family, n.trim().to_lowercase()))
            .copied()
            .ok_or_else(|| Error::Config {
                message: format!("Price row references unknown {what} '{n}' in {family}"),
            })
    })
    .transpose()
}

/// Seeds the catalog from configuration when the store has none yet.
///
/// Returns the number of rows inserted; zero when the store was already populated.
///
/// # Errors
/// Returns an error if a seed entry is invalid, a price row references an unknown model
/// or finish, or an insert fails.
pub async fn seed_catalog(db: &DatabaseConnection, seed: &CatalogSeed) -> Result<usize> {
    if has_catalog(db).await? {
        info!("Catalog already present, skipping seed");
        return Ok(0);
    }

    let mut inserted = 0;
    let mut model_ids = HashMap::new();
    let mut finish_ids = HashMap::new();

    for (order, m) in (0..).zip(&seed.models) {
        let model = create_model(db, m.family, &m.name, order).await?;
        model_ids.insert((m.family, model.name.to_lowercase()), model.id);
        inserted += 1;
    }

    for (order, f) in (0..).zip(&seed.finishes) {
        let finish = create_finish(db, f.family, &f.name, f.increment, &f.swatch, order).await?;
        finish_ids.insert((f.family, finish.name.to_lowercase()), finish.id);
        inserted += 1;
    }

    for (order, a) in (0..).zip(&seed.accessories) {
        create_accessory(db, a.family, &a.name, a.unit_price, &a.unit_label, order).await?;
        inserted += 1;
    }

    for (order, d) in (0..).zip(&seed.dimensions) {
        create_dimension(db, d.family, Dimensions::new(d.first_mm, d.second_mm)?, order).await?;
        inserted += 1;
    }

    for p in &seed.prices {
        let model_id = lookup_seeded(&model_ids, p.family, p.model.as_ref(), "model")?;
        let finish_id = lookup_seeded(&finish_ids, p.family, p.finish.as_ref(), "finish")?;
        let dimensions = match (p.first_mm, p.second_mm) {
            (Some(first), Some(second)) => Some(Dimensions::new(first, second)?),
            _ => None,
        };
        create_price_row(db, p.family, model_id, finish_id, dimensions, p.unit_price).await?;
        inserted += 1;
    }

    info!("Seeded {} catalog rows", inserted);
    Ok(inserted)
}
