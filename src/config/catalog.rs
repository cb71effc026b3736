//! Catalog seed configuration from config.toml
//!
//! The `[catalog]` tables describe the models, finishes, accessories, dimensions and
//! price rows used to seed an empty store. Price rows reference models and finishes by
//! name; names are resolved to identifiers when seeding.

use crate::core::family::ProductFamily;
use serde::Deserialize;

/// All catalog seed tables
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogSeed {
    /// Product models
    pub models: Vec<ModelSeed>,
    /// Finishes and colors
    pub finishes: Vec<FinishSeed>,
    /// Accessories
    pub accessories: Vec<AccessorySeed>,
    /// Size catalog entries (dimension table families)
    pub dimensions: Vec<DimensionSeed>,
    /// Price rows
    pub prices: Vec<PriceSeed>,
}

impl CatalogSeed {
    /// True when no table has any entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
            && self.finishes.is_empty()
            && self.accessories.is_empty()
            && self.dimensions.is_empty()
            && self.prices.is_empty()
    }
}

/// A product model to seed
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSeed {
    /// Family the model belongs to
    pub family: ProductFamily,
    /// Display name
    pub name: String,
}

/// A finish to seed
#[derive(Debug, Clone, Deserialize)]
pub struct FinishSeed {
    /// Family the finish belongs to
    pub family: ProductFamily,
    /// Display name
    pub name: String,
    /// Price increment in the family's increment basis
    #[serde(default)]
    pub increment: f64,
    /// Swatch color
    #[serde(default = "default_swatch")]
    pub swatch: String,
}

/// An accessory to seed
#[derive(Debug, Clone, Deserialize)]
pub struct AccessorySeed {
    /// Family the accessory belongs to
    pub family: ProductFamily,
    /// Display name
    pub name: String,
    /// Price per unit
    pub unit_price: f64,
    /// Unit shown next to the quantity
    #[serde(default = "default_unit_label")]
    pub unit_label: String,
}

/// A size catalog entry to seed
#[derive(Debug, Clone, Deserialize)]
pub struct DimensionSeed {
    /// Family the size belongs to
    pub family: ProductFamily,
    /// First measure in millimetres
    pub first_mm: i32,
    /// Second measure in millimetres
    pub second_mm: i32,
}

/// A price row to seed; `model` and `finish` are names within the same family
#[derive(Debug, Clone, Deserialize)]
pub struct PriceSeed {
    /// Family the row prices
    pub family: ProductFamily,
    /// Model name, or any model when absent
    pub model: Option<String>,
    /// Finish name, or any finish when absent
    pub finish: Option<String>,
    /// First measure, or any when absent
    pub first_mm: Option<i32>,
    /// Second measure, or any when absent
    pub second_mm: Option<i32>,
    /// Price in the family's base basis
    pub unit_price: f64,
}

fn default_swatch() -> String {
    "#FFFFFF".to_string()
}

fn default_unit_label() -> String {
    "ud".to_string()
}
