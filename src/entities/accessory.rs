//! Accessory entity - An optional add-on sold per unit.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Accessory database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accessories")]
pub struct Model {
    /// Unique identifier for the accessory
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Product family tag
    pub family: String,
    /// Display name (e.g., "Motor")
    pub name: String,
    /// Price per unit
    pub unit_price: f64,
    /// Unit-of-measure label (e.g., "ud", "ml")
    pub unit_label: String,
    /// Inactive accessories are hidden from the catalog
    pub active: bool,
    /// Display order within the family
    pub sort_order: i32,
}

/// Accessories have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
