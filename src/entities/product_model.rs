//! Product model entity - A named variant within a family that requires model selection
//! (compact boxes, panels, solar protection).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product model database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_models")]
pub struct Model {
    /// Unique identifier for the model
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Product family tag
    pub family: String,
    /// Display name (e.g., "Compacto 180")
    pub name: String,
    /// Inactive models are hidden from the catalog but may be referenced by old quotes
    pub active: bool,
    /// Display order within the family
    pub sort_order: i32,
}

/// Product models have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
