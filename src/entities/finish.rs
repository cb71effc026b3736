//! Finish entity - A named finish or color option with its price increment.
//!
//! The unit of `increment` (flat, per linear metre, per square metre) is decided by
//! the family's pricing strategy, not stored per row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Finish database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "finishes")]
pub struct Model {
    /// Unique identifier for the finish
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Product family tag
    pub family: String,
    /// Display name (e.g., "Blanco", "RAL 7016")
    pub name: String,
    /// Price increment, interpreted per the family's increment basis
    pub increment: f64,
    /// Swatch color used by the configurator (e.g., `"#FFFFFF"`)
    pub swatch: String,
    /// Inactive finishes are hidden from the catalog
    pub active: bool,
    /// Display order within the family
    pub sort_order: i32,
}

/// Finishes have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
