//! Dimension entity - A sellable size combination for families priced from a size catalog.
//!
//! The meaning of the pair depends on the family: (width, height) for sectional doors,
//! (height, width) for mosquito screens, (width, depth) for pergolas.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Dimension database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dimensions")]
pub struct Model {
    /// Unique identifier for the dimension entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Product family tag (e.g., `"sectional_door"`)
    pub family: String,
    /// First measure of the pair, in millimetres
    pub first_mm: i32,
    /// Second measure of the pair, in millimetres
    pub second_mm: i32,
    /// Display order within the family
    pub sort_order: i32,
}

/// Dimension entries have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
