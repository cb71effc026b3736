//! Price row entity - Maps a family key to a unit price.
//!
//! Which key columns are populated depends on the family: dimension pairs for size
//! catalog families, a model for model-based families. A row without `finish_id`
//! applies to any finish. No matching row means the price is unresolved ("consult us").

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Price row database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "price_rows")]
pub struct Model {
    /// Unique identifier for the row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Product family tag
    pub family: String,
    /// Model this price applies to, for model-based families
    pub model_id: Option<i64>,
    /// Finish this price applies to; None applies to every finish
    pub finish_id: Option<i64>,
    /// First dimension in millimetres, for size catalog families
    pub first_mm: Option<i32>,
    /// Second dimension in millimetres, for size catalog families
    pub second_mm: Option<i32>,
    /// Unit price, interpreted per the family's base basis
    pub unit_price: f64,
}

/// Price rows have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
