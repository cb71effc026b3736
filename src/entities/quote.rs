//! Quote entity - The persisted, editable-until-paid record of a configured product.
//!
//! Model and finish are stored by name, and accessories as an embedded JSON snapshot,
//! so a quote keeps reflecting what was sold even after the catalog changes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Quote database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quotes")]
pub struct Model {
    /// Unique identifier for the quote
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning client identifier
    pub client_id: String,
    /// Product family tag
    pub family: String,
    /// First dimension in millimetres, if the family uses dimensions
    pub first_mm: Option<i32>,
    /// Second dimension in millimetres, if the family uses dimensions
    pub second_mm: Option<i32>,
    /// Model name at the time of saving
    pub model_name: Option<String>,
    /// Finish/color name at the time of saving
    pub color: Option<String>,
    /// Accessory snapshot: `[{id, name, unit_price, quantity}]`
    pub accessories: Json,
    /// Base price
    pub base_price: f64,
    /// Finish/color increment
    pub color_increment: f64,
    /// Sum of accessory lines
    pub accessory_total: f64,
    /// `base_price + color_increment + accessory_total`
    pub subtotal: f64,
    /// Client discount percentage applied
    pub discount_pct: f64,
    /// Discount amount deducted from the subtotal
    pub discount_amount: f64,
    /// Final amount
    pub total: f64,
    /// Once true the quote is immutable to the client
    pub paid: bool,
    /// When the quote was created
    pub created_at: DateTimeUtc,
    /// When the quote was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Quote and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A paid quote has one fulfillment order
    #[sea_orm(has_one = "super::order::Entity")]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
