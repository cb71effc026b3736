//! Client account entity - The administration record holding a client's discount.
//!
//! Clients may be referenced either by `id` or by `auth_user_id` (identifier migration),
//! and the discount may live in either of two legacy columns.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Client account database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "client_accounts")]
pub struct Model {
    /// Primary identifier of the client
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Identifier issued by the authentication provider
    pub auth_user_id: Option<String>,
    /// Discount percentage (0-100)
    pub discount_pct: Option<f64>,
    /// Discount percentage as stored by the previous admin screens
    pub legacy_discount: Option<f64>,
    /// When the record was last modified
    pub updated_at: DateTime,
}

/// Client accounts have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
