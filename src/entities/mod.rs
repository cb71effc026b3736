//! Entity module - Contains all SeaORM entity definitions for the quoting store.
//! Catalog tables (dimensions, models, finishes, accessories, price rows) are shared
//! by every product family and discriminated by a `family` tag column.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod accessory;
pub mod client_account;
pub mod dimension;
pub mod finish;
pub mod order;
pub mod price_row;
pub mod product_model;
pub mod quote;

// Re-export specific types to avoid conflicts
pub use accessory::{Column as AccessoryColumn, Entity as Accessory, Model as AccessoryModel};
pub use client_account::{
    Column as ClientAccountColumn, Entity as ClientAccount, Model as ClientAccountModel,
};
pub use dimension::{Column as DimensionColumn, Entity as Dimension, Model as DimensionModel};
pub use finish::{Column as FinishColumn, Entity as Finish, Model as FinishModel};
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel};
pub use price_row::{Column as PriceRowColumn, Entity as PriceRow, Model as PriceRowModel};
pub use product_model::{
    Column as ProductModelColumn, Entity as ProductModel, Model as ProductModelModel,
};
pub use quote::{Column as QuoteColumn, Entity as Quote, Model as QuoteModel};
