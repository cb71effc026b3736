//! Shared test utilities for the quoting core.
//!
//! This module provides common helper functions for setting up test databases
//! and creating catalog, client and quote records with sensible defaults.

use crate::{
    core::{
        catalog,
        family::{Dimensions, ProductFamily},
        pricing::{AccessoryLine, PriceBreakdown},
        quote::QuoteDraft,
    },
    entities::{self, Quote, client_account, quote},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, Set, prelude::*};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates an active product model at sort position 0.
pub async fn create_test_model(
    db: &DatabaseConnection,
    family: ProductFamily,
    name: &str,
) -> Result<entities::product_model::Model> {
    catalog::create_model(db, family, name, 0).await
}

/// Creates an active finish.
///
/// # Defaults
/// * `swatch`: `"#FFFFFF"`
/// * `sort_order`: 0
pub async fn create_test_finish(
    db: &DatabaseConnection,
    family: ProductFamily,
    name: &str,
    increment: f64,
) -> Result<entities::finish::Model> {
    catalog::create_finish(db, family, name, increment, "#FFFFFF", 0).await
}

/// Creates an active accessory sold per unit (`"ud"`).
pub async fn create_test_accessory(
    db: &DatabaseConnection,
    family: ProductFamily,
    name: &str,
    unit_price: f64,
) -> Result<entities::accessory::Model> {
    catalog::create_accessory(db, family, name, unit_price, "ud", 0).await
}

/// Creates a dimension table entry. All entries share sort position 0, so they list by
/// size.
pub async fn create_test_dimension(
    db: &DatabaseConnection,
    family: ProductFamily,
    first_mm: i32,
    second_mm: i32,
) -> Result<entities::dimension::Model> {
    catalog::create_dimension(db, family, Dimensions::new(first_mm, second_mm)?, 0).await
}

/// Creates a price row; `None` columns are wildcards.
pub async fn create_test_price_row(
    db: &DatabaseConnection,
    family: ProductFamily,
    model_id: Option<i64>,
    finish_id: Option<i64>,
    dimensions: Option<(i32, i32)>,
    unit_price: f64,
) -> Result<entities::price_row::Model> {
    let dimensions = dimensions
        .map(|(first, second)| Dimensions::new(first, second))
        .transpose()?;
    catalog::create_price_row(db, family, model_id, finish_id, dimensions, unit_price).await
}

/// Creates a client account with the given discount columns.
pub async fn create_test_client(
    db: &DatabaseConnection,
    id: &str,
    auth_user_id: Option<&str>,
    discount_pct: Option<f64>,
    legacy_discount: Option<f64>,
) -> Result<client_account::Model> {
    client_account::ActiveModel {
        id: Set(id.to_string()),
        auth_user_id: Set(auth_user_id.map(str::to_string)),
        discount_pct: Set(discount_pct),
        legacy_discount: Set(legacy_discount),
        updated_at: Set(chrono::Utc::now().naive_utc()),
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// A ready-to-save draft for `client-1`.
///
/// # Defaults
/// * `dimensions`: 2000 x 1000 mm
/// * `model_name`: `"Modelo 1"`, `color`: `"Blanco"`
/// * `accessories`: one `"Motor"` at 10.00
/// * `breakdown`: base 113.46, subtotal 123.46, 10% discount, total 111.11
pub fn test_draft(family: ProductFamily) -> QuoteDraft {
    QuoteDraft {
        client_id: "client-1".to_string(),
        family,
        dimensions: Some(Dimensions {
            first_mm: 2000,
            second_mm: 1000,
        }),
        model_name: Some("Modelo 1".to_string()),
        color: Some("Blanco".to_string()),
        accessories: vec![AccessoryLine::new(1, "Motor", Decimal::TEN, 1)],
        breakdown: PriceBreakdown {
            base: Decimal::new(11346, 2),
            color_increment: Decimal::ZERO,
            accessory_total: Decimal::new(1000, 2),
            subtotal: Decimal::new(12346, 2),
            discount_pct: Decimal::TEN,
            discount_amount: Decimal::new(1235, 2),
            total: Decimal::new(11111, 2),
        },
    }
}

/// Marks a quote paid without opening an order.
pub async fn mark_test_quote_paid(db: &DatabaseConnection, quote_id: i64) -> Result<()> {
    let mut paid: quote::ActiveModel = Quote::find_by_id(quote_id)
        .one(db)
        .await?
        .ok_or(Error::QuoteNotFound { id: quote_id })?
        .into();
    paid.paid = Set(true);
    paid.update(db).await?;
    Ok(())
}
