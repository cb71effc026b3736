//! Quote persister - Stores configured products and their price breakdown as quotes.
//!
//! A quote snapshots what was sold: model and finish by name, accessories with the unit
//! price at the time of saving. Quotes stay editable by their owner until paid; paid
//! quotes reject both update and delete. There is no optimistic locking, the last
//! write wins, and store failures are reported once without retrying.

use crate::{
    core::{
        events::{DomainEvent, EventBus},
        family::{Dimensions, ProductFamily},
        pricing::{AccessoryLine, PriceBreakdown, money_from_f64, money_to_f64},
    },
    entities::{Quote, quote},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// One accessory as stored in a quote's JSON snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessorySnapshot {
    /// Catalog identifier at the time of saving
    pub id: i64,
    /// Accessory name at the time of saving
    pub name: String,
    /// Unit price at the time of saving
    pub unit_price: f64,
    /// Quantity sold
    pub quantity: u32,
}

impl From<&AccessoryLine> for AccessorySnapshot {
    fn from(line: &AccessoryLine) -> Self {
        Self {
            id: line.id,
            name: line.name.clone(),
            unit_price: money_to_f64(line.unit_price),
            quantity: line.quantity,
        }
    }
}

/// Everything needed to save a quote.
#[derive(Debug, Clone)]
pub struct QuoteDraft {
    /// Owning client
    pub client_id: String,
    /// Family being quoted
    pub family: ProductFamily,
    /// Selected dimensions, if any
    pub dimensions: Option<Dimensions>,
    /// Selected model name
    pub model_name: Option<String>,
    /// Selected finish/color name
    pub color: Option<String>,
    /// Selected accessories; zero-quantity lines are not stored
    pub accessories: Vec<AccessoryLine>,
    /// Computed prices
    pub breakdown: PriceBreakdown,
}

impl QuoteDraft {
    fn snapshot(&self) -> Result<Json> {
        let lines: Vec<AccessorySnapshot> = self
            .accessories
            .iter()
            .filter(|line| line.quantity > 0)
            .map(AccessorySnapshot::from)
            .collect();
        serde_json::to_value(lines).map_err(Into::into)
    }

    fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(Error::MissingSelection { field: "client_id" });
        }
        Ok(())
    }
}

fn persistence_failed(e: DbErr) -> Error {
    Error::PersistenceFailed {
        message: e.to_string(),
    }
}

/// Reads the accessory snapshot of a stored quote.
///
/// # Errors
/// Returns `Error::Serialization` if the stored JSON is not a list of accessory lines.
pub fn accessory_snapshot(quote: &quote::Model) -> Result<Vec<AccessorySnapshot>> {
    serde_json::from_value(quote.accessories.clone()).map_err(Into::into)
}

/// Reads the stored price breakdown of a quote.
///
/// # Errors
/// Returns `Error::InvalidAmount` if a stored amount is not a finite number.
pub fn stored_breakdown(quote: &quote::Model) -> Result<PriceBreakdown> {
    Ok(PriceBreakdown {
        base: money_from_f64(quote.base_price)?,
        color_increment: money_from_f64(quote.color_increment)?,
        accessory_total: money_from_f64(quote.accessory_total)?,
        subtotal: money_from_f64(quote.subtotal)?,
        discount_pct: money_from_f64(quote.discount_pct)?,
        discount_amount: money_from_f64(quote.discount_amount)?,
        total: money_from_f64(quote.total)?,
    })
}

/// Saves a new, unpaid quote and returns its id.
///
/// # Errors
/// Returns `Error::MissingSelection` without a client, or `Error::PersistenceFailed`
/// with the store's message if the insert fails.
pub async fn save_quote(
    db: &DatabaseConnection,
    draft: &QuoteDraft,
    events: &EventBus,
) -> Result<i64> {
    draft.validate()?;

    let now = chrono::Utc::now();
    let b = &draft.breakdown;
    let quote = quote::ActiveModel {
        client_id: Set(draft.client_id.clone()),
        family: Set(draft.family.as_str().to_string()),
        first_mm: Set(draft.dimensions.map(|d| d.first_mm)),
        second_mm: Set(draft.dimensions.map(|d| d.second_mm)),
        model_name: Set(draft.model_name.clone()),
        color: Set(draft.color.clone()),
        accessories: Set(draft.snapshot()?),
        base_price: Set(money_to_f64(b.base)),
        color_increment: Set(money_to_f64(b.color_increment)),
        accessory_total: Set(money_to_f64(b.accessory_total)),
        subtotal: Set(money_to_f64(b.subtotal)),
        discount_pct: Set(money_to_f64(b.discount_pct)),
        discount_amount: Set(money_to_f64(b.discount_amount)),
        total: Set(money_to_f64(b.total)),
        paid: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let saved = quote
        .insert(db)
        .await
        .inspect_err(|e| warn!(client_id = %draft.client_id, error = %e, "Quote insert failed"))
        .map_err(persistence_failed)?;

    info!(quote_id = saved.id, family = %draft.family, total = %b.total, "Quote created");
    events.publish(DomainEvent::QuoteCreated {
        quote_id: saved.id,
        client_id: saved.client_id.clone(),
        family: draft.family,
        total: b.total,
    });
    Ok(saved.id)
}

/// Loads a quote owned by `client_id` that may still be modified.
async fn find_editable(
    db: &DatabaseConnection,
    quote_id: i64,
    client_id: &str,
) -> Result<quote::Model> {
    let quote = Quote::find_by_id(quote_id)
        .one(db)
        .await
        .map_err(persistence_failed)?
        .filter(|q| q.client_id == client_id)
        .ok_or(Error::QuoteNotFound { id: quote_id })?;

    if quote.paid {
        return Err(Error::QuoteLocked { id: quote_id });
    }
    Ok(quote)
}

/// Overwrites an unpaid quote with a new configuration and breakdown.
///
/// # Errors
/// Returns `Error::QuoteNotFound` if the quote does not exist or belongs to another
/// client, `Error::QuoteLocked` if it has been paid, or `Error::PersistenceFailed` if
/// the update fails.
pub async fn update_quote(
    db: &DatabaseConnection,
    quote_id: i64,
    draft: &QuoteDraft,
    events: &EventBus,
) -> Result<()> {
    draft.validate()?;
    let existing = find_editable(db, quote_id, &draft.client_id).await?;

    let b = &draft.breakdown;
    let mut quote: quote::ActiveModel = existing.into();
    quote.family = Set(draft.family.as_str().to_string());
    quote.first_mm = Set(draft.dimensions.map(|d| d.first_mm));
    quote.second_mm = Set(draft.dimensions.map(|d| d.second_mm));
    quote.model_name = Set(draft.model_name.clone());
    quote.color = Set(draft.color.clone());
    quote.accessories = Set(draft.snapshot()?);
    quote.base_price = Set(money_to_f64(b.base));
    quote.color_increment = Set(money_to_f64(b.color_increment));
    quote.accessory_total = Set(money_to_f64(b.accessory_total));
    quote.subtotal = Set(money_to_f64(b.subtotal));
    quote.discount_pct = Set(money_to_f64(b.discount_pct));
    quote.discount_amount = Set(money_to_f64(b.discount_amount));
    quote.total = Set(money_to_f64(b.total));
    quote.updated_at = Set(chrono::Utc::now());

    quote.update(db).await.map_err(persistence_failed)?;

    info!(quote_id, total = %b.total, "Quote updated");
    events.publish(DomainEvent::QuoteUpdated {
        quote_id,
        total: b.total,
    });
    Ok(())
}

/// Deletes an unpaid quote.
///
/// # Errors
/// Returns `Error::QuoteNotFound`, `Error::QuoteLocked`, or `Error::PersistenceFailed`.
pub async fn delete_quote(
    db: &DatabaseConnection,
    quote_id: i64,
    client_id: &str,
    events: &EventBus,
) -> Result<()> {
    let quote = find_editable(db, quote_id, client_id).await?;
    quote.delete(db).await.map_err(persistence_failed)?;

    info!(quote_id, "Quote deleted");
    events.publish(DomainEvent::QuoteDeleted { quote_id });
    Ok(())
}

/// Retrieves a quote by id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_quote(db: &DatabaseConnection, quote_id: i64) -> Result<Option<quote::Model>> {
    Quote::find_by_id(quote_id).one(db).await.map_err(Into::into)
}

/// Lists a client's quotes, newest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_quotes_for_client(
    db: &DatabaseConnection,
    client_id: &str,
) -> Result<Vec<quote::Model>> {
    Quote::find()
        .filter(quote::Column::ClientId.eq(client_id))
        .order_by_desc(quote::Column::CreatedAt)
        .order_by_desc(quote::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
