//! Payment confirmation and order fulfillment state.
//!
//! The payment provider reports a captured payment through [`confirm_payment`], which
//! locks the quote and opens a pending order in one database transaction. Fulfillment
//! then moves the order through [`OrderStatus`] values.

use crate::{
    core::events::{DomainEvent, EventBus},
    entities::{Order, Quote, order, quote},
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Fulfillment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Paid, not yet started
    Pending,
    /// Being manufactured
    InProduction,
    /// Ready for delivery or pickup
    Ready,
    /// Handed over to the client
    Delivered,
    /// Cancelled after payment
    Cancelled,
}

impl OrderStatus {
    /// Stable tag stored in the `status` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProduction => "in_production",
            Self::Ready => "ready",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "in_production" => Ok(Self::InProduction),
            "ready" => Ok(Self::Ready),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(Error::Config {
                message: format!("Unknown order status: {other}"),
            }),
        }
    }
}

/// Retrieves the order opened for a quote, if any.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_order_for_quote<C>(db: &C, quote_id: i64) -> Result<Option<order::Model>>
where
    C: ConnectionTrait,
{
    Order::find()
        .filter(order::Column::QuoteId.eq(quote_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Marks a quote paid and opens its order.
///
/// Confirming an already-paid quote returns the existing order instead of opening a
/// second one, so provider retries are harmless.
///
/// # Errors
/// Returns `Error::QuoteNotFound` if the quote does not exist, or a database error if
/// the transaction fails.
pub async fn confirm_payment(
    db: &DatabaseConnection,
    quote_id: i64,
    events: &EventBus,
) -> Result<order::Model> {
    let txn = db.begin().await?;

    let quote = Quote::find_by_id(quote_id)
        .one(&txn)
        .await?
        .ok_or(Error::QuoteNotFound { id: quote_id })?;

    if quote.paid {
        if let Some(existing) = get_order_for_quote(&txn, quote_id).await? {
            txn.commit().await?;
            info!(quote_id, order_id = existing.id, "Payment already confirmed");
            return Ok(existing);
        }
    } else {
        let mut paid: quote::ActiveModel = quote.into();
        paid.paid = Set(true);
        paid.updated_at = Set(chrono::Utc::now());
        paid.update(&txn).await?;
    }

    let now = chrono::Utc::now();
    let order = order::ActiveModel {
        quote_id: Set(quote_id),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(quote_id, order_id = order.id, "Payment confirmed, order opened");
    events.publish(DomainEvent::QuotePaid {
        quote_id,
        order_id: order.id,
    });
    Ok(order)
}

/// Moves the order of a quote to a new fulfillment state.
///
/// # Errors
/// Returns `Error::OrderNotFound` if the quote has no order, or a database error if the
/// update fails.
pub async fn update_order_status(
    db: &DatabaseConnection,
    quote_id: i64,
    status: OrderStatus,
    events: &EventBus,
) -> Result<order::Model> {
    let existing = get_order_for_quote(db, quote_id)
        .await?
        .ok_or(Error::OrderNotFound { quote_id })?;

    let mut order: order::ActiveModel = existing.into();
    order.status = Set(status.as_str().to_string());
    order.updated_at = Set(chrono::Utc::now());
    let updated = order.update(db).await?;

    info!(quote_id, order_id = updated.id, %status, "Order status changed");
    events.publish(DomainEvent::OrderStateChanged {
        quote_id,
        order_id: updated.id,
        status,
    });
    Ok(updated)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::family::ProductFamily;
    use crate::core::quote::{delete_quote, get_quote, save_quote};
    use crate::test_utils::*;

    #[test]
    fn test_status_parse() {
        assert_eq!(
            "in_production".parse::<OrderStatus>().unwrap(),
            OrderStatus::InProduction
        );
        assert_eq!(OrderStatus::Delivered.to_string(), "delivered");
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[tokio::test]
    async fn test_confirm_payment_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let events = EventBus::default();
        let mut rx = events.subscribe();
        let id = save_quote(&db, &test_draft(ProductFamily::Pergola), &events).await?;
        let _created = rx.recv().await.unwrap();

        let order = confirm_payment(&db, id, &events).await?;
        assert_eq!(order.quote_id, id);
        assert_eq!(order.status, "pending");

        let quote = get_quote(&db, id).await?.unwrap();
        assert!(quote.paid);

        assert_eq!(
            rx.recv().await.unwrap(),
            DomainEvent::QuotePaid {
                quote_id: id,
                order_id: order.id
            }
        );

        // Paid quotes can no longer be deleted by the client
        let result = delete_quote(&db, id, "client-1", &events).await;
        assert!(matches!(result, Err(Error::QuoteLocked { id: _ })));

        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_payment_twice_keeps_one_order() -> Result<()> {
        let db = setup_test_db().await?;
        let events = EventBus::default();
        let id = save_quote(&db, &test_draft(ProductFamily::Pergola), &events).await?;

        let first = confirm_payment(&db, id, &events).await?;
        let second = confirm_payment(&db, id, &events).await?;

        assert_eq!(first.id, second.id);
        assert_eq!(Order::find().all(&db).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_payment_unknown_quote() -> Result<()> {
        let db = setup_test_db().await?;
        let result = confirm_payment(&db, 42, &EventBus::default()).await;
        assert!(matches!(result, Err(Error::QuoteNotFound { id: 42 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_order_status_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let events = EventBus::default();
        let id = save_quote(&db, &test_draft(ProductFamily::SectionalDoor), &events).await?;
        confirm_payment(&db, id, &events).await?;

        let mut rx = events.subscribe();
        let updated = update_order_status(&db, id, OrderStatus::InProduction, &events).await?;
        assert_eq!(updated.status, "in_production");
        assert!(matches!(
            rx.recv().await.unwrap(),
            DomainEvent::OrderStateChanged {
                status: OrderStatus::InProduction,
                ..
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_status_without_order() -> Result<()> {
        let db = setup_test_db().await?;
        let events = EventBus::default();
        let id = save_quote(&db, &test_draft(ProductFamily::Panel), &events).await?;

        let result = update_order_status(&db, id, OrderStatus::Ready, &events).await;
        assert!(matches!(result, Err(Error::OrderNotFound { quote_id: _ })));

        Ok(())
    }
}
