//! Domain events published by the quoting core.
//!
//! Notifiers (email, back-office dashboards) subscribe to an [`EventBus`] and react to
//! quote and order changes. Publishing never fails: with no subscriber the event is
//! simply dropped.

use crate::core::{family::ProductFamily, order::OrderStatus};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

const DEFAULT_CAPACITY: usize = 64;

/// Something that happened to a quote or order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A quote was saved for the first time
    QuoteCreated {
        /// Id of the new quote
        quote_id: i64,
        /// Owner of the quote
        client_id: String,
        /// Family quoted
        family: ProductFamily,
        /// Saved total
        total: Decimal,
    },
    /// An unpaid quote was edited
    QuoteUpdated {
        /// Id of the edited quote
        quote_id: i64,
        /// Total after the edit
        total: Decimal,
    },
    /// An unpaid quote was deleted
    QuoteDeleted {
        /// Id of the deleted quote
        quote_id: i64,
    },
    /// Payment was confirmed and an order opened
    QuotePaid {
        /// Id of the paid quote
        quote_id: i64,
        /// Id of the order opened for it
        order_id: i64,
    },
    /// An order moved to a new fulfillment state
    OrderStateChanged {
        /// Quote the order belongs to
        quote_id: i64,
        /// Id of the order
        order_id: i64,
        /// New fulfillment state
        status: OrderStatus,
    },
}

/// Broadcast channel carrying [`DomainEvent`]s to any number of subscribers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventBus {
    /// Creates a bus buffering up to `capacity` events per lagging subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Registers a new subscriber; it only sees events published afterwards.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }

    /// Sends `event` to every current subscriber.
    pub fn publish(&self, event: DomainEvent) {
        trace!(?event, "Publishing domain event");
        // No subscribers is not an error
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_events() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(DomainEvent::QuoteDeleted { quote_id: 4 });

        assert_eq!(rx.recv().await.unwrap(), DomainEvent::QuoteDeleted { quote_id: 4 });
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new(0);
        bus.publish(DomainEvent::QuoteDeleted { quote_id: 1 });
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = DomainEvent::QuotePaid {
            quote_id: 3,
            order_id: 9,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "quote_paid");
        assert_eq!(json["order_id"], 9);
    }
}
