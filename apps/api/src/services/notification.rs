//! # Notifications
//!
//! Typed publish/subscribe between the business workflows and whoever is
//! listening (today: WebSocket clients).
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SaleService ──notify(Role(StoreManager), NewSale)──┐                   │
//! │  StockService ─notify(Role(Warehouse), CriticalStock)┤                  │
//! │  TicketService ─notify(User(id), TicketAssigned)─────┤                  │
//! │                                                      ▼                  │
//! │                                        NotificationHub (broadcast)      │
//! │                                          │         │         │          │
//! │                                        /ws       /ws       /ws          │
//! │                                   role=cashier  user_id=… role=warehouse│
//! │                                   (each socket keeps only its topics)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Publishing never blocks and never fails the caller: a send with no
//! subscribers is dropped, a slow subscriber lags and skips events.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use teknoroma_core::{Role, StockStatus, TicketPriority};
use teknoroma_db::StockChange;

// =============================================================================
// Topics & Events
// =============================================================================

/// Who a notification is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Role(Role),
    User(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    NewSale {
        sale_id: String,
        sale_number: String,
        store_id: String,
        employee_id: String,
        total_cents: i64,
    },
    MobileSale {
        sale_id: String,
        sale_number: String,
        employee_id: String,
        total_cents: i64,
    },
    PaymentConfirmed {
        sale_id: String,
        sale_number: String,
    },
    CriticalStock {
        product_id: String,
        product_name: String,
        units_in_stock: i64,
        critical_stock_level: i64,
        stock_status: StockStatus,
    },
    NewTicket {
        ticket_id: String,
        ticket_number: String,
        title: String,
        priority: TicketPriority,
    },
    TicketAssigned {
        ticket_id: String,
        ticket_number: String,
        title: String,
    },
    TicketResolved {
        ticket_id: String,
        ticket_number: String,
        resolution: String,
    },
}

impl Event {
    pub fn critical_stock(change: &StockChange) -> Self {
        Event::CriticalStock {
            product_id: change.product_id.clone(),
            product_name: change.product_name.clone(),
            units_in_stock: change.units_in_stock,
            critical_stock_level: change.critical_stock_level,
            stock_status: change.stock_status,
        }
    }
}

/// One published event with its address.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub topic: Topic,
    pub event: Event,
    pub published_at: DateTime<Utc>,
}

impl Notification {
    /// Whether a subscriber that joined `role` and/or `user_id` receives this.
    pub fn is_for(&self, role: Option<Role>, user_id: Option<&str>) -> bool {
        match &self.topic {
            Topic::Role(r) => role == Some(*r),
            Topic::User(id) => user_id == Some(id.as_str()),
        }
    }
}

// =============================================================================
// Notifier
// =============================================================================

/// Fire-and-forget publisher used by the services.
pub trait Notifier: Send + Sync {
    fn notify(&self, topic: Topic, event: Event);
}

/// Sends `CriticalStock` to warehouse staff and store managers for every
/// change that moved a product into a worse stock band.
pub fn publish_stock_alerts<'a>(notifier: &dyn Notifier, changes: impl IntoIterator<Item = &'a StockChange>) {
    for change in changes.into_iter().filter(|c| c.needs_alert()) {
        for role in [Role::Warehouse, Role::StoreManager] {
            notifier.notify(Topic::Role(role), Event::critical_stock(change));
        }
    }
}

// =============================================================================
// Broadcast Hub
// =============================================================================

/// In-process notifier backed by a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct NotificationHub {
    tx: broadcast::Sender<Notification>,
}

impl NotificationHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        NotificationHub { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Notifier for NotificationHub {
    fn notify(&self, topic: Topic, event: Event) {
        let notification = Notification {
            topic,
            event,
            published_at: Utc::now(),
        };
        // Err only means nobody is listening
        match self.tx.send(notification) {
            Ok(receivers) => debug!(receivers = receivers, "Notification published"),
            Err(_) => debug!("Notification dropped, no subscribers"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(previous: StockStatus, now: StockStatus) -> StockChange {
        StockChange {
            product_id: "p-1".into(),
            product_name: "Laptop".into(),
            previous_units: 5,
            units_in_stock: 1,
            critical_stock_level: 2,
            previous_status: previous,
            stock_status: now,
            version: 2,
        }
    }

    #[tokio::test]
    async fn test_publish_and_receive() {
        let hub = NotificationHub::new(16);
        let mut rx = hub.subscribe();

        hub.notify(
            Topic::User("e-1".into()),
            Event::PaymentConfirmed {
                sale_id: "s-1".into(),
                sale_number: "S-2024-00001".into(),
            },
        );

        let received = rx.recv().await.unwrap();
        assert!(received.is_for(None, Some("e-1")));
        assert!(!received.is_for(Some(Role::Cashier), Some("e-2")));
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let hub = NotificationHub::new(4);
        hub.notify(
            Topic::Role(Role::Cashier),
            Event::PaymentConfirmed {
                sale_id: "s".into(),
                sale_number: "n".into(),
            },
        );
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_stock_alerts_only_for_worse_bands() {
        let hub = NotificationHub::new(16);
        let mut rx = hub.subscribe();

        let changes = [
            change(StockStatus::Sufficient, StockStatus::Critical),
            change(StockStatus::Critical, StockStatus::Sufficient),
        ];
        publish_stock_alerts(&hub, changes.iter());

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert!(first.is_for(Some(Role::Warehouse), None));
        assert!(second.is_for(Some(Role::StoreManager), None));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_value(Event::critical_stock(&change(
            StockStatus::Critical,
            StockStatus::OutOfStock,
        )))
        .unwrap();
        assert_eq!(json["type"], "critical_stock");
        assert_eq!(json["stock_status"], "out_of_stock");
    }
}
