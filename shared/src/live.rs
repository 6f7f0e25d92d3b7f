//! Live event catalog
//!
//! Wire protocol for the real-time channel. The server pushes [`LiveEvent`]
//! frames (`{"event": ..., "payload": ...}`); clients send [`ClientCommand`]
//! control frames to scope which broadcasts they receive.
//!
//! Delivery is best-effort, at-most-once, no persistence or replay — a
//! disconnected client misses events until it reconnects and re-fetches
//! current state over the request/response API.

use serde::{Deserialize, Serialize};

use crate::models::{Notification, Order, Product};

/// Threshold-crossing alert kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StockAlertType {
    OutOfStock,
    LowStock,
}

/// Server → client event frames
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum LiveEvent {
    /// A new order was committed (fired post-commit only)
    OrderCreated(Order),
    /// New catalog entry
    ProductCreated { product: Product },
    /// Catalog entry changed; `prev_stock` lets subscribers detect
    /// threshold crossings client-side
    #[serde(rename_all = "camelCase")]
    ProductUpdated { product: Product, prev_stock: i32 },
    /// Catalog entry removed
    #[serde(rename_all = "camelCase")]
    ProductDeleted { product_id: i64 },
    /// Stock crossed into the danger zone
    StockAlert {
        #[serde(rename = "type")]
        alert_type: StockAlertType,
        product: Product,
    },
    /// Generic notification envelope
    NewNotification { notification: Notification },
    /// Bulk-operation completion signal
    TestDataLoaded { count: usize },
    /// Bulk-operation completion signal
    ProductsImported { count: usize },
}

impl LiveEvent {
    /// Wire name of this event (for logging)
    pub fn name(&self) -> &'static str {
        match self {
            Self::OrderCreated(_) => "order-created",
            Self::ProductCreated { .. } => "product-created",
            Self::ProductUpdated { .. } => "product-updated",
            Self::ProductDeleted { .. } => "product-deleted",
            Self::StockAlert { .. } => "stock-alert",
            Self::NewNotification { .. } => "new-notification",
            Self::TestDataLoaded { .. } => "test-data-loaded",
            Self::ProductsImported { .. } => "products-imported",
        }
    }
}

/// Client → server control frames
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientCommand {
    /// Join a named room; the session switches to narrow mode and only
    /// receives room-scoped events for its rooms (plus global events)
    JoinRoom { room: String },
    /// Leave a named room
    LeaveRoom { room: String },
    /// Replace the joined-room set wholesale; empty means "listen globally"
    Subscribe { rooms: Vec<String> },
}

/// Room name for a per-product channel
pub fn product_room(product_id: i64) -> String {
    format!("product:{product_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_match_wire_tags() {
        let ev = LiveEvent::ProductDeleted { product_id: 42 };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["event"], "product-deleted");
        assert_eq!(json["payload"]["productId"], 42);
        assert_eq!(ev.name(), "product-deleted");
    }

    #[test]
    fn stock_alert_payload_shape() {
        let product = crate::models::Product {
            id: 1,
            name: "Widget".into(),
            branch: "B1".into(),
            price: 5.0,
            stock: 0,
            min_stock: 2,
            status: crate::models::StockStatus::OutOfStock,
            created_at: 0,
            updated_at: 0,
        };
        let ev = LiveEvent::StockAlert {
            alert_type: StockAlertType::OutOfStock,
            product,
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["event"], "stock-alert");
        assert_eq!(json["payload"]["type"], "out-of-stock");
        assert_eq!(json["payload"]["product"]["status"], "Out of Stock");
    }

    #[test]
    fn client_commands_parse() {
        let cmd: ClientCommand =
            serde_json::from_str(r#"{"type":"join-room","room":"product:7"}"#).unwrap();
        assert_eq!(cmd, ClientCommand::JoinRoom { room: "product:7".into() });

        let cmd: ClientCommand =
            serde_json::from_str(r#"{"type":"subscribe","rooms":[]}"#).unwrap();
        assert_eq!(cmd, ClientCommand::Subscribe { rooms: vec![] });
    }

    #[test]
    fn product_room_naming() {
        assert_eq!(product_room(99), "product:99");
    }
}
