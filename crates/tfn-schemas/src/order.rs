//! The order aggregate.
//!
//! # Invariants
//!
//! - An order's monetary fields are derived server-side at creation and
//!   never change afterwards; only `status` (plus `updated_at` and the
//!   delivery timestamps) ever mutates.
//! - `status` always equals the status of the newest tracking entry: every
//!   status write and its tracking append share one storage transaction.
//! - Item rows are snapshots: name, unit price, and chosen options are
//!   frozen at creation so later menu edits cannot rewrite billing history.
//! - Tracking entries are append-only.  There is no update or delete path
//!   anywhere in the codebase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Cents;
use crate::status::OrderStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub restaurant_id: Uuid,
    pub status: OrderStatus,
    pub subtotal: Cents,
    pub delivery_fee: Cents,
    pub tax: Cents,
    pub tip: Cents,
    pub delivery_address_id: Uuid,
    /// Free-form method label ("card", "cash", ...).  Never interpreted.
    pub payment_method: String,
    /// Opaque payment payload.  Stored verbatim, never validated or charged.
    pub payment_details: serde_json::Value,
    pub special_instructions: Option<String>,
    pub estimated_delivery_at: Option<DateTime<Utc>>,
    pub actual_delivery_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Grand total: subtotal + delivery fee + tax + tip.
    pub fn total(&self) -> Cents {
        self.subtotal
            .saturating_add(self.delivery_fee)
            .saturating_add(self.tax)
            .saturating_add(self.tip)
    }
}

/// A customization selection resolved against the catalog at order time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChosenOption {
    pub option_id: Uuid,
    pub name: String,
    pub price_delta: Cents,
}

/// An order line, frozen at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub menu_item_id: Uuid,
    pub name: String,
    /// Base price plus chosen-option deltas, as priced at creation.
    pub unit_price: Cents,
    pub quantity: i32,
    pub customizations: Vec<ChosenOption>,
    pub special_instructions: Option<String>,
}

impl OrderItem {
    pub fn line_total(&self) -> Cents {
        self.unit_price
            .checked_mul_qty(i64::from(self.quantity))
            .unwrap_or(Cents::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// One append-only tracking entry.
///
/// Consumers order entries by `created_at` at query time; physical storage
/// order is not a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingUpdate {
    pub id: Uuid,
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub message: String,
    pub location: Option<GeoPoint>,
    pub created_at: DateTime<Utc>,
}

/// A fully hydrated order: the row, its item snapshots, and its tracking
/// history (oldest first).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub tracking: Vec<TrackingUpdate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_order() -> Order {
        Order {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            restaurant_id: Uuid::new_v4(),
            status: OrderStatus::Pending,
            subtotal: Cents::new(2_000),
            delivery_fee: Cents::new(299),
            tax: Cents::new(160),
            tip: Cents::new(300),
            delivery_address_id: Uuid::new_v4(),
            payment_method: "card".to_string(),
            payment_details: serde_json::json!({"last4": "4242"}),
            special_instructions: None,
            estimated_delivery_at: None,
            actual_delivery_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn total_sums_all_four_components() {
        let order = base_order();
        assert_eq!(order.total(), Cents::new(2_759));
    }

    #[test]
    fn line_total_multiplies_unit_price_by_quantity() {
        let item = OrderItem {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            menu_item_id: Uuid::new_v4(),
            name: "Paneer Tikka".to_string(),
            unit_price: Cents::new(1_250),
            quantity: 3,
            customizations: vec![],
            special_instructions: None,
        };
        assert_eq!(item.line_total(), Cents::new(3_750));
    }
}
