//! Request payloads accepted by the daemon and CLI.
//!
//! Note what is absent: cart lines carry no prices.  Every monetary value
//! on an order is derived server-side from the catalog, so a tampered
//! client simply has nothing to tamper with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Cents;
use crate::order::GeoPoint;
use crate::status::OrderStatus;

/// One cart line in a creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub menu_item_id: Uuid,
    pub quantity: i32,
    /// Ids of selected `MenuItemOption`s.  Resolved and priced server-side.
    #[serde(default)]
    pub customizations: Vec<Uuid>,
    #[serde(default)]
    pub special_instructions: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub restaurant_id: Uuid,
    pub items: Vec<CartLine>,
    pub delivery_address_id: Uuid,
    pub payment_method: String,
    /// Opaque; stored verbatim.
    #[serde(default)]
    pub payment_details: serde_json::Value,
    #[serde(default)]
    pub special_instructions: Option<String>,
    #[serde(default)]
    pub tip: Cents,
}

/// Request to move an order to a new status.
///
/// `message` overrides the default tracking message for the target status.
/// `location` and `estimated_delivery_at` are informational extras carried
/// onto the tracking entry / order row; they never gate the transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangeRequest {
    pub status: OrderStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub estimated_delivery_at: Option<DateTime<Utc>>,
}
