//! Storage seam for the order ledger.
//!
//! # Contract
//!
//! Implementations provide the atomicity this engine is built on:
//!
//! - [`OrderStore::insert_order`] persists the order row, all item
//!   snapshots, and the initial tracking entry in ONE transaction.  Partial
//!   orders must be impossible — any failure rolls everything back.
//! - [`OrderStore::apply_transition`] re-reads the current status inside
//!   its own transaction (row lock or single critical section) and refuses
//!   with a state error when it no longer equals `expect_from`; the status
//!   write and its tracking append commit together.  This is what makes
//!   concurrent transitions safe: first commit wins, the loser is told.
//! - Tracking rows are append-only.  This trait deliberately has no update
//!   or delete for them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use tfn_pricing::PricedLine;
use tfn_schemas::{Cents, ChosenOption, GeoPoint, OrderDetail, OrderStatus, TrackingUpdate};

use crate::error::OrderError;

// ---------------------------------------------------------------------------
// Write payloads
// ---------------------------------------------------------------------------

/// One item snapshot to persist, already priced.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub menu_item_id: Uuid,
    pub name: String,
    pub unit_price: Cents,
    pub quantity: i32,
    pub customizations: Vec<ChosenOption>,
    pub special_instructions: Option<String>,
}

impl From<PricedLine> for NewOrderItem {
    fn from(line: PricedLine) -> Self {
        NewOrderItem {
            menu_item_id: line.menu_item_id,
            name: line.name,
            unit_price: line.unit_price,
            quantity: line.quantity,
            customizations: line.customizations,
            special_instructions: line.special_instructions,
        }
    }
}

/// A fully validated, fully priced order ready to persist.
///
/// Ids and timestamps are assigned by the store so both backends stamp rows
/// the same way.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: Uuid,
    pub restaurant_id: Uuid,
    pub delivery_address_id: Uuid,
    pub payment_method: String,
    pub payment_details: serde_json::Value,
    pub special_instructions: Option<String>,
    pub subtotal: Cents,
    pub delivery_fee: Cents,
    pub tax: Cents,
    pub tip: Cents,
    pub items: Vec<NewOrderItem>,
    /// Message for the initial pending tracking entry.
    pub initial_message: String,
}

/// A validated transition to apply.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub to: OrderStatus,
    /// Tracking message (caller-supplied or the status default).
    pub message: String,
    pub location: Option<GeoPoint>,
    /// When present, stored onto the order row.
    pub estimated_delivery_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Read options
// ---------------------------------------------------------------------------

/// Tracking read direction.  Sorting happens at query time on `created_at`;
/// physical row order is never the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingOrder {
    /// Machine consumption: history replay, state audits.
    OldestFirst,
    /// Human consumption: "where is my food" screens.
    NewestFirst,
}

// ---------------------------------------------------------------------------
// OrderStore
// ---------------------------------------------------------------------------

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Atomically create the order, its item snapshots, and the initial
    /// pending tracking entry.  Returns the hydrated result.
    async fn insert_order(&self, order: NewOrder) -> Result<OrderDetail, OrderError>;

    /// Atomically apply `change` if the order's current status still equals
    /// `expect_from`; otherwise fail with a state error and write nothing.
    async fn apply_transition(
        &self,
        order_id: Uuid,
        expect_from: OrderStatus,
        change: StatusChange,
    ) -> Result<OrderDetail, OrderError>;

    /// Hydrated read: order row, item snapshots, tracking oldest-first.
    async fn order_detail(&self, order_id: Uuid) -> Result<Option<OrderDetail>, OrderError>;

    /// Tracking entries for an order in the requested direction.  Empty for
    /// unknown orders; existence checks belong to the caller.
    async fn tracking(
        &self,
        order_id: Uuid,
        order: TrackingOrder,
    ) -> Result<Vec<TrackingUpdate>, OrderError>;
}
