//! Read-only records from the platform directories.
//!
//! Restaurants, menus, and delivery addresses are owned by other services;
//! the engine consumes them as snapshots and never writes them back.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Cents;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    /// Inactive restaurants are not accepting orders.
    pub is_active: bool,
    /// Flat delivery fee charged unless the order qualifies for a waiver.
    pub delivery_fee: Cents,
}

/// A customization choice offered on a menu item (size, extras, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemOption {
    pub id: Uuid,
    pub name: String,
    /// Added to the item's base price when selected.  May be negative.
    pub price_delta: Cents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    /// Current base price.  Orders snapshot this at creation time.
    pub price: Cents,
    pub is_available: bool,
    pub options: Vec<MenuItemOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub id: Uuid,
    /// Owning user.  Orders may only deliver to the caller's own addresses.
    pub user_id: Uuid,
    pub label: String,
}
