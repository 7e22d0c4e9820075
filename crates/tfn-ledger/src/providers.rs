//! Seams to the external directory services.
//!
//! Restaurants, menus, and addresses are owned elsewhere; the ledger
//! consumes them through these read-only traits.  Production wires the
//! Postgres-backed implementations from `tfn-db`; tests wire the in-memory
//! ones from `tfn-testkit`.  Provider failures are infrastructure, not
//! business outcomes, so they surface as `Persistence` errors.

use async_trait::async_trait;
use uuid::Uuid;

use tfn_schemas::{Address, MenuItem, Restaurant};

use crate::error::OrderError;

#[async_trait]
pub trait RestaurantDirectory: Send + Sync {
    async fn restaurant(&self, id: Uuid) -> Result<Option<Restaurant>, OrderError>;
}

#[async_trait]
pub trait MenuCatalog: Send + Sync {
    /// Fetch items by id regardless of owning restaurant.  The pricing
    /// engine decides whether an item actually belongs to the cart's
    /// restaurant — filtering here would collapse "foreign item" into
    /// "unknown item" and lose that distinction.
    async fn menu_items(&self, ids: &[Uuid]) -> Result<Vec<MenuItem>, OrderError>;
}

#[async_trait]
pub trait AddressBook: Send + Sync {
    async fn address(&self, id: Uuid) -> Result<Option<Address>, OrderError>;
}
