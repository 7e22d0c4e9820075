//! In-memory directory double.
//!
//! Backs all three provider traits from one mutex-guarded map set.  Tests
//! mutate the "external" world mid-scenario (reprice an item, deactivate a
//! restaurant) to exercise snapshot and availability behavior.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use tfn_ledger::{AddressBook, MenuCatalog, OrderError, RestaurantDirectory};
use tfn_schemas::{Address, Cents, MenuItem, Restaurant};

#[derive(Default)]
struct Inner {
    restaurants: HashMap<Uuid, Restaurant>,
    items: HashMap<Uuid, MenuItem>,
    addresses: HashMap<Uuid, Address>,
}

#[derive(Default)]
pub struct InMemoryDirectory {
    inner: Mutex<Inner>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("directory lock poisoned")
    }

    pub fn put_restaurant(&self, restaurant: Restaurant) {
        self.locked().restaurants.insert(restaurant.id, restaurant);
    }

    pub fn put_menu_item(&self, item: MenuItem) {
        self.locked().items.insert(item.id, item);
    }

    pub fn put_address(&self, address: Address) {
        self.locked().addresses.insert(address.id, address);
    }

    pub fn set_restaurant_active(&self, id: Uuid, active: bool) {
        if let Some(r) = self.locked().restaurants.get_mut(&id) {
            r.is_active = active;
        }
    }

    pub fn set_item_available(&self, id: Uuid, available: bool) {
        if let Some(i) = self.locked().items.get_mut(&id) {
            i.is_available = available;
        }
    }

    pub fn set_item_price(&self, id: Uuid, price: Cents) {
        if let Some(i) = self.locked().items.get_mut(&id) {
            i.price = price;
        }
    }

    pub fn rename_item(&self, id: Uuid, name: &str) {
        if let Some(i) = self.locked().items.get_mut(&id) {
            i.name = name.to_string();
        }
    }
}

#[async_trait]
impl RestaurantDirectory for InMemoryDirectory {
    async fn restaurant(&self, id: Uuid) -> Result<Option<Restaurant>, OrderError> {
        Ok(self.locked().restaurants.get(&id).cloned())
    }
}

#[async_trait]
impl MenuCatalog for InMemoryDirectory {
    async fn menu_items(&self, ids: &[Uuid]) -> Result<Vec<MenuItem>, OrderError> {
        let inner = self.locked();
        Ok(ids
            .iter()
            .filter_map(|id| inner.items.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl AddressBook for InMemoryDirectory {
    async fn address(&self, id: Uuid) -> Result<Option<Address>, OrderError> {
        Ok(self.locked().addresses.get(&id).cloned())
    }
}
