//! Postgres-backed directory reads.
//!
//! One struct implements all three provider seams; the ledger holds it
//! behind three `Arc<dyn …>` handles. All failures here are infrastructure
//! failures and map to the persistence kind.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use tfn_ledger::{AddressBook, MenuCatalog, OrderError, RestaurantDirectory};
use tfn_schemas::{Address, Cents, MenuItem, MenuItemOption, Restaurant};

#[derive(Debug, Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        PgDirectory { pool }
    }
}

fn read_failed(err: sqlx::Error) -> OrderError {
    OrderError::persistence(format!("directory read failed: {err}"))
}

#[async_trait]
impl RestaurantDirectory for PgDirectory {
    async fn restaurant(&self, id: Uuid) -> Result<Option<Restaurant>, OrderError> {
        let row = sqlx::query(
            r#"
            select restaurant_id, owner_user_id, name, is_active, delivery_fee_cents
            from restaurants
            where restaurant_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(read_failed)?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(Restaurant {
            id: row.try_get("restaurant_id").map_err(read_failed)?,
            owner_id: row.try_get("owner_user_id").map_err(read_failed)?,
            name: row.try_get("name").map_err(read_failed)?,
            is_active: row.try_get("is_active").map_err(read_failed)?,
            delivery_fee: Cents::new(row.try_get("delivery_fee_cents").map_err(read_failed)?),
        }))
    }
}

#[async_trait]
impl MenuCatalog for PgDirectory {
    async fn menu_items(&self, ids: &[Uuid]) -> Result<Vec<MenuItem>, OrderError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let item_rows = sqlx::query(
            r#"
            select menu_item_id, restaurant_id, name, price_cents, is_available
            from menu_items
            where menu_item_id = any($1)
            order by menu_item_id asc
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(read_failed)?;

        let mut items: Vec<MenuItem> = Vec::with_capacity(item_rows.len());
        for row in item_rows {
            items.push(MenuItem {
                id: row.try_get("menu_item_id").map_err(read_failed)?,
                restaurant_id: row.try_get("restaurant_id").map_err(read_failed)?,
                name: row.try_get("name").map_err(read_failed)?,
                price: Cents::new(row.try_get("price_cents").map_err(read_failed)?),
                is_available: row.try_get("is_available").map_err(read_failed)?,
                options: Vec::new(),
            });
        }

        let found_ids: Vec<Uuid> = items.iter().map(|item| item.id).collect();
        let option_rows = sqlx::query(
            r#"
            select option_id, menu_item_id, name, price_delta_cents
            from menu_item_options
            where menu_item_id = any($1)
            order by name asc
            "#,
        )
        .bind(&found_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(read_failed)?;

        let mut by_item: HashMap<Uuid, Vec<MenuItemOption>> = HashMap::new();
        for row in option_rows {
            let item_id: Uuid = row.try_get("menu_item_id").map_err(read_failed)?;
            by_item.entry(item_id).or_default().push(MenuItemOption {
                id: row.try_get("option_id").map_err(read_failed)?,
                name: row.try_get("name").map_err(read_failed)?,
                price_delta: Cents::new(
                    row.try_get("price_delta_cents").map_err(read_failed)?,
                ),
            });
        }
        for item in &mut items {
            if let Some(options) = by_item.remove(&item.id) {
                item.options = options;
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl AddressBook for PgDirectory {
    async fn address(&self, id: Uuid) -> Result<Option<Address>, OrderError> {
        let row = sqlx::query(
            r#"
            select address_id, user_id, label
            from addresses
            where address_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(read_failed)?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(Address {
            id: row.try_get("address_id").map_err(read_failed)?,
            user_id: row.try_get("user_id").map_err(read_failed)?,
            label: row.try_get("label").map_err(read_failed)?,
        }))
    }
}
