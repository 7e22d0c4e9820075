//! Demo directory seed.
//!
//! Inserts the same restaurant, menu, and address the in-memory demo world
//! uses, under the same fixed ids, so walkthrough commands behave
//! identically whether the daemon runs against Postgres or in-memory.
//! Upserts keep re-seeding safe.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

/// Well-known ids written by [`seed_demo`].
#[derive(Debug, Clone)]
pub struct DemoSeed {
    pub customer_id: Uuid,
    pub owner_id: Uuid,
    pub restaurant_id: Uuid,
    pub address_id: Uuid,
    pub curry_id: Uuid,
    pub naan_id: Uuid,
    pub extra_cheese_id: Uuid,
}

impl DemoSeed {
    pub fn well_known() -> Self {
        DemoSeed {
            customer_id: Uuid::from_u128(0xA001),
            owner_id: Uuid::from_u128(0xA002),
            restaurant_id: Uuid::from_u128(0xB001),
            address_id: Uuid::from_u128(0xC001),
            curry_id: Uuid::from_u128(0xD001),
            naan_id: Uuid::from_u128(0xD002),
            extra_cheese_id: Uuid::from_u128(0xE001),
        }
    }
}

/// Seed the directory tables with the demo restaurant. Idempotent.
pub async fn seed_demo(pool: &PgPool) -> Result<DemoSeed> {
    let seed = DemoSeed::well_known();

    sqlx::query(
        r#"
        insert into restaurants (restaurant_id, owner_user_id, name, is_active, delivery_fee_cents)
        values ($1, $2, $3, true, $4)
        on conflict (restaurant_id) do update set
          owner_user_id = excluded.owner_user_id,
          name = excluded.name,
          is_active = excluded.is_active,
          delivery_fee_cents = excluded.delivery_fee_cents
        "#,
    )
    .bind(seed.restaurant_id)
    .bind(seed.owner_id)
    .bind("Tandoor House")
    .bind(299_i64)
    .execute(pool)
    .await
    .context("seed restaurants failed")?;

    for (item_id, name, price_cents) in [
        (seed.curry_id, "Paneer Makhani", 1_200_i64),
        (seed.naan_id, "Garlic Naan", 450_i64),
    ] {
        sqlx::query(
            r#"
            insert into menu_items (menu_item_id, restaurant_id, name, price_cents, is_available)
            values ($1, $2, $3, $4, true)
            on conflict (menu_item_id) do update set
              restaurant_id = excluded.restaurant_id,
              name = excluded.name,
              price_cents = excluded.price_cents,
              is_available = excluded.is_available
            "#,
        )
        .bind(item_id)
        .bind(seed.restaurant_id)
        .bind(name)
        .bind(price_cents)
        .execute(pool)
        .await
        .with_context(|| format!("seed menu item {name} failed"))?;
    }

    sqlx::query(
        r#"
        insert into menu_item_options (option_id, menu_item_id, name, price_delta_cents)
        values ($1, $2, $3, $4)
        on conflict (option_id) do update set
          menu_item_id = excluded.menu_item_id,
          name = excluded.name,
          price_delta_cents = excluded.price_delta_cents
        "#,
    )
    .bind(seed.extra_cheese_id)
    .bind(seed.naan_id)
    .bind("Extra Cheese")
    .bind(100_i64)
    .execute(pool)
    .await
    .context("seed menu item options failed")?;

    sqlx::query(
        r#"
        insert into addresses (address_id, user_id, label)
        values ($1, $2, $3)
        on conflict (address_id) do update set
          user_id = excluded.user_id,
          label = excluded.label
        "#,
    )
    .bind(seed.address_id)
    .bind(seed.customer_id)
    .bind("Home")
    .execute(pool)
    .await
    .context("seed addresses failed")?;

    Ok(seed)
}
