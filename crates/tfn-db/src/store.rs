//! Postgres order store.
//!
//! # Invariants
//!
//! - `insert_order` writes the order row, every item snapshot, and the
//!   initial tracking entry inside one transaction; a failure anywhere
//!   rolls the whole order back.
//! - `apply_transition` re-reads the status under `select … for update`
//!   before writing.  Two writers racing from the same observed status
//!   serialize on the row lock; the second sees the moved status and fails
//!   with a state error, its transaction rolling back on drop.
//! - Tracking rows are insert-only; `seq` replays exact insertion order
//!   when two entries share a timestamp.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use tfn_ledger::{NewOrder, OrderError, OrderStore, StatusChange, TrackingOrder};
use tfn_schemas::{
    Cents, ChosenOption, GeoPoint, Order, OrderDetail, OrderItem, OrderStatus, TrackingUpdate,
};

#[derive(Debug, Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        PgOrderStore { pool }
    }
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

fn read_failed(err: sqlx::Error) -> OrderError {
    OrderError::persistence(format!("order read failed: {err}"))
}

fn write_failed(err: sqlx::Error) -> OrderError {
    OrderError::persistence(format!("order write failed: {err}"))
}

fn parse_status(raw: &str) -> Result<OrderStatus, OrderError> {
    OrderStatus::parse(raw)
        .ok_or_else(|| OrderError::persistence(format!("unknown status in storage: {raw:?}")))
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn order_from_row(row: &PgRow) -> Result<Order, OrderError> {
    let status_raw: String = row.try_get("status").map_err(read_failed)?;
    Ok(Order {
        id: row.try_get("order_id").map_err(read_failed)?,
        customer_id: row.try_get("customer_user_id").map_err(read_failed)?,
        restaurant_id: row.try_get("restaurant_id").map_err(read_failed)?,
        status: parse_status(&status_raw)?,
        subtotal: Cents::new(row.try_get("subtotal_cents").map_err(read_failed)?),
        delivery_fee: Cents::new(row.try_get("delivery_fee_cents").map_err(read_failed)?),
        tax: Cents::new(row.try_get("tax_cents").map_err(read_failed)?),
        tip: Cents::new(row.try_get("tip_cents").map_err(read_failed)?),
        delivery_address_id: row.try_get("delivery_address_id").map_err(read_failed)?,
        payment_method: row.try_get("payment_method").map_err(read_failed)?,
        payment_details: row.try_get("payment_details").map_err(read_failed)?,
        special_instructions: row.try_get("special_instructions").map_err(read_failed)?,
        estimated_delivery_at: row.try_get("estimated_delivery_at").map_err(read_failed)?,
        actual_delivery_at: row.try_get("actual_delivery_at").map_err(read_failed)?,
        created_at: row.try_get("created_at").map_err(read_failed)?,
        updated_at: row.try_get("updated_at").map_err(read_failed)?,
    })
}

fn item_from_row(row: &PgRow) -> Result<OrderItem, OrderError> {
    let customizations_raw: serde_json::Value =
        row.try_get("customizations").map_err(read_failed)?;
    let customizations: Vec<ChosenOption> = serde_json::from_value(customizations_raw)
        .map_err(|err| {
            OrderError::persistence(format!("malformed customization snapshot: {err}"))
        })?;
    Ok(OrderItem {
        id: row.try_get("order_item_id").map_err(read_failed)?,
        order_id: row.try_get("order_id").map_err(read_failed)?,
        menu_item_id: row.try_get("menu_item_id").map_err(read_failed)?,
        name: row.try_get("name").map_err(read_failed)?,
        unit_price: Cents::new(row.try_get("unit_price_cents").map_err(read_failed)?),
        quantity: row.try_get("quantity").map_err(read_failed)?,
        customizations,
        special_instructions: row.try_get("special_instructions").map_err(read_failed)?,
    })
}

fn tracking_from_row(row: &PgRow) -> Result<TrackingUpdate, OrderError> {
    let status_raw: String = row.try_get("status").map_err(read_failed)?;
    let latitude: Option<f64> = row.try_get("latitude").map_err(read_failed)?;
    let longitude: Option<f64> = row.try_get("longitude").map_err(read_failed)?;
    let location = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(GeoPoint {
            latitude,
            longitude,
        }),
        _ => None,
    };
    Ok(TrackingUpdate {
        id: row.try_get("tracking_id").map_err(read_failed)?,
        order_id: row.try_get("order_id").map_err(read_failed)?,
        status: parse_status(&status_raw)?,
        message: row.try_get("message").map_err(read_failed)?,
        location,
        created_at: row.try_get("created_at").map_err(read_failed)?,
    })
}

// ---------------------------------------------------------------------------
// OrderStore
// ---------------------------------------------------------------------------

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert_order(&self, order: NewOrder) -> Result<OrderDetail, OrderError> {
        let order_id = Uuid::new_v4();
        let mut tx = self.pool.begin().await.map_err(write_failed)?;

        sqlx::query(
            r#"
            insert into orders (
              order_id, customer_user_id, restaurant_id, delivery_address_id,
              status, subtotal_cents, delivery_fee_cents, tax_cents, tip_cents,
              payment_method, payment_details, special_instructions
            ) values (
              $1, $2, $3, $4, 'pending', $5, $6, $7, $8, $9, $10, $11
            )
            "#,
        )
        .bind(order_id)
        .bind(order.customer_id)
        .bind(order.restaurant_id)
        .bind(order.delivery_address_id)
        .bind(order.subtotal.raw())
        .bind(order.delivery_fee.raw())
        .bind(order.tax.raw())
        .bind(order.tip.raw())
        .bind(&order.payment_method)
        .bind(&order.payment_details)
        .bind(&order.special_instructions)
        .execute(&mut *tx)
        .await
        .map_err(write_failed)?;

        for item in &order.items {
            let customizations = serde_json::to_value(&item.customizations).map_err(|err| {
                OrderError::persistence(format!("customization snapshot encode failed: {err}"))
            })?;
            sqlx::query(
                r#"
                insert into order_items (
                  order_item_id, order_id, menu_item_id, name,
                  unit_price_cents, quantity, customizations, special_instructions
                ) values (
                  $1, $2, $3, $4, $5, $6, $7, $8
                )
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(order_id)
            .bind(item.menu_item_id)
            .bind(&item.name)
            .bind(item.unit_price.raw())
            .bind(item.quantity)
            .bind(customizations)
            .bind(&item.special_instructions)
            .execute(&mut *tx)
            .await
            .map_err(write_failed)?;
        }

        sqlx::query(
            r#"
            insert into order_tracking (tracking_id, order_id, status, message)
            values ($1, $2, 'pending', $3)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order_id)
        .bind(&order.initial_message)
        .execute(&mut *tx)
        .await
        .map_err(write_failed)?;

        tx.commit().await.map_err(write_failed)?;

        self.order_detail(order_id).await?.ok_or_else(|| {
            OrderError::persistence(format!("order {order_id} vanished after insert"))
        })
    }

    async fn apply_transition(
        &self,
        order_id: Uuid,
        expect_from: OrderStatus,
        change: StatusChange,
    ) -> Result<OrderDetail, OrderError> {
        let mut tx = self.pool.begin().await.map_err(write_failed)?;

        let row = sqlx::query(
            r#"
            select status
            from orders
            where order_id = $1
            for update
            "#,
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(read_failed)?;

        let Some(row) = row else {
            return Err(OrderError::not_found(format!("order {order_id}")));
        };
        let current = parse_status(&row.try_get::<String, _>("status").map_err(read_failed)?)?;
        // The precondition check under the row lock: a concurrent winner has
        // already moved the status, so the loser is refused here. Dropping
        // the transaction rolls back.
        if current != expect_from {
            return Err(OrderError::state(format!(
                "order status is {}, not {}; transition not applied",
                current, expect_from
            )));
        }

        sqlx::query(
            r#"
            update orders
            set status = $2,
                updated_at = now(),
                estimated_delivery_at = coalesce($3::timestamptz, estimated_delivery_at),
                actual_delivery_at = case
                    when $2 = 'delivered' then now()
                    else actual_delivery_at
                end
            where order_id = $1
            "#,
        )
        .bind(order_id)
        .bind(change.to.as_str())
        .bind(change.estimated_delivery_at)
        .execute(&mut *tx)
        .await
        .map_err(write_failed)?;

        sqlx::query(
            r#"
            insert into order_tracking (
              tracking_id, order_id, status, message, latitude, longitude
            ) values (
              $1, $2, $3, $4, $5, $6
            )
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order_id)
        .bind(change.to.as_str())
        .bind(&change.message)
        .bind(change.location.map(|point| point.latitude))
        .bind(change.location.map(|point| point.longitude))
        .execute(&mut *tx)
        .await
        .map_err(write_failed)?;

        tx.commit().await.map_err(write_failed)?;

        self.order_detail(order_id).await?.ok_or_else(|| {
            OrderError::persistence(format!("order {order_id} vanished after transition"))
        })
    }

    async fn order_detail(&self, order_id: Uuid) -> Result<Option<OrderDetail>, OrderError> {
        let row = sqlx::query(
            r#"
            select
              order_id, customer_user_id, restaurant_id, delivery_address_id,
              status, subtotal_cents, delivery_fee_cents, tax_cents, tip_cents,
              payment_method, payment_details, special_instructions,
              estimated_delivery_at, actual_delivery_at, created_at, updated_at
            from orders
            where order_id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(read_failed)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let order = order_from_row(&row)?;

        let item_rows = sqlx::query(
            r#"
            select
              order_item_id, order_id, menu_item_id, name,
              unit_price_cents, quantity, customizations, special_instructions
            from order_items
            where order_id = $1
            order by name asc, order_item_id asc
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(read_failed)?;
        let mut items = Vec::with_capacity(item_rows.len());
        for item_row in &item_rows {
            items.push(item_from_row(item_row)?);
        }

        let tracking = self.tracking(order_id, TrackingOrder::OldestFirst).await?;

        Ok(Some(OrderDetail {
            order,
            items,
            tracking,
        }))
    }

    async fn tracking(
        &self,
        order_id: Uuid,
        order: TrackingOrder,
    ) -> Result<Vec<TrackingUpdate>, OrderError> {
        let rows = match order {
            TrackingOrder::OldestFirst => {
                sqlx::query(
                    r#"
                    select tracking_id, order_id, status, message,
                           latitude, longitude, created_at
                    from order_tracking
                    where order_id = $1
                    order by created_at asc, seq asc
                    "#,
                )
                .bind(order_id)
                .fetch_all(&self.pool)
                .await
                .map_err(read_failed)?
            }
            TrackingOrder::NewestFirst => {
                sqlx::query(
                    r#"
                    select tracking_id, order_id, status, message,
                           latitude, longitude, created_at
                    from order_tracking
                    where order_id = $1
                    order by created_at desc, seq desc
                    "#,
                )
                .bind(order_id)
                .fetch_all(&self.pool)
                .await
                .map_err(read_failed)?
            }
        };

        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            entries.push(tracking_from_row(row)?);
        }
        Ok(entries)
    }
}
