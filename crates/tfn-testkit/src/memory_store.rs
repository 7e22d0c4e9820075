//! In-memory `OrderStore` double.
//!
//! One mutex stands in for the database transaction: every store operation
//! runs as a single critical section, so the check-then-write contract of
//! `apply_transition` holds exactly as it does under a Postgres row lock.
//! Tracking entries carry a monotonic sequence so creation-time sorting is
//! stable even when two writes land on the same clock tick.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use tfn_ledger::{NewOrder, OrderError, OrderStore, StatusChange, TrackingOrder};
use tfn_schemas::{Order, OrderDetail, OrderItem, OrderStatus, TrackingUpdate};

#[derive(Clone)]
struct SeqEntry {
    seq: u64,
    entry: TrackingUpdate,
}

#[derive(Default)]
struct Inner {
    orders: HashMap<Uuid, Order>,
    items: HashMap<Uuid, Vec<OrderItem>>,
    tracking: HashMap<Uuid, Vec<SeqEntry>>,
    next_seq: u64,
    fail_next_write: bool,
}

impl Inner {
    fn take_injected_failure(&mut self) -> Result<(), OrderError> {
        if self.fail_next_write {
            self.fail_next_write = false;
            return Err(OrderError::persistence("injected storage failure"));
        }
        Ok(())
    }

    fn sorted_tracking(&self, order_id: Uuid) -> Vec<SeqEntry> {
        let mut rows = self.tracking.get(&order_id).cloned().unwrap_or_default();
        rows.sort_by(|a, b| {
            a.entry
                .created_at
                .cmp(&b.entry.created_at)
                .then(a.seq.cmp(&b.seq))
        });
        rows
    }

    fn hydrate(&self, order: &Order) -> OrderDetail {
        OrderDetail {
            order: order.clone(),
            items: self.items.get(&order.id).cloned().unwrap_or_default(),
            tracking: self
                .sorted_tracking(order.id)
                .into_iter()
                .map(|s| s.entry)
                .collect(),
        }
    }
}

#[derive(Default)]
pub struct InMemoryOrderStore {
    inner: Mutex<Inner>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("store lock poisoned")
    }

    /// Make the next write (insert or transition) fail with a persistence
    /// error before touching any state.
    pub fn fail_next_write(&self) {
        self.locked().fail_next_write = true;
    }

    pub fn order_count(&self) -> usize {
        self.locked().orders.len()
    }

    pub fn tracking_count(&self, order_id: Uuid) -> usize {
        self.locked()
            .tracking
            .get(&order_id)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert_order(&self, order: NewOrder) -> Result<OrderDetail, OrderError> {
        let mut inner = self.locked();
        inner.take_injected_failure()?;

        let now = Utc::now();
        let order_id = Uuid::new_v4();
        let row = Order {
            id: order_id,
            customer_id: order.customer_id,
            restaurant_id: order.restaurant_id,
            status: OrderStatus::Pending,
            subtotal: order.subtotal,
            delivery_fee: order.delivery_fee,
            tax: order.tax,
            tip: order.tip,
            delivery_address_id: order.delivery_address_id,
            payment_method: order.payment_method,
            payment_details: order.payment_details,
            special_instructions: order.special_instructions,
            estimated_delivery_at: None,
            actual_delivery_at: None,
            created_at: now,
            updated_at: now,
        };
        let items: Vec<OrderItem> = order
            .items
            .into_iter()
            .map(|item| OrderItem {
                id: Uuid::new_v4(),
                order_id,
                menu_item_id: item.menu_item_id,
                name: item.name,
                unit_price: item.unit_price,
                quantity: item.quantity,
                customizations: item.customizations,
                special_instructions: item.special_instructions,
            })
            .collect();
        let first = TrackingUpdate {
            id: Uuid::new_v4(),
            order_id,
            status: OrderStatus::Pending,
            message: order.initial_message,
            location: None,
            created_at: now,
        };

        inner.orders.insert(order_id, row.clone());
        inner.items.insert(order_id, items);
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner
            .tracking
            .insert(order_id, vec![SeqEntry { seq, entry: first }]);

        let detail = inner.hydrate(&row);
        Ok(detail)
    }

    async fn apply_transition(
        &self,
        order_id: Uuid,
        expect_from: OrderStatus,
        change: StatusChange,
    ) -> Result<OrderDetail, OrderError> {
        let mut inner = self.locked();
        inner.take_injected_failure()?;

        let now = Utc::now();
        let updated = {
            let row = inner
                .orders
                .get_mut(&order_id)
                .ok_or_else(|| OrderError::not_found(format!("order {order_id}")))?;
            // The precondition check under the lock: a concurrent winner has
            // already moved the status, so the loser is refused here.
            if row.status != expect_from {
                return Err(OrderError::state(format!(
                    "order status is {}, not {}; transition not applied",
                    row.status, expect_from
                )));
            }
            row.status = change.to;
            row.updated_at = now;
            if let Some(estimate) = change.estimated_delivery_at {
                row.estimated_delivery_at = Some(estimate);
            }
            if change.to == OrderStatus::Delivered {
                row.actual_delivery_at = Some(now);
            }
            row.clone()
        };

        let entry = TrackingUpdate {
            id: Uuid::new_v4(),
            order_id,
            status: change.to,
            message: change.message,
            location: change.location,
            created_at: now,
        };
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner
            .tracking
            .entry(order_id)
            .or_default()
            .push(SeqEntry { seq, entry });

        let detail = inner.hydrate(&updated);
        Ok(detail)
    }

    async fn order_detail(&self, order_id: Uuid) -> Result<Option<OrderDetail>, OrderError> {
        let inner = self.locked();
        Ok(inner.orders.get(&order_id).map(|row| inner.hydrate(row)))
    }

    async fn tracking(
        &self,
        order_id: Uuid,
        order: TrackingOrder,
    ) -> Result<Vec<TrackingUpdate>, OrderError> {
        let inner = self.locked();
        let mut rows: Vec<TrackingUpdate> = inner
            .sorted_tracking(order_id)
            .into_iter()
            .map(|s| s.entry)
            .collect();
        if order == TrackingOrder::NewestFirst {
            rows.reverse();
        }
        Ok(rows)
    }
}
