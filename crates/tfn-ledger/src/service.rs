//! The order ledger service — the single write path for orders.
//!
//! # Invariants (enforced at runtime, tested in tfn-testkit scenarios)
//!
//! **Creation** runs its checks in a fixed order before anything is written:
//!
//! 1. Request shape (quantities, tip, payment method) — `Validation`
//! 2. Restaurant exists — `NotFound`; restaurant is active — `Availability`
//! 3. Address exists AND belongs to the caller — `NotFound` either way
//!    (foreign addresses must be indistinguishable from absent ones)
//! 4. Cart prices from the catalog — pricing failures mapped per variant
//! 5. One storage transaction: order + item snapshots + initial tracking
//!    entry.  No partial orders, ever.
//!
//! **Transition** authorizes BEFORE inspecting state: a non-owner is told
//! `Authorization` even when the transition would also have been illegal.
//! The table check happens here; the storage layer re-checks the
//! `expect_from` precondition inside its transaction so a concurrent loser
//! gets `State`, not a silent overwrite.
//!
//! **Reads** are participant-gated: the order's customer and the
//! restaurant's owner see it, nobody else does.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use tfn_lifecycle::{default_message, validate_transition};
use tfn_pricing::{price_cart, CatalogSnapshot, PricingError, PricingPolicy};
use tfn_schemas::{
    Caller, CreateOrderRequest, OrderDetail, OrderStatus, StatusChangeRequest, TrackingUpdate,
};

use crate::error::OrderError;
use crate::providers::{AddressBook, MenuCatalog, RestaurantDirectory};
use crate::store::{NewOrder, NewOrderItem, OrderStore, StatusChange, TrackingOrder};

/// Upper bound on a single line's quantity; anything above is a typo or
/// abuse, not a meal.
pub const MAX_LINE_QUANTITY: i32 = 99;

// ---------------------------------------------------------------------------
// OrderLedger
// ---------------------------------------------------------------------------

/// Order lifecycle operations over pluggable directories and storage.
pub struct OrderLedger {
    restaurants: Arc<dyn RestaurantDirectory>,
    catalog: Arc<dyn MenuCatalog>,
    addresses: Arc<dyn AddressBook>,
    store: Arc<dyn OrderStore>,
    policy: PricingPolicy,
}

impl OrderLedger {
    pub fn new(
        restaurants: Arc<dyn RestaurantDirectory>,
        catalog: Arc<dyn MenuCatalog>,
        addresses: Arc<dyn AddressBook>,
        store: Arc<dyn OrderStore>,
        policy: PricingPolicy,
    ) -> Self {
        OrderLedger {
            restaurants,
            catalog,
            addresses,
            store,
            policy,
        }
    }

    // -----------------------------------------------------------------------
    // Creation
    // -----------------------------------------------------------------------

    /// Create an order from a cart.
    ///
    /// There is intentionally no idempotency key: two identical submissions
    /// create two orders.  Deduplication is a product decision that has not
    /// been taken; do not add it silently here.
    pub async fn create_order(
        &self,
        caller: &Caller,
        req: CreateOrderRequest,
    ) -> Result<OrderDetail, OrderError> {
        validate_create(&req)?;

        let restaurant = self
            .restaurants
            .restaurant(req.restaurant_id)
            .await?
            .ok_or_else(|| OrderError::not_found(format!("restaurant {}", req.restaurant_id)))?;
        if !restaurant.is_active {
            return Err(OrderError::availability(format!(
                "restaurant {} is not accepting orders",
                restaurant.id
            )));
        }

        // A foreign address answers exactly like a missing one.
        let address = self
            .addresses
            .address(req.delivery_address_id)
            .await?
            .filter(|a| a.user_id == caller.user_id)
            .ok_or_else(|| {
                OrderError::not_found(format!("delivery address {}", req.delivery_address_id))
            })?;

        let wanted: Vec<Uuid> = req.items.iter().map(|l| l.menu_item_id).collect();
        let snapshot = CatalogSnapshot::from_items(self.catalog.menu_items(&wanted).await?);
        let quote =
            price_cart(&snapshot, &restaurant, &req.items, &self.policy).map_err(map_pricing)?;

        let new_order = NewOrder {
            customer_id: caller.user_id,
            restaurant_id: restaurant.id,
            delivery_address_id: address.id,
            payment_method: req.payment_method.trim().to_string(),
            payment_details: req.payment_details,
            special_instructions: req.special_instructions,
            subtotal: quote.subtotal,
            delivery_fee: quote.delivery_fee,
            tax: quote.tax,
            tip: req.tip,
            items: quote.lines.into_iter().map(NewOrderItem::from).collect(),
            initial_message: default_message(OrderStatus::Pending).to_string(),
        };

        let detail = self.store.insert_order(new_order).await?;
        info!(
            order_id = %detail.order.id,
            customer_id = %caller.user_id,
            restaurant_id = %restaurant.id,
            subtotal = %detail.order.subtotal,
            total = %detail.order.total(),
            "order created"
        );
        Ok(detail)
    }

    // -----------------------------------------------------------------------
    // Transition
    // -----------------------------------------------------------------------

    /// Move an order to a new status, appending one tracking entry.
    pub async fn update_status(
        &self,
        caller: &Caller,
        order_id: Uuid,
        req: StatusChangeRequest,
    ) -> Result<OrderDetail, OrderError> {
        let current = self
            .store
            .order_detail(order_id)
            .await?
            .ok_or_else(|| OrderError::not_found(format!("order {order_id}")))?;

        let restaurant = self
            .restaurants
            .restaurant(current.order.restaurant_id)
            .await?
            .ok_or_else(|| {
                OrderError::not_found(format!("restaurant {}", current.order.restaurant_id))
            })?;

        // Ownership first, state second: a non-owner always gets the
        // authorization refusal, never a hint about the order's state.
        if restaurant.owner_id != caller.user_id {
            return Err(OrderError::forbidden(
                "only the restaurant owner may update this order",
            ));
        }

        validate_transition(current.order.status, req.status)
            .map_err(OrderError::from_transition)?;

        let message = match req.message {
            Some(m) if !m.trim().is_empty() => m,
            _ => default_message(req.status).to_string(),
        };
        let change = StatusChange {
            to: req.status,
            message,
            location: req.location,
            estimated_delivery_at: req.estimated_delivery_at,
        };

        let detail = self
            .store
            .apply_transition(order_id, current.order.status, change)
            .await?;
        info!(
            order_id = %order_id,
            from = %current.order.status,
            to = %req.status,
            "order status updated"
        );
        Ok(detail)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Hydrated order for a participant.
    pub async fn order_detail(
        &self,
        caller: &Caller,
        order_id: Uuid,
    ) -> Result<OrderDetail, OrderError> {
        let detail = self
            .store
            .order_detail(order_id)
            .await?
            .ok_or_else(|| OrderError::not_found(format!("order {order_id}")))?;
        self.authorize_participant(caller, &detail).await?;
        Ok(detail)
    }

    /// Tracking history for a participant, sorted by creation time in the
    /// requested direction.
    pub async fn tracking(
        &self,
        caller: &Caller,
        order_id: Uuid,
        order: TrackingOrder,
    ) -> Result<Vec<TrackingUpdate>, OrderError> {
        let detail = self
            .store
            .order_detail(order_id)
            .await?
            .ok_or_else(|| OrderError::not_found(format!("order {order_id}")))?;
        self.authorize_participant(caller, &detail).await?;
        self.store.tracking(order_id, order).await
    }

    async fn authorize_participant(
        &self,
        caller: &Caller,
        detail: &OrderDetail,
    ) -> Result<(), OrderError> {
        if detail.order.customer_id == caller.user_id {
            return Ok(());
        }
        if let Some(restaurant) = self
            .restaurants
            .restaurant(detail.order.restaurant_id)
            .await?
        {
            if restaurant.owner_id == caller.user_id {
                return Ok(());
            }
        }
        Err(OrderError::forbidden(
            "caller is not a participant in this order",
        ))
    }
}

// ---------------------------------------------------------------------------
// Request validation & pricing-error mapping
// ---------------------------------------------------------------------------

fn validate_create(req: &CreateOrderRequest) -> Result<(), OrderError> {
    if req.items.is_empty() {
        return Err(OrderError::validation("order must contain at least one item"));
    }
    for line in &req.items {
        if line.quantity < 1 || line.quantity > MAX_LINE_QUANTITY {
            return Err(OrderError::validation(format!(
                "line quantity must be between 1 and {MAX_LINE_QUANTITY}, got {}",
                line.quantity
            )));
        }
    }
    if req.tip.is_negative() {
        return Err(OrderError::validation("tip cannot be negative"));
    }
    if req.payment_method.trim().is_empty() {
        return Err(OrderError::validation("payment_method is required"));
    }
    Ok(())
}

fn map_pricing(err: PricingError) -> OrderError {
    match err {
        PricingError::UnknownItem { menu_item_id } => {
            OrderError::not_found(format!("menu item {menu_item_id}"))
        }
        PricingError::UnknownOption {
            menu_item_id,
            option_id,
        } => OrderError::not_found(format!("option {option_id} on menu item {menu_item_id}")),
        PricingError::ItemUnavailable { .. } | PricingError::ForeignRestaurant { .. } => {
            OrderError::availability(err.to_string())
        }
        PricingError::NegativeUnitPrice { .. } | PricingError::AmountOverflow => {
            OrderError::validation(err.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests (pure parts; full flows live in tfn-testkit scenarios)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OrderErrorKind;
    use tfn_schemas::{CartLine, Cents};

    fn valid_request() -> CreateOrderRequest {
        CreateOrderRequest {
            restaurant_id: Uuid::new_v4(),
            items: vec![CartLine {
                menu_item_id: Uuid::new_v4(),
                quantity: 2,
                customizations: vec![],
                special_instructions: None,
            }],
            delivery_address_id: Uuid::new_v4(),
            payment_method: "card".to_string(),
            payment_details: serde_json::Value::Null,
            special_instructions: None,
            tip: Cents::ZERO,
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(validate_create(&valid_request()).is_ok());
    }

    #[test]
    fn empty_cart_is_rejected() {
        let mut req = valid_request();
        req.items.clear();
        let err = validate_create(&req).unwrap_err();
        assert_eq!(err.kind(), OrderErrorKind::Validation);
    }

    #[test]
    fn zero_and_oversized_quantities_are_rejected() {
        for qty in [0, -3, MAX_LINE_QUANTITY + 1] {
            let mut req = valid_request();
            req.items[0].quantity = qty;
            let err = validate_create(&req).unwrap_err();
            assert_eq!(err.kind(), OrderErrorKind::Validation, "qty {qty}");
        }
    }

    #[test]
    fn negative_tip_is_rejected() {
        let mut req = valid_request();
        req.tip = Cents::new(-1);
        let err = validate_create(&req).unwrap_err();
        assert_eq!(err.kind(), OrderErrorKind::Validation);
    }

    #[test]
    fn blank_payment_method_is_rejected() {
        let mut req = valid_request();
        req.payment_method = "   ".to_string();
        let err = validate_create(&req).unwrap_err();
        assert_eq!(err.kind(), OrderErrorKind::Validation);
    }

    #[test]
    fn pricing_errors_map_onto_the_taxonomy() {
        let id = Uuid::new_v4();
        let opt = Uuid::new_v4();
        assert_eq!(
            map_pricing(PricingError::UnknownItem { menu_item_id: id }).kind(),
            OrderErrorKind::NotFound
        );
        assert_eq!(
            map_pricing(PricingError::UnknownOption {
                menu_item_id: id,
                option_id: opt
            })
            .kind(),
            OrderErrorKind::NotFound
        );
        assert_eq!(
            map_pricing(PricingError::ItemUnavailable { menu_item_id: id }).kind(),
            OrderErrorKind::Availability
        );
        assert_eq!(
            map_pricing(PricingError::ForeignRestaurant { menu_item_id: id }).kind(),
            OrderErrorKind::Availability
        );
        assert_eq!(
            map_pricing(PricingError::AmountOverflow).kind(),
            OrderErrorKind::Validation
        );
    }
}
