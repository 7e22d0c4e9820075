//! Scenario: illegal transitions bounce off without leaving a mark.
//!
//! # Invariants under test
//!
//! 1. Skipping a stage, cancelling after handoff, and resubmitting the
//!    current status are all state errors.
//! 2. Terminal orders reject every target, and the error says why.
//! 3. A rejected transition writes nothing: the status is unchanged and
//!    the tracking trail does not grow.

use tfn_ledger::OrderErrorKind;
use tfn_schemas::{OrderStatus, StatusChangeRequest};
use tfn_testkit::fixtures::demo_world;

fn change(status: OrderStatus) -> StatusChangeRequest {
    StatusChangeRequest {
        status,
        message: None,
        location: None,
        estimated_delivery_at: None,
    }
}

// ---------------------------------------------------------------------------
// 1. Illegal moves
// ---------------------------------------------------------------------------

#[tokio::test]
async fn skipping_a_stage_is_a_state_error() {
    let world = demo_world();
    let ledger = world.ledger();
    let created = ledger
        .create_order(&world.customer, world.cart())
        .await
        .unwrap();

    let err = ledger
        .update_status(&world.owner, created.order.id, change(OrderStatus::PickedUp))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), OrderErrorKind::State);

    let detail = ledger
        .order_detail(&world.owner, created.order.id)
        .await
        .unwrap();
    assert_eq!(detail.order.status, OrderStatus::Pending);
    assert_eq!(detail.tracking.len(), 1);
}

#[tokio::test]
async fn the_cancel_window_closes_once_the_order_is_ready() {
    let world = demo_world();
    let ledger = world.ledger();
    let created = ledger
        .create_order(&world.customer, world.cart())
        .await
        .unwrap();
    for status in [
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::ReadyForPickup,
    ] {
        ledger
            .update_status(&world.owner, created.order.id, change(status))
            .await
            .unwrap();
    }

    let err = ledger
        .update_status(&world.owner, created.order.id, change(OrderStatus::Cancelled))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), OrderErrorKind::State);

    let detail = ledger
        .order_detail(&world.owner, created.order.id)
        .await
        .unwrap();
    assert_eq!(detail.order.status, OrderStatus::ReadyForPickup);
    assert_eq!(detail.tracking.len(), 4);
}

#[tokio::test]
async fn resubmitting_the_current_status_is_a_state_error() {
    let world = demo_world();
    let ledger = world.ledger();
    let created = ledger
        .create_order(&world.customer, world.cart())
        .await
        .unwrap();
    ledger
        .update_status(&world.owner, created.order.id, change(OrderStatus::Confirmed))
        .await
        .unwrap();

    // A duplicate submission of the same step must not double-log it.
    let err = ledger
        .update_status(&world.owner, created.order.id, change(OrderStatus::Confirmed))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), OrderErrorKind::State);

    let detail = ledger
        .order_detail(&world.owner, created.order.id)
        .await
        .unwrap();
    assert_eq!(detail.order.status, OrderStatus::Confirmed);
    assert_eq!(detail.tracking.len(), 2);
}

// ---------------------------------------------------------------------------
// 2. Terminal orders
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delivered_orders_reject_every_target() {
    let world = demo_world();
    let ledger = world.ledger();
    let created = ledger
        .create_order(&world.customer, world.cart())
        .await
        .unwrap();
    for status in [
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::ReadyForPickup,
        OrderStatus::PickedUp,
        OrderStatus::OnTheWay,
        OrderStatus::Delivered,
    ] {
        ledger
            .update_status(&world.owner, created.order.id, change(status))
            .await
            .unwrap();
    }

    for target in OrderStatus::ALL {
        let err = ledger
            .update_status(&world.owner, created.order.id, change(target))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), OrderErrorKind::State, "target {target}");
        assert!(err.message().contains("terminal"), "got: {}", err.message());
    }

    let detail = ledger
        .order_detail(&world.owner, created.order.id)
        .await
        .unwrap();
    assert_eq!(detail.tracking.len(), 7, "the trail stopped at delivery");
}

#[tokio::test]
async fn cancelled_orders_stay_cancelled() {
    let world = demo_world();
    let ledger = world.ledger();
    let created = ledger
        .create_order(&world.customer, world.cart())
        .await
        .unwrap();
    ledger
        .update_status(&world.owner, created.order.id, change(OrderStatus::Cancelled))
        .await
        .unwrap();

    let err = ledger
        .update_status(&world.owner, created.order.id, change(OrderStatus::Confirmed))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), OrderErrorKind::State);

    let detail = ledger
        .order_detail(&world.owner, created.order.id)
        .await
        .unwrap();
    assert_eq!(detail.order.status, OrderStatus::Cancelled);
    assert_eq!(detail.tracking.len(), 2);
}
