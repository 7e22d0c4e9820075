//! In-process scenario tests for tfn-daemon HTTP endpoints.
//!
//! These tests spin up the Axum router **without** binding a TCP socket.
//! Each test calls `routes::build_router` and drives it via
//! `tower::ServiceExt::oneshot` — no network I/O required.
//!
//! The router serves its own in-memory demo world.  The test-side
//! `demo_world()` is only an id source: both worlds are seeded from the
//! same stable ids, so carts and identity headers built here are valid
//! against the router's state.

use std::sync::Arc;

use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt; // oneshot
use uuid::Uuid;

use tfn_daemon::{routes, state};
use tfn_pricing::PricingPolicy;
use tfn_schemas::Caller;
use tfn_testkit::fixtures::demo_world;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fresh shared state over the in-memory demo world.
fn app_state() -> Arc<state::AppState> {
    Arc::new(state::AppState::demo(PricingPolicy::default()))
}

/// Drive the router with a single request and return (status, body_bytes).
async fn call(router: axum::Router, req: Request<axum::body::Body>) -> (StatusCode, bytes::Bytes) {
    let resp = router.oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    let body = resp
        .into_body()
        .collect()
        .await
        .expect("body collect failed")
        .to_bytes();
    (status, body)
}

/// Parse body bytes as a `serde_json::Value`.
fn parse_json(b: bytes::Bytes) -> serde_json::Value {
    serde_json::from_slice(&b).expect("body is not valid JSON")
}

/// A request carrying the gateway identity headers for `caller`.
fn authed(
    method: &str,
    uri: &str,
    caller: &Caller,
    body: Option<serde_json::Value>,
) -> Request<axum::body::Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(routes::HEADER_USER_ID, caller.user_id.to_string())
        .header(routes::HEADER_USER_ROLE, caller.role.as_str());
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(axum::body::Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    }
}

/// POST the demo cart as the demo customer and return the new order's id.
async fn place_demo_order(st: &Arc<state::AppState>) -> Uuid {
    let world = demo_world();
    let body = serde_json::to_value(world.cart()).expect("cart serializes");
    let req = authed("POST", "/v1/orders", &world.customer, Some(body));

    let (status, body) = call(routes::build_router(Arc::clone(st)), req).await;
    assert_eq!(status, StatusCode::CREATED);

    let json = parse_json(body);
    json["order"]["id"]
        .as_str()
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .expect("order id in response")
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_200_ok_true() {
    let router = routes::build_router(app_state());
    let req = Request::builder()
        .method("GET")
        .uri("/v1/health")
        .body(axum::body::Body::empty())
        .unwrap();

    let (status, body) = call(router, req).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    assert_eq!(json["ok"], true);
    assert_eq!(json["service"], "tfn-daemon");
}

// ---------------------------------------------------------------------------
// GET /v1/status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_reports_the_memory_backend() {
    let router = routes::build_router(app_state());
    let req = Request::builder()
        .method("GET")
        .uri("/v1/status")
        .body(axum::body::Body::empty())
        .unwrap();

    let (status, body) = call(router, req).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    assert_eq!(json["backend"], "memory");
    assert!(json["daemon_uptime_secs"].is_u64());
    assert!(json["started_at"].is_string());
}

// ---------------------------------------------------------------------------
// POST /v1/orders
// ---------------------------------------------------------------------------

#[tokio::test]
async fn placing_an_order_prices_from_the_catalog_not_the_client() {
    let st = app_state();
    let world = demo_world();

    // Smuggle money fields into the JSON body; they are not part of the
    // request schema and must not survive into the stored order.
    let mut body = serde_json::to_value(world.cart()).expect("cart serializes");
    body["subtotal"] = serde_json::json!(1);
    body["total"] = serde_json::json!(1);

    let req = authed("POST", "/v1/orders", &world.customer, Some(body));
    let (status, body) = call(routes::build_router(Arc::clone(&st)), req).await;
    assert_eq!(status, StatusCode::CREATED);

    let json = parse_json(body);
    assert_eq!(json["order"]["status"], "pending");
    assert_eq!(json["order"]["subtotal"], 2_950);
    assert_eq!(json["order"]["delivery_fee"], 299);
    assert_eq!(json["order"]["tax"], 236);
    assert_eq!(json["order"]["tip"], 300);

    // Item snapshots carry catalog prices; the naan's unit price includes
    // its chosen option.
    let items = json["items"].as_array().expect("items array");
    assert_eq!(items.len(), 2);
    let naan = items
        .iter()
        .find(|item| item["name"] == "Garlic Naan")
        .expect("naan line present");
    assert_eq!(naan["unit_price"], 550);

    // Exactly one tracking entry, written in the same transaction.
    let tracking = json["tracking"].as_array().expect("tracking array");
    assert_eq!(tracking.len(), 1);
    assert_eq!(tracking[0]["status"], "pending");
    assert_eq!(tracking[0]["message"], "Order placed");
}

#[tokio::test]
async fn an_empty_cart_is_refused_with_400() {
    let st = app_state();
    let world = demo_world();

    let mut body = serde_json::to_value(world.cart()).expect("cart serializes");
    body["items"] = serde_json::json!([]);

    let req = authed("POST", "/v1/orders", &world.customer, Some(body));
    let (status, body) = call(routes::build_router(st), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let json = parse_json(body);
    assert_eq!(json["kind"], "validation_error");
}

// ---------------------------------------------------------------------------
// Identity headers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn requests_without_identity_headers_get_401() {
    let st = app_state();
    let world = demo_world();

    let body = serde_json::to_value(world.cart()).expect("cart serializes");
    let req = Request::builder()
        .method("POST")
        .uri("/v1/orders")
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap();

    let (status, body) = call(routes::build_router(st), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let json = parse_json(body);
    assert_eq!(json["kind"], "authorization_error");
    assert_eq!(json["error"], "authentication required");
}

#[tokio::test]
async fn a_role_the_gateway_never_issues_gets_401() {
    let st = app_state();
    let world = demo_world();

    let req = Request::builder()
        .method("GET")
        .uri(format!("/v1/orders/{}", Uuid::new_v4()))
        .header(routes::HEADER_USER_ID, world.customer.user_id.to_string())
        .header(routes::HEADER_USER_ROLE, "owner")
        .body(axum::body::Body::empty())
        .unwrap();

    let (status, body) = call(routes::build_router(st), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(parse_json(body)["kind"], "authorization_error");
}

// ---------------------------------------------------------------------------
// GET /v1/orders/:order_id
// ---------------------------------------------------------------------------

#[tokio::test]
async fn a_stranger_reading_someone_elses_order_gets_403() {
    let st = app_state();
    let world = demo_world();
    let order_id = place_demo_order(&st).await;

    let req = authed(
        "GET",
        &format!("/v1/orders/{order_id}"),
        &world.stranger,
        None,
    );
    let (status, body) = call(routes::build_router(st), req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(parse_json(body)["kind"], "authorization_error");
}

#[tokio::test]
async fn an_unknown_order_id_reads_as_404() {
    let st = app_state();
    let world = demo_world();

    let req = authed(
        "GET",
        &format!("/v1/orders/{}", Uuid::new_v4()),
        &world.customer,
        None,
    );
    let (status, body) = call(routes::build_router(st), req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(parse_json(body)["kind"], "not_found");
}

// ---------------------------------------------------------------------------
// POST /v1/orders/:order_id/status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn the_owner_confirms_once_and_a_resubmission_conflicts() {
    let st = app_state();
    let world = demo_world();
    let order_id = place_demo_order(&st).await;

    let confirm = serde_json::json!({"status": "confirmed"});

    let req = authed(
        "POST",
        &format!("/v1/orders/{order_id}/status"),
        &world.owner,
        Some(confirm.clone()),
    );
    let (status, body) = call(routes::build_router(Arc::clone(&st)), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body)["order"]["status"], "confirmed");

    // Same submission again: the order is no longer pending, so the
    // transition is refused and nothing further is written.
    let req = authed(
        "POST",
        &format!("/v1/orders/{order_id}/status"),
        &world.owner,
        Some(confirm),
    );
    let (status, body) = call(routes::build_router(st), req).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(parse_json(body)["kind"], "state_error");
}

#[tokio::test]
async fn the_customer_cannot_move_the_order_and_gets_403() {
    let st = app_state();
    let world = demo_world();
    let order_id = place_demo_order(&st).await;

    let req = authed(
        "POST",
        &format!("/v1/orders/{order_id}/status"),
        &world.customer,
        Some(serde_json::json!({"status": "confirmed"})),
    );
    let (status, body) = call(routes::build_router(st), req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(parse_json(body)["kind"], "authorization_error");
}

// ---------------------------------------------------------------------------
// GET /v1/orders/:order_id/tracking
// ---------------------------------------------------------------------------

#[tokio::test]
async fn tracking_supports_both_sort_orders_and_rejects_others() {
    let st = app_state();
    let world = demo_world();
    let order_id = place_demo_order(&st).await;

    let req = authed(
        "POST",
        &format!("/v1/orders/{order_id}/status"),
        &world.owner,
        Some(serde_json::json!({"status": "confirmed"})),
    );
    let (status, _) = call(routes::build_router(Arc::clone(&st)), req).await;
    assert_eq!(status, StatusCode::OK);

    // Default is oldest first.
    let req = authed(
        "GET",
        &format!("/v1/orders/{order_id}/tracking"),
        &world.customer,
        None,
    );
    let (status, body) = call(routes::build_router(Arc::clone(&st)), req).await;
    assert_eq!(status, StatusCode::OK);
    let asc = parse_json(body);
    let asc = asc.as_array().expect("tracking array");
    assert_eq!(asc.len(), 2);
    assert_eq!(asc[0]["message"], "Order placed");
    assert_eq!(asc[1]["status"], "confirmed");

    // desc reverses.
    let req = authed(
        "GET",
        &format!("/v1/orders/{order_id}/tracking?order=desc"),
        &world.customer,
        None,
    );
    let (status, body) = call(routes::build_router(Arc::clone(&st)), req).await;
    assert_eq!(status, StatusCode::OK);
    let desc = parse_json(body);
    let desc = desc.as_array().expect("tracking array");
    assert_eq!(desc[0]["status"], "confirmed");
    assert_eq!(desc[1]["message"], "Order placed");

    // Anything else is refused before the ledger is asked.
    let req = authed(
        "GET",
        &format!("/v1/orders/{order_id}/tracking?order=sideways"),
        &world.customer,
        None,
    );
    let (status, body) = call(routes::build_router(st), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse_json(body)["kind"], "validation_error");
}
