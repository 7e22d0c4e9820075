//! Axum router and all HTTP handlers for tfn-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers.  All handlers are `pub(crate)` so the scenario tests in
//! `tests/` can compose the router directly.
//!
//! Identity arrives as gateway-injected headers (`x-tiffin-user-id`,
//! `x-tiffin-user-role`).  Authentication itself happens upstream; a request
//! without a usable header pair is refused with 401 before any ledger call.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use tfn_ledger::{OrderError, OrderErrorKind, TrackingOrder};
use tfn_schemas::{Caller, CreateOrderRequest, Role, StatusChangeRequest};

use crate::{
    api_types::{ErrorBody, HealthResponse, StatusResponse},
    state::AppState,
};

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/status", get(status_handler))
        .route("/v1/orders", post(create_order))
        .route("/v1/orders/:order_id", get(order_detail))
        .route("/v1/orders/:order_id/status", post(update_status))
        .route("/v1/orders/:order_id/tracking", get(tracking))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Caller identity
// ---------------------------------------------------------------------------

/// Gateway-injected header carrying the authenticated user id (a UUID).
pub const HEADER_USER_ID: &str = "x-tiffin-user-id";
/// Gateway-injected header carrying the caller's role string.
pub const HEADER_USER_ROLE: &str = "x-tiffin-user-role";

/// Extract the caller from the identity headers.
///
/// Missing or malformed headers mean the request never passed the gateway,
/// which is 401 — distinct from the 403 the ledger produces when a known
/// caller is not permitted to touch an order.
fn caller_from_headers(headers: &HeaderMap) -> Result<Caller, ApiError> {
    let user_id = headers
        .get(HEADER_USER_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|raw| Uuid::parse_str(raw).ok());
    let role = headers
        .get(HEADER_USER_ROLE)
        .and_then(|v| v.to_str().ok())
        .and_then(Role::parse);

    match (user_id, role) {
        (Some(user_id), Some(role)) => Ok(Caller::new(user_id, role)),
        _ => Err(ApiError::Unauthenticated),
    }
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// A refused request, rendered as an [`ErrorBody`] with the matching HTTP
/// status.
pub(crate) enum ApiError {
    /// No usable identity headers; 401 before the ledger is consulted.
    Unauthenticated,
    /// A classified ledger failure; the status derives from the kind.
    Order(OrderError),
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::Order(err)
    }
}

/// Kind-to-status table.  Every caller that reaches the ledger carries an
/// identity, so ledger Authorization errors are always 403; 401 is issued
/// only by [`ApiError::Unauthenticated`] above.
fn http_status(kind: OrderErrorKind) -> StatusCode {
    match kind {
        OrderErrorKind::Validation => StatusCode::BAD_REQUEST,
        OrderErrorKind::NotFound => StatusCode::NOT_FOUND,
        OrderErrorKind::Availability => StatusCode::CONFLICT,
        OrderErrorKind::Authorization => StatusCode::FORBIDDEN,
        OrderErrorKind::State => StatusCode::CONFLICT,
        OrderErrorKind::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, err) = match self {
            ApiError::Unauthenticated => (StatusCode::UNAUTHORIZED, OrderError::unauthenticated()),
            ApiError::Order(err) => (http_status(err.kind()), err),
        };
        let body = ErrorBody {
            error: err.message().to_string(),
            kind: err.kind().as_str().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service.to_string(),
            version: st.build.version.to_string(),
        }),
    )
}

// ---------------------------------------------------------------------------
// GET /v1/status
// ---------------------------------------------------------------------------

pub(crate) async fn status_handler(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(StatusResponse {
            started_at: st.started_at,
            daemon_uptime_secs: st.uptime_secs(),
            backend: st.backend.to_string(),
        }),
    )
}

// ---------------------------------------------------------------------------
// POST /v1/orders
// ---------------------------------------------------------------------------

/// Place an order.  Validation, catalog pricing, and the transactional
/// insert all happen inside the ledger; success returns the hydrated
/// detail with 201.
pub(crate) async fn create_order(
    State(st): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Response, ApiError> {
    let caller = caller_from_headers(&headers)?;
    let detail = st.ledger.create_order(&caller, req).await?;
    info!(
        order_id = %detail.order.id,
        total_cents = detail.order.total().raw(),
        "order placed"
    );
    Ok((StatusCode::CREATED, Json(detail)).into_response())
}

// ---------------------------------------------------------------------------
// GET /v1/orders/:order_id
// ---------------------------------------------------------------------------

pub(crate) async fn order_detail(
    State(st): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(order_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let caller = caller_from_headers(&headers)?;
    let detail = st.ledger.order_detail(&caller, order_id).await?;
    Ok(Json(detail).into_response())
}

// ---------------------------------------------------------------------------
// POST /v1/orders/:order_id/status
// ---------------------------------------------------------------------------

/// Move an order along its lifecycle.  The ledger enforces ownership and
/// the transition table; refusals write nothing.
pub(crate) async fn update_status(
    State(st): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(order_id): Path<Uuid>,
    Json(req): Json<StatusChangeRequest>,
) -> Result<Response, ApiError> {
    let caller = caller_from_headers(&headers)?;
    let target = req.status;
    let detail = st.ledger.update_status(&caller, order_id, req).await?;
    info!(order_id = %order_id, status = target.as_str(), "status updated");
    Ok(Json(detail).into_response())
}

// ---------------------------------------------------------------------------
// GET /v1/orders/:order_id/tracking
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct TrackingQuery {
    /// "asc" (oldest first, the default) or "desc" (newest first).
    #[serde(default)]
    order: Option<String>,
}

pub(crate) async fn tracking(
    State(st): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(order_id): Path<Uuid>,
    Query(query): Query<TrackingQuery>,
) -> Result<Response, ApiError> {
    let caller = caller_from_headers(&headers)?;
    let order = tracking_order(query.order.as_deref())?;
    let updates = st.ledger.tracking(&caller, order_id, order).await?;
    Ok(Json(updates).into_response())
}

fn tracking_order(raw: Option<&str>) -> Result<TrackingOrder, ApiError> {
    match raw {
        None | Some("asc") => Ok(TrackingOrder::OldestFirst),
        Some("desc") => Ok(TrackingOrder::NewestFirst),
        Some(other) => Err(ApiError::Order(OrderError::validation(format!(
            "unknown tracking order {other:?}; use \"asc\" or \"desc\""
        )))),
    }
}
