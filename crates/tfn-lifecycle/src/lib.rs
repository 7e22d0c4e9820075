//! tfn-lifecycle
//!
//! # Design
//!
//! The order workflow as one central transition table.  Every status write
//! anywhere in the system is validated through [`validate_transition`];
//! nothing else may decide what follows what.  The table is code, not
//! configuration — changing the workflow is a reviewed change here, with
//! the tests below as the contract.
//!
//! # State diagram
//!
//! ```text
//!  pending ──► confirmed ──► preparing ──► ready_for_pickup
//!     │            │             │                │
//!     ▼            ▼             ▼                ▼
//!  cancelled   cancelled     cancelled        picked_up ──► on_the_way ──► delivered
//! ```
//!
//! `delivered` and `cancelled` are terminal: no event, role, or retry makes
//! a terminal order move again.  Re-submitting a transition that already
//! happened (e.g. confirming a confirmed order) is rejected the same way —
//! the table has no self-loops, so callers see the failure instead of a
//! silent dedupe.
//!
//! Storage-free and deterministic; concurrency is the storage layer's
//! problem (it re-checks the current status inside its transaction).

use tfn_schemas::OrderStatus;

// ---------------------------------------------------------------------------
// Transition table
// ---------------------------------------------------------------------------

/// The statuses an order in `from` may move to.  Empty for terminal states.
pub fn allowed_transitions(from: OrderStatus) -> &'static [OrderStatus] {
    use OrderStatus::*;
    match from {
        Pending => &[Confirmed, Cancelled],
        Confirmed => &[Preparing, Cancelled],
        Preparing => &[ReadyForPickup, Cancelled],
        ReadyForPickup => &[PickedUp],
        PickedUp => &[OnTheWay],
        OnTheWay => &[Delivered],
        Delivered | Cancelled => &[],
    }
}

/// `true` if the table permits `from -> to`.
pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    allowed_transitions(from).contains(&to)
}

/// Validate `from -> to`, returning the rejected pair on failure.
pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> Result<(), TransitionError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(TransitionError { from, to })
    }
}

// ---------------------------------------------------------------------------
// TransitionError
// ---------------------------------------------------------------------------

/// Returned when a requested transition is not in the table.
///
/// Nothing may be written when this fires: the caller surfaces it and the
/// order (and its tracking history) stays exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionError {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.from.is_terminal() {
            write!(
                f,
                "illegal status transition: {} -> {} ({} is terminal)",
                self.from, self.to, self.from
            )
        } else {
            write!(f, "illegal status transition: {} -> {}", self.from, self.to)
        }
    }
}

impl std::error::Error for TransitionError {}

// ---------------------------------------------------------------------------
// Default tracking messages
// ---------------------------------------------------------------------------

/// Human-readable tracking message used when the caller supplies none.
pub fn default_message(to: OrderStatus) -> &'static str {
    match to {
        OrderStatus::Pending => "Order placed",
        OrderStatus::Confirmed => "Order confirmed by the restaurant",
        OrderStatus::Preparing => "Order is being prepared",
        OrderStatus::ReadyForPickup => "Order is ready for pickup",
        OrderStatus::PickedUp => "Order has been picked up",
        OrderStatus::OnTheWay => "Order is on the way",
        OrderStatus::Delivered => "Order delivered",
        OrderStatus::Cancelled => "Order cancelled",
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
