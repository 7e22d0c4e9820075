//! Error taxonomy for order operations.
//!
//! Six stable kinds; every failure an order operation can produce maps onto
//! exactly one of them.  The kind is machine-readable (`as_str` feeds the
//! wire `kind` field and HTTP status mapping); the message is for humans.
//! None of these are retried automatically — a persistence failure surfaces
//! to the caller, who decides.

use tfn_lifecycle::TransitionError;

// ---------------------------------------------------------------------------
// OrderErrorKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderErrorKind {
    /// Malformed or unprocessable input (empty cart, zero quantity, ...).
    Validation,
    /// A referenced entity does not exist — or must look like it doesn't
    /// (someone else's delivery address).
    NotFound,
    /// The entity exists but cannot take orders right now (inactive
    /// restaurant, unavailable or foreign menu item).
    Availability,
    /// Caller is not authenticated, or not permitted to act on this order.
    Authorization,
    /// The requested status transition is not legal from the current state.
    State,
    /// The storage layer failed; nothing was written.
    Persistence,
}

impl OrderErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderErrorKind::Validation => "validation_error",
            OrderErrorKind::NotFound => "not_found",
            OrderErrorKind::Availability => "availability_error",
            OrderErrorKind::Authorization => "authorization_error",
            OrderErrorKind::State => "state_error",
            OrderErrorKind::Persistence => "persistence_error",
        }
    }
}

// ---------------------------------------------------------------------------
// OrderError
// ---------------------------------------------------------------------------

/// A classified order-operation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderError {
    kind: OrderErrorKind,
    message: String,
}

impl OrderError {
    pub fn new(kind: OrderErrorKind, message: impl Into<String>) -> Self {
        OrderError {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> OrderErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(OrderErrorKind::Validation, message)
    }

    /// `what` names the missing entity, e.g. `"restaurant 1a2b…"`.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::new(OrderErrorKind::NotFound, format!("{} not found", what.into()))
    }

    pub fn availability(message: impl Into<String>) -> Self {
        Self::new(OrderErrorKind::Availability, message)
    }

    /// Caller identity missing entirely.
    pub fn unauthenticated() -> Self {
        Self::new(OrderErrorKind::Authorization, "authentication required")
    }

    /// Caller identity present but not permitted.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(OrderErrorKind::Authorization, message)
    }

    pub fn state(message: impl Into<String>) -> Self {
        Self::new(OrderErrorKind::State, message)
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::new(OrderErrorKind::Persistence, message)
    }

    pub fn from_transition(err: TransitionError) -> Self {
        Self::state(err.to_string())
    }
}

impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

impl std::error::Error for OrderError {}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tfn_schemas::OrderStatus;

    #[test]
    fn kind_strings_are_stable() {
        assert_eq!(OrderErrorKind::Validation.as_str(), "validation_error");
        assert_eq!(OrderErrorKind::NotFound.as_str(), "not_found");
        assert_eq!(OrderErrorKind::Availability.as_str(), "availability_error");
        assert_eq!(OrderErrorKind::Authorization.as_str(), "authorization_error");
        assert_eq!(OrderErrorKind::State.as_str(), "state_error");
        assert_eq!(OrderErrorKind::Persistence.as_str(), "persistence_error");
    }

    #[test]
    fn not_found_appends_suffix() {
        let err = OrderError::not_found("restaurant 42");
        assert_eq!(err.kind(), OrderErrorKind::NotFound);
        assert_eq!(err.message(), "restaurant 42 not found");
    }

    #[test]
    fn transition_error_maps_to_state_kind() {
        let terr = tfn_lifecycle::validate_transition(OrderStatus::Pending, OrderStatus::PickedUp)
            .unwrap_err();
        let err = OrderError::from_transition(terr);
        assert_eq!(err.kind(), OrderErrorKind::State);
        assert!(err.message().contains("pending"));
        assert!(err.message().contains("picked_up"));
    }

    #[test]
    fn display_carries_kind_and_message() {
        let err = OrderError::unauthenticated();
        assert_eq!(
            err.to_string(),
            "authorization_error: authentication required"
        );
    }
}
