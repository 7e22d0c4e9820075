//! Order status vocabulary.
//!
//! The workflow itself (which status may follow which) lives in
//! `tfn-lifecycle`; this module only defines the tagged set and its
//! canonical string form, shared by the JSON wire format and the
//! database `status` columns.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// String form is `snake_case` and identical across serde and
/// [`OrderStatus::as_str`], so a value stored by the database layer
/// round-trips through the HTTP layer unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    ReadyForPickup,
    PickedUp,
    OnTheWay,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Every status, in workflow order.  Terminal states last.
    pub const ALL: [OrderStatus; 8] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::ReadyForPickup,
        OrderStatus::PickedUp,
        OrderStatus::OnTheWay,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::ReadyForPickup => "ready_for_pickup",
            OrderStatus::PickedUp => "picked_up",
            OrderStatus::OnTheWay => "on_the_way",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<OrderStatus> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "preparing" => Some(OrderStatus::Preparing),
            "ready_for_pickup" => Some(OrderStatus::ReadyForPickup),
            "picked_up" => Some(OrderStatus::PickedUp),
            "on_the_way" => Some(OrderStatus::OnTheWay),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str_parse_roundtrip_for_every_status() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn parse_rejects_unknown() {
        assert_eq!(OrderStatus::parse("PENDING"), None);
        assert_eq!(OrderStatus::parse("refunded"), None);
        assert_eq!(OrderStatus::parse(""), None);
    }

    #[test]
    fn serde_string_form_matches_as_str() {
        for status in OrderStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            let back: OrderStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn only_delivered_and_cancelled_are_terminal() {
        for status in OrderStatus::ALL {
            let expect = matches!(status, OrderStatus::Delivered | OrderStatus::Cancelled);
            assert_eq!(status.is_terminal(), expect, "{status}");
        }
    }
}
