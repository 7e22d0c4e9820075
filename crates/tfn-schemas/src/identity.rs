//! Caller identity as delivered by the identity gateway.
//!
//! Authentication happens upstream; the engine only ever sees an
//! already-authenticated caller id plus its role.  Authorization inside the
//! engine is ownership-based (customer of the order, owner of the
//! restaurant) — the role travels with the caller because the gateway
//! supplies it, not because the engine branches on it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    RestaurantOwner,
    Courier,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::RestaurantOwner => "restaurant_owner",
            Role::Courier => "courier",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "customer" => Some(Role::Customer),
            "restaurant_owner" => Some(Role::RestaurantOwner),
            "courier" => Some(Role::Courier),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// An authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Caller { user_id, role }
    }
}
