//! tfn-schemas
//!
//! Shared domain and wire types for the Tiffin order platform:
//! - Money as integer cents (`Cents`) — never floats
//! - Order status vocabulary (`OrderStatus`)
//! - Caller identity as supplied by the identity gateway
//! - Read-only records from the restaurant/catalog/address directories
//! - The order aggregate and its append-only tracking entries
//! - Request payloads accepted by the daemon and CLI
//!
//! All monetary values serialize as plain integers at cent scale; all
//! timestamps are UTC. This crate holds types only — no IO, no policy.

mod directory;
mod identity;
mod money;
mod order;
mod requests;
mod status;

pub use directory::{Address, MenuItem, MenuItemOption, Restaurant};
pub use identity::{Caller, Role};
pub use money::Cents;
pub use order::{ChosenOption, GeoPoint, Order, OrderDetail, OrderItem, TrackingUpdate};
pub use requests::{CartLine, CreateOrderRequest, StatusChangeRequest};
pub use status::OrderStatus;
