//! tfn-ledger
//!
//! The order ledger: transactional order creation, role-gated status
//! transitions, and participant-gated reads over an append-only tracking
//! history.
//!
//! Layering:
//! - [`OrderLedger`] owns the business rules and their ordering
//! - Directory traits ([`RestaurantDirectory`], [`MenuCatalog`],
//!   [`AddressBook`]) are read-only seams to external systems
//! - [`OrderStore`] is the storage seam; it alone provides atomicity
//!   (Postgres in `tfn-db`, in-memory in `tfn-testkit`)
//! - Failures are classified once, in [`OrderError`], and mapped outward
//!   by the HTTP/CLI layers

mod error;
mod providers;
mod service;
mod store;

pub use error::{OrderError, OrderErrorKind};
pub use providers::{AddressBook, MenuCatalog, RestaurantDirectory};
pub use service::{OrderLedger, MAX_LINE_QUANTITY};
pub use store::{NewOrder, NewOrderItem, OrderStore, StatusChange, TrackingOrder};
