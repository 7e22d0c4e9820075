//! tfn-pricing
//!
//! Cart pricing for order creation:
//! - Unit prices resolved from the catalog snapshot (base price + chosen
//!   option deltas); the request never carries prices
//! - subtotal = Σ(unit price × quantity), integer cents, checked arithmetic
//! - Flat delivery fee, waived when the subtotal strictly exceeds the
//!   waiver threshold
//! - Sales tax in basis points, rounded half-up at cent scale
//!
//! Pure deterministic logic.  No IO, no clock, no randomness — the same
//! snapshot, cart, and policy always price to the same `Quote`.

mod engine;
mod types;

pub use engine::{delivery_fee_for, price_cart, tax_for};
pub use types::{CatalogSnapshot, PricedLine, PricingError, PricingPolicy, Quote};
