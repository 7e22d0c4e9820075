//! tfn-testkit
//!
//! Deterministic in-memory doubles for the order engine:
//! - [`InMemoryDirectory`] — restaurants, menus, and addresses behind the
//!   ledger's provider traits, mutable mid-test to model catalog edits
//! - [`InMemoryOrderStore`] — the full `OrderStore` contract under a single
//!   mutex, including the check-then-write transition precondition and a
//!   failure-injection toggle for persistence paths
//! - [`fixtures`] — a small demo world with stable ids
//!
//! No randomness beyond fresh row ids, no IO.  The multi-crate scenario
//! tests for the engine live in this crate's `tests/` directory.

mod directory;
mod memory_store;

pub mod fixtures;

pub use directory::InMemoryDirectory;
pub use memory_store::InMemoryOrderStore;
