//! Shared runtime state for tfn-daemon.
//!
//! `AppState` is built once in `main.rs` (or by a test) and handed to every
//! handler as `State<Arc<AppState>>`.  The two constructors cover the two
//! deployment shapes: Postgres-backed, and the in-memory demo world used
//! when no database is configured.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tfn_db::{PgDirectory, PgOrderStore};
use tfn_ledger::OrderLedger;
use tfn_pricing::PricingPolicy;

// ---------------------------------------------------------------------------
// BuildInfo
// ---------------------------------------------------------------------------

/// Static build metadata included in health responses.
#[derive(Clone, Debug)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Cloneable (Arc) handle shared across all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// The order engine; owns validation, pricing, and transitions.
    pub ledger: Arc<OrderLedger>,
    /// Static build metadata.
    pub build: BuildInfo,
    /// Which storage backend the ledger was wired to ("memory" | "postgres").
    pub backend: &'static str,
    /// When this state was built; `/v1/status` derives uptime from it.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Postgres-backed state: directory reads and order writes both go
    /// through the given pool.
    pub fn postgres(pool: PgPool, policy: PricingPolicy) -> Self {
        let directory = Arc::new(PgDirectory::new(pool.clone()));
        let ledger = OrderLedger::new(
            directory.clone(),
            directory.clone(),
            directory,
            Arc::new(PgOrderStore::new(pool)),
            policy,
        );
        Self::wrap(ledger, "postgres")
    }

    /// In-memory state over the seeded demo world.  No IO; every boot
    /// starts from the same restaurants, menus, and addresses.
    pub fn demo(policy: PricingPolicy) -> Self {
        let world = tfn_testkit::fixtures::demo_world();
        Self::wrap(world.ledger_with_policy(policy), "memory")
    }

    fn wrap(ledger: OrderLedger, backend: &'static str) -> Self {
        Self {
            ledger: Arc::new(ledger),
            build: BuildInfo {
                service: "tfn-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
            backend,
            started_at: Utc::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        (Utc::now() - self.started_at).num_seconds().max(0) as u64
    }
}
