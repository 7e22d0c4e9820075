//! Postgres backing for the order engine.
//!
//! [`PgOrderStore`] and [`PgDirectory`] are the production implementations
//! of the `tfn-ledger` seams; the free functions here cover pool setup,
//! migrations, and operational status checks for the CLI and daemon.

use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};

mod directory;
mod seed;
mod store;

pub use directory::PgDirectory;
pub use seed::{seed_demo, DemoSeed};
pub use store::PgOrderStore;

pub const ENV_DB_URL: &str = "TFN_DATABASE_URL";

/// Connect to Postgres with the daemon/CLI pool sizing.
pub async fn connect(url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(url)
        .await
        .context("failed to connect to Postgres")?;

    Ok(pool)
}

/// Connect to Postgres using TFN_DATABASE_URL.
pub async fn connect_from_env() -> Result<PgPool> {
    let url =
        std::env::var(ENV_DB_URL).with_context(|| format!("missing env var {ENV_DB_URL}"))?;
    connect(&url).await
}

/// Run embedded SQLx migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}

/// Simple status query (connectivity + schema presence).
pub async fn status(pool: &PgPool) -> Result<DbStatus> {
    let (one,): (i32,) = sqlx::query_as::<_, (i32,)>("select 1")
        .fetch_one(pool)
        .await
        .context("status connectivity query failed")?;
    let ok = one == 1;

    let (exists,): (bool,) = sqlx::query_as::<_, (bool,)>(
        r#"
        select exists (
            select 1
            from information_schema.tables
            where table_schema='public' and table_name='orders'
        )
        "#,
    )
    .fetch_one(pool)
    .await
    .context("status table-exists query failed")?;

    Ok(DbStatus {
        ok,
        has_orders_table: exists,
    })
}

#[derive(Debug, Clone)]
pub struct DbStatus {
    pub ok: bool,
    pub has_orders_table: bool,
}

/// Total number of orders on file.  The CLI consults this before reseeding
/// the demo catalog into a database that already carries real traffic.
pub async fn count_orders(pool: &PgPool) -> Result<i64> {
    let (n,): (i64,) = sqlx::query_as::<_, (i64,)>("select count(*) from orders")
        .fetch_one(pool)
        .await
        .context("order count query failed")?;
    Ok(n)
}
