//! tfn — operations CLI for the order platform.
//!
//! Commands talk straight to Postgres through the same `tfn-db` stores the
//! daemon uses; there is no HTTP hop.  Output is stable `key=value` lines
//! so shell pipelines can scrape it.

use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use tfn_db::{PgDirectory, PgOrderStore};
use tfn_ledger::{OrderLedger, TrackingOrder};
use tfn_schemas::{
    Caller, CreateOrderRequest, GeoPoint, OrderDetail, OrderStatus, Role, StatusChangeRequest,
    TrackingUpdate,
};

#[derive(Parser)]
#[command(name = "tfn")]
#[command(about = "Tiffin order platform CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database commands
    Db {
        #[command(subcommand)]
        cmd: DbCmd,
    },

    /// Order lifecycle commands
    Order {
        #[command(subcommand)]
        cmd: OrderCmd,
    },
}

#[derive(Subcommand)]
enum DbCmd {
    Status,

    /// Apply SQL migrations (create-if-not-exists; safe to re-run).
    Migrate,

    /// Upsert the demo catalog under its well-known ids. Guardrail: refuses
    /// when orders already reference the catalog unless --yes is provided.
    SeedDemo {
        /// Acknowledge you are reseeding a database that already holds orders.
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum OrderCmd {
    /// Place an order from a CreateOrderRequest JSON payload.
    Create {
        /// Customer user id (the caller).
        #[arg(long)]
        customer: String,

        /// Request JSON string (avoid if possible; shell quoting is annoying)
        #[arg(long, conflicts_with = "cart_file")]
        cart: Option<String>,

        /// Path to a request JSON file (recommended on Windows)
        #[arg(long = "cart-file", conflicts_with = "cart")]
        cart_file: Option<String>,
    },

    /// Move an order to a new status as the acting user.
    Status {
        /// Order id
        #[arg(long)]
        order_id: String,

        /// Acting user id
        #[arg(long)]
        user: String,

        /// Acting user role (customer | restaurant_owner | courier | admin)
        #[arg(long, default_value = "restaurant_owner")]
        role: String,

        /// Target status (confirmed, preparing, ready_for_pickup, picked_up,
        /// on_the_way, delivered, cancelled)
        #[arg(long)]
        to: String,

        /// Tracking message override (blank falls back to the stock line)
        #[arg(long)]
        message: Option<String>,

        /// Estimated delivery, minutes from now
        #[arg(long)]
        eta_minutes: Option<i64>,

        /// Courier latitude (requires --lon)
        #[arg(long, requires = "lon")]
        lat: Option<f64>,

        /// Courier longitude (requires --lat)
        #[arg(long, requires = "lat")]
        lon: Option<f64>,
    },

    /// Print one order with its item snapshots and tracking history.
    Show {
        /// Order id
        #[arg(long)]
        order_id: String,

        /// Acting user id
        #[arg(long)]
        user: String,

        #[arg(long, default_value = "customer")]
        role: String,
    },

    /// Print an order's tracking history.
    Track {
        /// Order id
        #[arg(long)]
        order_id: String,

        /// Acting user id
        #[arg(long)]
        user: String,

        #[arg(long, default_value = "customer")]
        role: String,

        /// Newest entry first (default is oldest first)
        #[arg(long, default_value_t = false)]
        desc: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env.local if present (dev convenience).
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Db { cmd } => match cmd {
            DbCmd::Status => {
                let pool = tfn_db::connect_from_env().await?;
                let s = tfn_db::status(&pool).await?;
                println!("db_ok={} has_orders_table={}", s.ok, s.has_orders_table);
            }

            DbCmd::Migrate => {
                let pool = tfn_db::connect_from_env().await?;
                tfn_db::migrate(&pool).await?;
                println!("migrations_applied=true");
            }

            DbCmd::SeedDemo { yes } => {
                let pool = tfn_db::connect_from_env().await?;
                tfn_db::migrate(&pool).await?;

                // Guardrail: live orders reference catalog rows by id, so
                // reseeding under them is an explicit operator decision.
                let n = tfn_db::count_orders(&pool).await?;
                if n > 0 && !yes {
                    anyhow::bail!(
                        "REFUSING SEED: {} existing order(s) reference this catalog. Re-run with: `tfn db seed-demo --yes`",
                        n
                    );
                }

                let seed = tfn_db::seed_demo(&pool).await?;
                println!("seeded=true");
                println!("customer_id={}", seed.customer_id);
                println!("owner_id={}", seed.owner_id);
                println!("restaurant_id={}", seed.restaurant_id);
                println!("address_id={}", seed.address_id);
                println!("curry_id={}", seed.curry_id);
                println!("naan_id={}", seed.naan_id);
                println!("extra_cheese_id={}", seed.extra_cheese_id);
            }
        },

        Commands::Order { cmd } => match cmd {
            OrderCmd::Create {
                customer,
                cart,
                cart_file,
            } => {
                // Parse locally before dialing the database.
                let req = load_cart(cart, cart_file)?;
                let customer_id = Uuid::parse_str(&customer).context("invalid customer uuid")?;
                let caller = Caller::new(customer_id, Role::Customer);

                let ledger = ledger_from_env().await?;
                let detail = ledger.create_order(&caller, req).await?;
                print_detail(&detail);
            }

            OrderCmd::Status {
                order_id,
                user,
                role,
                to,
                message,
                eta_minutes,
                lat,
                lon,
            } => {
                let caller = parse_caller(&user, &role)?;
                let order_uuid = Uuid::parse_str(&order_id).context("invalid order_id uuid")?;
                let status =
                    OrderStatus::parse(&to).with_context(|| format!("unknown status {to:?}"))?;

                let req = StatusChangeRequest {
                    status,
                    message,
                    location: match (lat, lon) {
                        (Some(latitude), Some(longitude)) => Some(GeoPoint {
                            latitude,
                            longitude,
                        }),
                        _ => None,
                    },
                    estimated_delivery_at: eta_minutes.map(|m| Utc::now() + Duration::minutes(m)),
                };

                let ledger = ledger_from_env().await?;
                let detail = ledger.update_status(&caller, order_uuid, req).await?;
                print_detail(&detail);
            }

            OrderCmd::Show {
                order_id,
                user,
                role,
            } => {
                let caller = parse_caller(&user, &role)?;
                let order_uuid = Uuid::parse_str(&order_id).context("invalid order_id uuid")?;

                let ledger = ledger_from_env().await?;
                let detail = ledger.order_detail(&caller, order_uuid).await?;
                print_detail(&detail);
            }

            OrderCmd::Track {
                order_id,
                user,
                role,
                desc,
            } => {
                let caller = parse_caller(&user, &role)?;
                let order_uuid = Uuid::parse_str(&order_id).context("invalid order_id uuid")?;
                let sort = if desc {
                    TrackingOrder::NewestFirst
                } else {
                    TrackingOrder::OldestFirst
                };

                let ledger = ledger_from_env().await?;
                let updates = ledger.tracking(&caller, order_uuid, sort).await?;
                for update in &updates {
                    print_update(update);
                }
            }
        },
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();
}

/// Ledger over the Postgres stores, with pricing knobs from the environment.
async fn ledger_from_env() -> Result<OrderLedger> {
    let settings = tfn_config::Settings::from_env()?;
    let pool = tfn_db::connect_from_env().await?;
    tracing::debug!("connected to Postgres");

    let directory = Arc::new(PgDirectory::new(pool.clone()));
    Ok(OrderLedger::new(
        directory.clone(),
        directory.clone(),
        directory,
        Arc::new(PgOrderStore::new(pool)),
        settings.pricing,
    ))
}

fn parse_caller(user: &str, role: &str) -> Result<Caller> {
    let user_id = Uuid::parse_str(user).context("invalid user uuid")?;
    let role = Role::parse(role).with_context(|| format!("unknown role {role:?}"))?;
    Ok(Caller::new(user_id, role))
}

fn load_cart(cart: Option<String>, cart_file: Option<String>) -> Result<CreateOrderRequest> {
    if let Some(p) = cart_file {
        // Read raw bytes to handle UTF-8 BOM cleanly on Windows.
        let bytes = fs::read(&p).with_context(|| format!("read cart-file failed: {}", p))?;
        let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(&bytes);

        let raw = String::from_utf8(bytes.to_vec()).context("cart-file must be UTF-8 text")?;
        let req = serde_json::from_str(raw.trim())
            .context("cart-file must contain a valid order request")?;
        return Ok(req);
    }

    let raw = cart.context("must provide --cart or --cart-file")?;
    let req =
        serde_json::from_str(raw.trim()).context("--cart must be a valid order request")?;
    Ok(req)
}

fn print_detail(detail: &OrderDetail) {
    let order = &detail.order;
    println!("order_id={}", order.id);
    println!("status={}", order.status.as_str());
    println!("customer_id={}", order.customer_id);
    println!("restaurant_id={}", order.restaurant_id);
    println!("subtotal_cents={}", order.subtotal.raw());
    println!("delivery_fee_cents={}", order.delivery_fee.raw());
    println!("tax_cents={}", order.tax.raw());
    println!("tip_cents={}", order.tip.raw());
    println!("total_cents={}", order.total().raw());
    println!(
        "estimated_delivery_at={}",
        opt_dt(&order.estimated_delivery_at)
    );
    println!("actual_delivery_at={}", opt_dt(&order.actual_delivery_at));
    println!("created_at={}", order.created_at.to_rfc3339());

    for item in &detail.items {
        println!(
            "item quantity={} unit_price_cents={} line_total_cents={} name={:?}",
            item.quantity,
            item.unit_price.raw(),
            item.line_total().raw(),
            item.name
        );
    }
    for update in &detail.tracking {
        print_update(update);
    }
}

fn print_update(update: &TrackingUpdate) {
    match update.location {
        Some(loc) => println!(
            "update created_at={} status={} lat={} lon={} message={:?}",
            update.created_at.to_rfc3339(),
            update.status.as_str(),
            loc.latitude,
            loc.longitude,
            update.message
        ),
        None => println!(
            "update created_at={} status={} message={:?}",
            update.created_at.to_rfc3339(),
            update.status.as_str(),
            update.message
        ),
    }
}

fn opt_dt(dt: &Option<chrono::DateTime<Utc>>) -> String {
    dt.as_ref()
        .map(|d| d.to_rfc3339())
        .unwrap_or_else(|| "".to_string())
}
