//! Process settings, read once at startup.
//!
//! Everything is plain environment variables; there is no config file. The
//! parsing core takes a lookup closure so tests never touch the process
//! environment.

use std::net::SocketAddr;

use anyhow::{bail, Context, Result};

use tfn_pricing::PricingPolicy;
use tfn_schemas::Cents;

pub const ENV_DATABASE_URL: &str = "TFN_DATABASE_URL";
pub const ENV_DAEMON_ADDR: &str = "TFN_DAEMON_ADDR";
pub const ENV_TAX_RATE_BPS: &str = "TFN_TAX_RATE_BPS";
pub const ENV_FREE_DELIVERY_THRESHOLD_CENTS: &str = "TFN_FREE_DELIVERY_THRESHOLD_CENTS";

/// A tax rate above 100% is a typo, not a policy.
const MAX_TAX_RATE_BPS: u32 = 10_000;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Daemon bind address. Defaults to loopback.
    pub daemon_addr: SocketAddr,
    /// Postgres URL. `None` means the process runs against the in-memory
    /// demo world instead of a database.
    pub database_url: Option<String>,
    /// Pricing knobs; unset variables keep the stock policy.
    pub pricing: PricingPolicy,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Settings> {
        Settings::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parsing core. `lookup` returns the raw value for a variable name, or
    /// `None` when unset; absent values fall back to defaults, present but
    /// malformed values are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Settings> {
        let daemon_addr = match lookup(ENV_DAEMON_ADDR) {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("{ENV_DAEMON_ADDR} is not a socket address: {raw:?}"))?,
            None => default_daemon_addr(),
        };

        let database_url = lookup(ENV_DATABASE_URL).filter(|url| !url.trim().is_empty());

        let mut pricing = PricingPolicy::default();
        if let Some(raw) = lookup(ENV_TAX_RATE_BPS) {
            let bps: u32 = raw
                .parse()
                .with_context(|| format!("{ENV_TAX_RATE_BPS} is not an integer: {raw:?}"))?;
            if bps > MAX_TAX_RATE_BPS {
                bail!("{ENV_TAX_RATE_BPS} must be at most {MAX_TAX_RATE_BPS}, got {bps}");
            }
            pricing.tax_rate_bps = bps;
        }
        if let Some(raw) = lookup(ENV_FREE_DELIVERY_THRESHOLD_CENTS) {
            let cents: i64 = raw.parse().with_context(|| {
                format!("{ENV_FREE_DELIVERY_THRESHOLD_CENTS} is not an integer: {raw:?}")
            })?;
            if cents < 0 {
                bail!("{ENV_FREE_DELIVERY_THRESHOLD_CENTS} must be non-negative, got {cents}");
            }
            pricing.free_delivery_threshold = Cents::new(cents);
        }

        Ok(Settings {
            daemon_addr,
            database_url,
            pricing,
        })
    }
}

pub fn default_daemon_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8180))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings.daemon_addr, default_daemon_addr());
        assert!(settings.database_url.is_none());
        assert_eq!(settings.pricing.tax_rate_bps, 800);
        assert_eq!(settings.pricing.free_delivery_threshold, Cents::new(3_500));
    }

    #[test]
    fn explicit_values_override_defaults() {
        let settings = Settings::from_lookup(lookup_from(&[
            (ENV_DAEMON_ADDR, "0.0.0.0:9000"),
            (ENV_DATABASE_URL, "postgres://tiffin@localhost/tiffin"),
            (ENV_TAX_RATE_BPS, "925"),
            (ENV_FREE_DELIVERY_THRESHOLD_CENTS, "5000"),
        ]))
        .unwrap();

        assert_eq!(settings.daemon_addr.port(), 9000);
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://tiffin@localhost/tiffin")
        );
        assert_eq!(settings.pricing.tax_rate_bps, 925);
        assert_eq!(settings.pricing.free_delivery_threshold, Cents::new(5_000));
    }

    #[test]
    fn a_blank_database_url_counts_as_unset() {
        let settings =
            Settings::from_lookup(lookup_from(&[(ENV_DATABASE_URL, "   ")])).unwrap();
        assert!(settings.database_url.is_none());
    }

    #[test]
    fn malformed_values_are_errors_not_defaults() {
        assert!(Settings::from_lookup(lookup_from(&[(ENV_DAEMON_ADDR, "not-an-addr")])).is_err());
        assert!(Settings::from_lookup(lookup_from(&[(ENV_TAX_RATE_BPS, "8%")])).is_err());
        assert!(
            Settings::from_lookup(lookup_from(&[(ENV_FREE_DELIVERY_THRESHOLD_CENTS, "-1")]))
                .is_err()
        );
    }

    #[test]
    fn an_absurd_tax_rate_is_rejected() {
        let err = Settings::from_lookup(lookup_from(&[(ENV_TAX_RATE_BPS, "10001")]))
            .unwrap_err()
            .to_string();
        assert!(err.contains("at most"), "got: {err}");
    }
}
