//! Runtime configuration.
//!
//! [`EngineConfig`] carries every tunable the signal engine uses and is
//! injected into it; [`Config`] adds the process level settings read from
//! the environment.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use chrono::Duration;
use eyre::{Error, Result};
use log::warn;

use crate::signal::{ConfidenceThresholds, FeeSchedule, GasTable, TagThresholds};

/// Default assumed trade size in USD
pub const DEFAULT_NOTIONAL_USD: f64 = 100_000.0;
/// Default max pool snapshot age in seconds
pub const DEFAULT_FRESHNESS_WINDOW_SECS: i64 = 700;
/// Default CEX taker fee in bps
pub const DEFAULT_CEX_FEE_BPS: i64 = 10;
/// Default `imbalance_signal` bar
pub const DEFAULT_IMBALANCE_SIGNAL_RATIO: f64 = 0.45;
/// Default HTTP listen address
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
/// Default max Postgres connections
pub const DEFAULT_DB_POOL_SIZE: usize = 15;

/// Tunables for reconciliation, costing and scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Assumed trade size in USD
    pub notional_usd: f64,
    /// Max pool snapshot age
    pub freshness_window: Duration,
    /// Max CEX snapshot age, `None` for unbounded
    pub cex_max_age: Option<Duration>,
    /// CEX taker fee
    pub cex_fee_bps: i64,
    /// Pool fee inference rules
    pub fee_schedule: FeeSchedule,
    /// Per-chain gas costs
    pub gas: GasTable,
    /// Confidence tier bars
    pub confidence: ConfidenceThresholds,
    /// Tag bars
    pub tags: TagThresholds,
    /// Spread feed flags pools whose balance ratio is below this
    pub imbalance_signal_ratio: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            notional_usd: DEFAULT_NOTIONAL_USD,
            freshness_window: Duration::seconds(DEFAULT_FRESHNESS_WINDOW_SECS),
            cex_max_age: None,
            cex_fee_bps: DEFAULT_CEX_FEE_BPS,
            fee_schedule: FeeSchedule::default(),
            gas: GasTable::default(),
            confidence: ConfidenceThresholds::default(),
            tags: TagThresholds::default(),
            imbalance_signal_ratio: DEFAULT_IMBALANCE_SIGNAL_RATIO,
        }
    }
}

impl EngineConfig {
    /// Override the trade size
    #[must_use]
    pub fn with_notional_usd(mut self, notional_usd: f64) -> Self {
        self.notional_usd = notional_usd;
        self
    }

    /// Override the pool freshness window
    #[must_use]
    pub fn with_freshness_window(mut self, freshness_window: Duration) -> Self {
        self.freshness_window = freshness_window;
        self
    }

    /// Bound (or unbound) CEX snapshot age
    #[must_use]
    pub fn with_cex_max_age(mut self, cex_max_age: Option<Duration>) -> Self {
        self.cex_max_age = cex_max_age;
        self
    }

    /// Override the CEX fee
    #[must_use]
    pub fn with_cex_fee_bps(mut self, cex_fee_bps: i64) -> Self {
        self.cex_fee_bps = cex_fee_bps;
        self
    }

    /// Replace the fee inference rules
    #[must_use]
    pub fn with_fee_schedule(mut self, fee_schedule: FeeSchedule) -> Self {
        self.fee_schedule = fee_schedule;
        self
    }

    /// Replace the gas table
    #[must_use]
    pub fn with_gas_table(mut self, gas: GasTable) -> Self {
        self.gas = gas;
        self
    }
}

/// Process configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Postgres URL, absent when running from a fixture
    pub database_url: Option<String>,
    /// HTTP listen address
    pub bind_addr: SocketAddr,
    /// Max Postgres connections
    pub db_pool_size: usize,
    /// Engine tunables
    pub engine: EngineConfig,
}

impl Config {
    /// Read the configuration from the process environment.
    ///
    /// # Errors
    /// * If the default bind address can't be parsed
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    ///
    /// Unparseable overrides are logged and replaced by their defaults.
    ///
    /// # Errors
    /// * If the default bind address can't be parsed
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let default_addr = SocketAddr::from_str(DEFAULT_BIND_ADDR)
            .map_err(|e| Error::msg(format!("invalid default bind address: {e}")))?;

        let mut engine = EngineConfig::default();
        if let Some(notional_usd) = parse_var::<f64>(&lookup, "SPREADWATCH_NOTIONAL_USD") {
            if notional_usd.is_finite() && notional_usd > 0.0 {
                engine = engine.with_notional_usd(notional_usd);
            } else {
                warn!("config: SPREADWATCH_NOTIONAL_USD must be positive, keeping the default");
            }
        }
        if let Some(secs) = parse_var::<u32>(&lookup, "SPREADWATCH_FRESHNESS_WINDOW_SECS") {
            engine = engine.with_freshness_window(Duration::seconds(i64::from(secs)));
        }
        if let Some(secs) = parse_var::<u32>(&lookup, "SPREADWATCH_CEX_MAX_AGE_SECS") {
            engine = engine.with_cex_max_age(Some(Duration::seconds(i64::from(secs))));
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            bind_addr: parse_var(&lookup, "SPREADWATCH_BIND_ADDR").unwrap_or(default_addr),
            db_pool_size: parse_var(&lookup, "SPREADWATCH_DB_POOL_SIZE")
                .filter(|size| *size > 0)
                .unwrap_or(DEFAULT_DB_POOL_SIZE),
            engine,
        })
    }

    /// The Postgres URL, required outside fixture runs.
    ///
    /// # Errors
    /// * If `DATABASE_URL` is not set
    pub fn require_database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .ok_or_else(|| Error::msg("DATABASE_URL must be set"))
    }
}

/// Parse one variable, warning when it is set but malformed
fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("config: ignoring invalid {key}={raw:?}");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.database_url, None);
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.db_pool_size, DEFAULT_DB_POOL_SIZE);
        assert_eq!(config.engine, EngineConfig::default());
        assert!(config.require_database_url().is_err());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("DATABASE_URL", "postgres://localhost/spreads"),
            ("SPREADWATCH_BIND_ADDR", "127.0.0.1:9000"),
            ("SPREADWATCH_DB_POOL_SIZE", "4"),
            ("SPREADWATCH_NOTIONAL_USD", "250000"),
            ("SPREADWATCH_FRESHNESS_WINDOW_SECS", "900"),
            ("SPREADWATCH_CEX_MAX_AGE_SECS", "3600"),
        ]);
        assert_eq!(config.require_database_url().unwrap(), "postgres://localhost/spreads");
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.db_pool_size, 4);
        assert_eq!(config.engine.notional_usd, 250_000.0);
        assert_eq!(config.engine.freshness_window, Duration::seconds(900));
        assert_eq!(config.engine.cex_max_age, Some(Duration::hours(1)));
    }

    #[test]
    fn test_invalid_overrides_fall_back() {
        let config = config(&[
            ("DATABASE_URL", "  "),
            ("SPREADWATCH_BIND_ADDR", "not an address"),
            ("SPREADWATCH_DB_POOL_SIZE", "0"),
            ("SPREADWATCH_NOTIONAL_USD", "-5"),
            ("SPREADWATCH_FRESHNESS_WINDOW_SECS", "-1"),
            ("SPREADWATCH_CEX_MAX_AGE_SECS", "soon"),
        ]);
        assert_eq!(config.database_url, None);
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.db_pool_size, DEFAULT_DB_POOL_SIZE);
        assert_eq!(config.engine, EngineConfig::default());
    }
}
