use chrono::{DateTime, Duration, Utc};

use crate::models::{CexPriceSnapshot, PoolSnapshot};

/// Filters applied to one read of the snapshot tables.
///
/// A store compiles this into typed statements; the same value is used to
/// re-check rows in memory, so every store filters identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotQuery {
    /// Restrict all three reads to one asset
    pub asset_id: Option<String>,
    /// Pools below this TVL (USD) are not read
    pub min_tvl_usd: i64,
    /// Oldest pool snapshot that is still fresh
    pub pool_observed_since: DateTime<Utc>,
    /// Oldest CEX snapshot accepted, `None` accepts any age
    pub cex_observed_since: Option<DateTime<Utc>>,
}

impl SnapshotQuery {
    /// Query for everything observed within `freshness_window` of `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>, freshness_window: Duration) -> Self {
        Self {
            asset_id: None,
            min_tvl_usd: 0,
            pool_observed_since: now - freshness_window,
            cex_observed_since: None,
        }
    }

    /// Restrict the query to a single asset. Blank ids mean "all assets".
    #[must_use]
    pub fn with_asset(mut self, asset_id: Option<&str>) -> Self {
        self.asset_id = asset_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(ToString::to_string);
        self
    }

    /// Minimum pool TVL in USD
    #[must_use]
    pub fn with_min_tvl(mut self, min_tvl_usd: i64) -> Self {
        self.min_tvl_usd = min_tvl_usd.max(0);
        self
    }

    /// Bound CEX snapshot age. `None` keeps the newest row however old it is.
    #[must_use]
    pub fn with_cex_max_age(mut self, now: DateTime<Utc>, max_age: Option<Duration>) -> Self {
        self.cex_observed_since = max_age.map(|age| now - age);
        self
    }

    /// Does the asset filter accept `asset_id`
    #[must_use]
    pub fn admits_asset(&self, asset_id: &str) -> bool {
        self.asset_id.as_deref().map_or(true, |id| id == asset_id)
    }

    /// Would this pool snapshot be returned by the pool read
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn admits_pool(&self, pool: &PoolSnapshot) -> bool {
        self.admits_asset(&pool.asset_id)
            && pool.observed_at >= self.pool_observed_since
            && pool.tvl_usd >= self.min_tvl_usd as f64
    }

    /// Would this CEX snapshot be returned by the CEX read
    #[must_use]
    pub fn admits_cex(&self, cex: &CexPriceSnapshot) -> bool {
        self.admits_asset(&cex.asset_id)
            && self
                .cex_observed_since
                .map_or(true, |since| cex.observed_at >= since)
    }
}
