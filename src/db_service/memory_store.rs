use std::cmp::Reverse;
use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use eyre::{Result, WrapErr};
use serde::Deserialize;

use super::{SnapshotQuery, SnapshotStore, StoreError};
use crate::models::{CexPriceSnapshot, DexPrice, PoolSnapshot};

/// Snapshot rows loaded from a JSON file
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotFixture {
    /// Pool snapshot rows
    #[serde(default)]
    pub pools: Vec<PoolSnapshot>,
    /// CEX price rows
    #[serde(default)]
    pub cex_prices: Vec<CexPriceSnapshot>,
    /// DEX price rows
    #[serde(default)]
    pub dex_prices: Vec<DexPrice>,
}

/// In-memory snapshot store with the same filter and ordering rules as Postgres.
///
/// Used by tests and `--fixture` runs of the binary.
#[derive(Debug, Default, Clone)]
pub struct MemorySnapshotStore {
    /// Pool snapshot rows
    pools: Vec<PoolSnapshot>,
    /// CEX price rows
    cex_prices: Vec<CexPriceSnapshot>,
    /// DEX price rows
    dex_prices: Vec<DexPrice>,
    /// Simulate an outage: every read fails
    unavailable: bool,
}

impl MemorySnapshotStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded from a fixture
    #[must_use]
    pub fn from_fixture(fixture: SnapshotFixture) -> Self {
        Self {
            pools: fixture.pools,
            cex_prices: fixture.cex_prices,
            dex_prices: fixture.dex_prices,
            unavailable: false,
        }
    }

    /// Load a fixture file
    ///
    /// # Errors
    /// * If the file can't be read
    /// * If the JSON doesn't match [`SnapshotFixture`]
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .wrap_err_with(|| format!("reading fixture {}", path.display()))?;
        let fixture: SnapshotFixture = serde_json::from_str(&raw)
            .wrap_err_with(|| format!("parsing fixture {}", path.display()))?;
        log::info!(
            "db_service::memory_store: Loaded fixture with {} pools, {} cex prices, {} dex prices",
            fixture.pools.len(),
            fixture.cex_prices.len(),
            fixture.dex_prices.len()
        );
        Ok(Self::from_fixture(fixture))
    }

    /// Add a pool snapshot row
    #[must_use]
    pub fn with_pool(mut self, pool: PoolSnapshot) -> Self {
        self.pools.push(pool);
        self
    }

    /// Add a CEX price row
    #[must_use]
    pub fn with_cex_price(mut self, cex: CexPriceSnapshot) -> Self {
        self.cex_prices.push(cex);
        self
    }

    /// Add a DEX price row
    #[must_use]
    pub fn with_dex_price(mut self, dex: DexPrice) -> Self {
        self.dex_prices.push(dex);
        self
    }

    /// Make every read fail
    #[must_use]
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Fail when the store is marked unavailable
    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("memory store marked down".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn cex_prices(&self, query: &SnapshotQuery) -> Result<Vec<CexPriceSnapshot>, StoreError> {
        self.check_available()?;
        let mut rows: Vec<CexPriceSnapshot> = self
            .cex_prices
            .iter()
            .filter(|cex| query.admits_cex(cex))
            .cloned()
            .collect();
        rows.sort_by_key(|cex| Reverse((cex.observed_at, cex.id)));

        let mut seen = HashSet::with_capacity(rows.len());
        rows.retain(|cex| seen.insert(cex.asset_id.clone()));
        rows.sort_by(|a, b| a.asset_id.cmp(&b.asset_id));
        Ok(rows)
    }

    async fn pool_snapshots(&self, query: &SnapshotQuery) -> Result<Vec<PoolSnapshot>, StoreError> {
        self.check_available()?;
        let mut rows: Vec<PoolSnapshot> = self
            .pools
            .iter()
            .filter(|pool| query.admits_pool(pool))
            .cloned()
            .collect();
        rows.sort_by_key(|pool| Reverse((pool.observed_at, pool.id)));
        Ok(rows)
    }

    async fn dex_prices(&self, query: &SnapshotQuery) -> Result<Vec<DexPrice>, StoreError> {
        self.check_available()?;
        let mut rows: Vec<DexPrice> = self
            .dex_prices
            .iter()
            .filter(|dex| query.admits_asset(&dex.asset_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.asset_id.cmp(&b.asset_id));
        Ok(rows)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::signal::test_helpers::*;

    #[tokio::test]
    async fn test_pool_snapshots_newest_first_and_filtered() {
        let store = MemorySnapshotStore::new()
            .with_pool(pool_with_id(1, "usdc", "curve-eth-3pool", 2_000_000.0, 600))
            .with_pool(pool_with_id(2, "usdc", "curve-eth-3pool", 2_000_000.0, 10))
            .with_pool(pool_with_id(3, "usdc", "uni-eth-usdc-usdt", 50_000.0, 10))
            .with_pool(pool_with_id(4, "usdc", "curve-eth-3pool", 2_000_000.0, 1_000));
        let query = SnapshotQuery::new(now(), Duration::seconds(700)).with_min_tvl(100_000);

        let rows = store.pool_snapshots(&query).await.unwrap();
        let ids: Vec<i64> = rows.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_cex_prices_newest_per_asset() {
        let store = MemorySnapshotStore::new()
            .with_cex_price(cex_with_id(7, "usdc", 1.0, 1.0, 30))
            .with_cex_price(cex_with_id(9, "usdc", 1.1, 1.0, 30))
            .with_cex_price(cex_with_id(3, "dai", 1.0, 1.0, 90_000))
            .with_cex_price(cex_with_id(4, "dai", 1.0, 1.0, 10_000));
        let query = SnapshotQuery::new(now(), Duration::seconds(700));

        let ids: Vec<(String, i64)> = store
            .cex_prices(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|c| (c.asset_id, c.id))
            .collect();
        // Equal timestamps fall back to the higher id; age is unbounded by default
        assert_eq!(ids, vec![("dai".to_string(), 4), ("usdc".to_string(), 9)]);
    }

    #[tokio::test]
    async fn test_cex_prices_age_bound_applies_before_newest_pick() {
        let store = MemorySnapshotStore::new()
            .with_cex_price(cex_with_id(1, "usdc", 1.0, 1.0, 30))
            .with_cex_price(cex_with_id(2, "dai", 1.0, 1.0, 7_200));
        let query = SnapshotQuery::new(now(), Duration::seconds(700))
            .with_cex_max_age(now(), Some(Duration::hours(1)));

        let ids: Vec<i64> = store
            .cex_prices(&query)
            .await
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_fixture_parses_camel_case() {
        let fixture: SnapshotFixture = serde_json::from_str(
            r#"{
                "pools": [{
                    "assetId": "usdc", "poolKey": "curve-eth-3pool", "venue": "Curve",
                    "chain": "Ethereum", "poolSymbol": "DAI/USDC/USDT",
                    "poolType": "curve stableswap", "tvlUsd": 2000000.0,
                    "balanceRatio": 0.44, "observedAt": "2025-06-15T12:00:00Z"
                }],
                "cexPrices": [{
                    "assetId": "usdc", "avgPrice": 1.0, "topExchangeName": "Binance",
                    "topExchangeVolume24h": 20000000.0, "observedAt": "2025-06-15T11:59:00Z"
                }],
                "dexPrices": [{"assetId": "usdc", "symbol": "USDC", "consensusPriceUsd": 1.005}]
            }"#,
        )
        .unwrap();

        assert_eq!(fixture.pools.len(), 1);
        assert_eq!(fixture.pools[0].explicit_fee_bps, None);
        assert_eq!(fixture.pools[0].balance_ratio, Some(0.44));
        assert_eq!(fixture.cex_prices[0].top_exchange_volume_24h, 20_000_000.0);
        assert_eq!(fixture.dex_prices[0].symbol, "USDC");
    }

    #[tokio::test]
    async fn test_unavailable_store_errors() {
        let store = MemorySnapshotStore::new().unavailable();
        let query = SnapshotQuery::new(now(), Duration::seconds(700));
        let err = store.dex_prices(&query).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "snapshot store unavailable: memory store marked down"
        );
    }
}
