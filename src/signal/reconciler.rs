//! Joins pool snapshots with CEX and DEX prices into one quote per (pool, asset).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::types::{ReconciledQuote, Reconciliation};
use crate::config::EngineConfig;
use crate::db_service::{SnapshotQuery, SnapshotStore};
use crate::models::{CexPriceSnapshot, DexPrice, PoolSnapshot};

/// Reads the three snapshot views and joins them.
#[derive(Clone)]
pub struct PriceReconciler {
    /// Snapshot source
    store: Arc<dyn SnapshotStore>,
    /// Max pool snapshot age
    freshness_window: Duration,
    /// Max CEX snapshot age, `None` for unbounded
    cex_max_age: Option<Duration>,
}

impl PriceReconciler {
    /// Reconciler reading from `store` with the windows in `config`
    #[must_use]
    pub fn new(store: Arc<dyn SnapshotStore>, config: &EngineConfig) -> Self {
        Self {
            store,
            freshness_window: config.freshness_window,
            cex_max_age: config.cex_max_age,
        }
    }

    /// Query for one reconciliation at `now`
    #[must_use]
    pub fn query(
        &self,
        asset_id: Option<&str>,
        min_tvl_usd: i64,
        now: DateTime<Utc>,
    ) -> SnapshotQuery {
        SnapshotQuery::new(now, self.freshness_window)
            .with_asset(asset_id)
            .with_min_tvl(min_tvl_usd)
            .with_cex_max_age(now, self.cex_max_age)
    }

    /// Fetch all three sources concurrently and join them.
    ///
    /// A store failure yields an empty, degraded result instead of an error.
    pub async fn reconcile(
        &self,
        asset_id: Option<&str>,
        min_tvl_usd: i64,
        now: DateTime<Utc>,
    ) -> Reconciliation {
        let query = self.query(asset_id, min_tvl_usd, now);

        let fetched = tokio::try_join!(
            self.store.cex_prices(&query),
            self.store.pool_snapshots(&query),
            self.store.dex_prices(&query),
        );

        match fetched {
            Ok((cex_prices, pools, dex_prices)) => {
                let quotes = join_sources(&query, cex_prices, pools, dex_prices);
                log::debug!(
                    "reconciler: {} quotes for asset {:?} (min tvl {})",
                    quotes.len(),
                    query.asset_id,
                    query.min_tvl_usd
                );
                Reconciliation {
                    quotes,
                    degraded: false,
                }
            }
            Err(e) => {
                log::error!("reconciler: Snapshot store read failed, serving no data: {e}");
                Reconciliation::degraded()
            }
        }
    }
}

/// `a` is strictly newer than `b`; equal timestamps fall back to row id
fn is_newer(a: (DateTime<Utc>, i64), b: (DateTime<Utc>, i64)) -> bool {
    a > b
}

/// Newest CEX row per asset, whatever order the rows arrive in.
#[must_use]
pub fn latest_cex_by_asset(rows: Vec<CexPriceSnapshot>) -> HashMap<String, CexPriceSnapshot> {
    let mut latest: HashMap<String, CexPriceSnapshot> = HashMap::with_capacity(rows.len());
    for row in rows {
        match latest.get(&row.asset_id) {
            Some(kept) if !is_newer((row.observed_at, row.id), (kept.observed_at, kept.id)) => {}
            _ => {
                latest.insert(row.asset_id.clone(), row);
            }
        }
    }
    latest
}

/// Newest snapshot per (pool key, asset), in first-seen order.
#[must_use]
pub fn latest_pool_snapshots(rows: Vec<PoolSnapshot>) -> Vec<PoolSnapshot> {
    let mut index: HashMap<(String, String), usize> = HashMap::with_capacity(rows.len());
    let mut latest: Vec<PoolSnapshot> = Vec::with_capacity(rows.len());

    for row in rows {
        let (pool_key, asset_id) = row.key();
        let key = (pool_key.to_string(), asset_id.to_string());
        match index.get(&key) {
            Some(&slot) => {
                let kept = &latest[slot];
                if is_newer((row.observed_at, row.id), (kept.observed_at, kept.id)) {
                    latest[slot] = row;
                }
            }
            None => {
                index.insert(key, latest.len());
                latest.push(row);
            }
        }
    }

    latest
}

/// Join deduplicated pool snapshots with their asset's CEX and DEX prices.
///
/// Rows outside the query are dropped again here, so a store that filters
/// loosely can't leak stale pools. Pools without both prices are skipped.
#[must_use]
pub fn join_sources(
    query: &SnapshotQuery,
    cex_prices: Vec<CexPriceSnapshot>,
    pools: Vec<PoolSnapshot>,
    dex_prices: Vec<DexPrice>,
) -> Vec<ReconciledQuote> {
    let cex_by_asset = latest_cex_by_asset(
        cex_prices
            .into_iter()
            .filter(|cex| query.admits_cex(cex))
            .collect(),
    );

    let mut dex_by_asset: HashMap<String, DexPrice> = HashMap::with_capacity(dex_prices.len());
    for dex in dex_prices {
        dex_by_asset.entry(dex.asset_id.clone()).or_insert(dex);
    }

    let pools = latest_pool_snapshots(
        pools
            .into_iter()
            .filter(|pool| query.admits_pool(pool))
            .collect(),
    );

    pools
        .into_iter()
        .filter_map(|pool| {
            let Some(cex) = cex_by_asset.get(&pool.asset_id) else {
                log::debug!(
                    "reconciler: No CEX price for {}, skipping pool {}",
                    pool.asset_id,
                    pool.pool_key
                );
                return None;
            };
            let Some(dex) = dex_by_asset.get(&pool.asset_id) else {
                log::debug!(
                    "reconciler: No DEX price for {}, skipping pool {}",
                    pool.asset_id,
                    pool.pool_key
                );
                return None;
            };

            Some(ReconciledQuote {
                cex: cex.clone(),
                dex: dex.clone(),
                pool,
            })
        })
        .collect()
}
