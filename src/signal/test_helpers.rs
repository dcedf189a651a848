//! Snapshot builders shared by unit tests.

#![allow(clippy::unwrap_used, missing_docs, clippy::missing_docs_in_private_items)]

use chrono::{DateTime, Duration, Utc};

use super::types::ReconciledQuote;
use crate::models::{CexPriceSnapshot, DexPrice, PoolSnapshot};

/// Fixed request time used throughout the tests
pub fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_750_000_000, 0).unwrap()
}

pub fn pool(asset_id: &str, pool_key: &str, tvl_usd: f64, age_secs: i64) -> PoolSnapshot {
    pool_with_id(0, asset_id, pool_key, tvl_usd, age_secs)
}

pub fn pool_with_id(
    id: i64,
    asset_id: &str,
    pool_key: &str,
    tvl_usd: f64,
    age_secs: i64,
) -> PoolSnapshot {
    PoolSnapshot {
        id,
        asset_id: asset_id.to_string(),
        pool_key: pool_key.to_string(),
        venue: "Curve".to_string(),
        chain: "Ethereum".to_string(),
        pool_symbol: "DAI/USDC/USDT".to_string(),
        pool_type: Some("curve stableswap".to_string()),
        tvl_usd,
        balance_ratio: None,
        explicit_fee_bps: None,
        observed_at: now() - Duration::seconds(age_secs),
    }
}

pub fn cex(asset_id: &str, avg_price: f64, volume_24h: f64, age_secs: i64) -> CexPriceSnapshot {
    cex_with_id(0, asset_id, avg_price, volume_24h, age_secs)
}

pub fn cex_with_id(
    id: i64,
    asset_id: &str,
    avg_price: f64,
    volume_24h: f64,
    age_secs: i64,
) -> CexPriceSnapshot {
    CexPriceSnapshot {
        id,
        asset_id: asset_id.to_string(),
        avg_price,
        top_exchange_name: Some("Binance".to_string()),
        top_exchange_volume_24h: volume_24h,
        observed_at: now() - Duration::seconds(age_secs),
    }
}

pub fn dex(asset_id: &str, consensus_price_usd: f64) -> DexPrice {
    DexPrice {
        asset_id: asset_id.to_string(),
        symbol: asset_id.to_uppercase(),
        consensus_price_usd,
    }
}

pub fn quote(pool: PoolSnapshot, cex: CexPriceSnapshot, dex: DexPrice) -> ReconciledQuote {
    ReconciledQuote { pool, cex, dex }
}

impl PoolSnapshot {
    pub fn with_balance_ratio(mut self, balance_ratio: f64) -> Self {
        self.balance_ratio = Some(balance_ratio);
        self
    }

    pub fn on_chain(mut self, chain: &str) -> Self {
        self.chain = chain.to_string();
        self
    }

    pub fn with_pool_type(mut self, pool_type: &str) -> Self {
        self.pool_type = Some(pool_type.to_string());
        self
    }
}
