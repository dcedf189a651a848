use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::{Queryable, Selectable};
use eyre::{Error, Result};
use serde::Deserialize;

use super::numeric_to_f64;

/// A pool snapshot as stored in `pool_snapshots`
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schemas::pool_snapshots)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PoolSnapshotRow {
    /// Row id
    pub id: i64,
    /// Tracked asset
    pub asset_id: String,
    /// Natural key of the pool (venue + chain + pair)
    pub pool_key: String,
    /// DEX venue, e.g. "Curve"
    pub venue: String,
    /// Chain the pool lives on
    pub chain: String,
    /// Human readable pair symbol
    pub pool_symbol: String,
    /// Free-text pool type, used as a fee tier hint
    pub pool_type: Option<String>,
    /// Total value locked in USD
    pub tvl_usd: BigDecimal,
    /// Share of the pool attributable to the tracked asset
    pub balance_ratio: Option<BigDecimal>,
    /// Fee in bps when the ingester knows it
    pub fee_bps: Option<i32>,
    /// When the snapshot was taken
    pub observed_at: DateTime<Utc>,
}

/// A timestamped observation of a liquidity pool's size and composition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSnapshot {
    /// Row id, only used to break ordering ties
    #[serde(default)]
    pub id: i64,
    /// Tracked asset
    pub asset_id: String,
    /// Natural key of the pool (venue + chain + pair)
    pub pool_key: String,
    /// DEX venue
    pub venue: String,
    /// Chain the pool lives on
    pub chain: String,
    /// Human readable pair symbol
    pub pool_symbol: String,
    /// Free-text fee tier hint, e.g. "curve stableswap" or "uniswap v3 0.05%"
    #[serde(default)]
    pub pool_type: Option<String>,
    /// Total value locked in USD
    pub tvl_usd: f64,
    /// Fraction of the pool attributable to the tracked asset
    #[serde(default)]
    pub balance_ratio: Option<f64>,
    /// Explicit fee in bps, overrides fee inference
    #[serde(default)]
    pub explicit_fee_bps: Option<i32>,
    /// When the snapshot was taken
    pub observed_at: DateTime<Utc>,
}

impl PoolSnapshot {
    /// Dedup key: one entry per pool per asset
    #[must_use]
    pub fn key(&self) -> (&str, &str) {
        (&self.pool_key, &self.asset_id)
    }
}

impl TryFrom<PoolSnapshotRow> for PoolSnapshot {
    type Error = Error;

    fn try_from(row: PoolSnapshotRow) -> Result<Self> {
        let tvl_usd = numeric_to_f64(&row.tvl_usd, "tvl_usd")?;
        let balance_ratio = row
            .balance_ratio
            .as_ref()
            .map(|ratio| numeric_to_f64(ratio, "balance_ratio"))
            .transpose()?;

        Ok(Self {
            id: row.id,
            asset_id: row.asset_id,
            pool_key: row.pool_key,
            venue: row.venue,
            chain: row.chain,
            pool_symbol: row.pool_symbol,
            pool_type: row.pool_type,
            tvl_usd,
            balance_ratio,
            explicit_fee_bps: row.fee_bps,
            observed_at: row.observed_at,
        })
    }
}
