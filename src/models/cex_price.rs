use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::{Queryable, Selectable};
use eyre::{Error, Result};
use serde::Deserialize;

use super::numeric_to_f64;

/// A CEX price snapshot as stored in `cex_price_snapshots`
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schemas::cex_price_snapshots)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CexPriceRow {
    /// Row id
    pub id: i64,
    /// Tracked asset
    pub asset_id: String,
    /// Volume weighted average across exchanges
    pub avg_price: BigDecimal,
    /// Exchange with the largest 24h volume
    pub top_exchange_name: Option<String>,
    /// 24h volume of the top exchange in USD
    pub top_exchange_volume_24h: Option<BigDecimal>,
    /// When the snapshot was taken
    pub observed_at: DateTime<Utc>,
}

/// Aggregated centralized-exchange price for an asset at a point in time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CexPriceSnapshot {
    /// Row id, only used to break ordering ties
    #[serde(default)]
    pub id: i64,
    /// Tracked asset
    pub asset_id: String,
    /// Average price in USD
    pub avg_price: f64,
    /// Exchange with the largest 24h volume
    #[serde(default)]
    pub top_exchange_name: Option<String>,
    /// 24h volume of the top exchange in USD, zero when unknown
    #[serde(default)]
    pub top_exchange_volume_24h: f64,
    /// When the snapshot was taken
    pub observed_at: DateTime<Utc>,
}

impl TryFrom<CexPriceRow> for CexPriceSnapshot {
    type Error = Error;

    fn try_from(row: CexPriceRow) -> Result<Self> {
        let avg_price = numeric_to_f64(&row.avg_price, "avg_price")?;
        let top_exchange_volume_24h = match &row.top_exchange_volume_24h {
            Some(volume) => numeric_to_f64(volume, "top_exchange_volume_24h")?,
            None => 0.0,
        };

        Ok(Self {
            id: row.id,
            asset_id: row.asset_id,
            avg_price,
            top_exchange_name: row.top_exchange_name,
            top_exchange_volume_24h,
            observed_at: row.observed_at,
        })
    }
}
