use bigdecimal::BigDecimal;
use diesel::{Queryable, Selectable};
use eyre::{Error, Result};
use serde::Deserialize;

use super::numeric_to_f64;

/// Current DEX consensus price row from `dex_prices`
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schemas::dex_prices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DexPriceRow {
    /// Tracked asset
    pub asset_id: String,
    /// Ticker symbol
    pub symbol: String,
    /// Consensus on-chain price in USD
    pub consensus_price_usd: BigDecimal,
}

/// The single current on-chain consensus price for an asset.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DexPrice {
    /// Tracked asset
    pub asset_id: String,
    /// Ticker symbol
    pub symbol: String,
    /// Consensus price in USD
    pub consensus_price_usd: f64,
}

impl TryFrom<DexPriceRow> for DexPrice {
    type Error = Error;

    fn try_from(row: DexPriceRow) -> Result<Self> {
        let consensus_price_usd = numeric_to_f64(&row.consensus_price_usd, "consensus_price_usd")?;
        Ok(Self {
            asset_id: row.asset_id,
            symbol: row.symbol,
            consensus_price_usd,
        })
    }
}
