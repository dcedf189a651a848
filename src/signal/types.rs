//! Quote, signal and opportunity types shared by the reconciler, scorer and API.

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::Serialize;

use crate::models::{CexPriceSnapshot, DexPrice, PoolSnapshot};

/// The freshest pool snapshot joined with its asset's CEX and DEX prices.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledQuote {
    /// Newest fresh snapshot of the pool
    pub pool: PoolSnapshot,
    /// Newest CEX price for the pool's asset
    pub cex: CexPriceSnapshot,
    /// Current DEX consensus price for the pool's asset
    pub dex: DexPrice,
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    /// At most one quote per (pool key, asset)
    pub quotes: Vec<ReconciledQuote>,
    /// The store couldn't be read; `quotes` is empty
    pub degraded: bool,
}

impl Reconciliation {
    /// Empty result flagged as degraded
    #[must_use]
    pub fn degraded() -> Self {
        Self {
            quotes: Vec::new(),
            degraded: true,
        }
    }
}

/// Which venue quotes the asset cheaper. Spread feed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadDirection {
    /// DEX price at or below CEX price
    #[display("dex_cheap")]
    DexCheap,
    /// CEX price below DEX price
    #[display("cex_cheap")]
    CexCheap,
}

impl SpreadDirection {
    /// Direction implied by a signed spread (DEX minus CEX)
    #[must_use]
    pub fn from_spread_bps(spread_bps: i64) -> Self {
        if spread_bps > 0 {
            Self::CexCheap
        } else {
            Self::DexCheap
        }
    }
}

/// Which leg to buy on. Opportunity feed vocabulary.
///
/// Describes the same fact as [`SpreadDirection`]: `DexCheap` always pairs
/// with `BuyDexSellCex` and `CexCheap` with `BuyCexSellDex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeDirection {
    /// Buy on the CEX, sell into the pool
    #[display("buy_cex_sell_dex")]
    BuyCexSellDex,
    /// Buy from the pool, sell on the CEX
    #[display("buy_dex_sell_cex")]
    BuyDexSellCex,
}

impl From<SpreadDirection> for TradeDirection {
    fn from(direction: SpreadDirection) -> Self {
        match direction {
            SpreadDirection::DexCheap => Self::BuyDexSellCex,
            SpreadDirection::CexCheap => Self::BuyCexSellDex,
        }
    }
}

/// How actionable an opportunity looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Wide net spread on a deep, liquid, balanced market
    #[display("high")]
    High,
    /// Either a decent net spread or a reasonably liquid market
    #[display("medium")]
    Medium,
    /// Neither
    #[display("low")]
    Low,
}

/// Independent descriptive flags attached to an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalTag {
    /// Net profit clears the strong spread bar
    #[display("strong_spread")]
    StrongSpread,
    /// TVL above the deep pool bar
    #[display("deep_pool")]
    DeepPool,
    /// TVL below the shallow pool bar
    #[display("shallow_pool")]
    ShallowPool,
    /// Top CEX volume above the high bar
    #[display("high_cex_volume")]
    HighCexVolume,
    /// Top CEX volume below the low bar
    #[display("low_cex_volume")]
    LowCexVolume,
    /// Tracked asset is under-represented in the pool
    #[display("pool_imbalanced")]
    PoolImbalanced,
    /// Pool composition close to even
    #[display("pool_balanced")]
    PoolBalanced,
}

/// Cost of one notional round trip, all in bps.
///
/// `total_cost_bps` is always the sum of the other four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    /// Typical swap gas on the pool's chain
    pub gas_cost_bps: i64,
    /// Pool swap fee
    pub dex_fee_bps: i64,
    /// CEX taker fee
    pub cex_fee_bps: i64,
    /// Price impact estimate
    pub slippage_bps: i64,
    /// Sum of the above
    pub total_cost_bps: i64,
}

impl CostBreakdown {
    /// Build a breakdown, summing the components
    #[must_use]
    pub fn new(gas_cost_bps: i64, dex_fee_bps: i64, cex_fee_bps: i64, slippage_bps: i64) -> Self {
        Self {
            gas_cost_bps,
            dex_fee_bps,
            cex_fee_bps,
            slippage_bps,
            total_cost_bps: gas_cost_bps
                .saturating_add(dex_fee_bps)
                .saturating_add(cex_fee_bps)
                .saturating_add(slippage_bps),
        }
    }
}

/// Identity and price fields shared by both feeds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummary {
    /// Tracked asset
    pub asset_id: String,
    /// Ticker symbol from the DEX price table
    pub symbol: String,
    /// Natural key of the pool
    pub pool_key: String,
    /// DEX venue
    pub venue: String,
    /// Chain of the pool
    pub chain: String,
    /// Pair symbol of the pool
    pub pool_symbol: String,
    /// Pool TVL in USD
    pub tvl_usd: f64,
    /// Share of the pool held in the tracked asset
    pub balance_ratio: Option<f64>,
    /// Average CEX price
    pub cex_price: f64,
    /// DEX consensus price
    pub dex_price: f64,
    /// Exchange with the largest 24h volume
    pub top_exchange: Option<String>,
    /// 24h volume of that exchange
    pub cex_volume_24h: f64,
    /// When the pool snapshot was taken (unix seconds)
    #[serde(with = "chrono::serde::ts_seconds")]
    pub pool_observed_at: DateTime<Utc>,
    /// When the CEX snapshot was taken (unix seconds)
    #[serde(with = "chrono::serde::ts_seconds")]
    pub cex_observed_at: DateTime<Utc>,
}

impl From<&ReconciledQuote> for QuoteSummary {
    fn from(quote: &ReconciledQuote) -> Self {
        Self {
            asset_id: quote.pool.asset_id.clone(),
            symbol: quote.dex.symbol.clone(),
            pool_key: quote.pool.pool_key.clone(),
            venue: quote.pool.venue.clone(),
            chain: quote.pool.chain.clone(),
            pool_symbol: quote.pool.pool_symbol.clone(),
            tvl_usd: quote.pool.tvl_usd,
            balance_ratio: quote.pool.balance_ratio,
            cex_price: quote.cex.avg_price,
            dex_price: quote.dex.consensus_price_usd,
            top_exchange: quote.cex.top_exchange_name.clone(),
            cex_volume_24h: quote.cex.top_exchange_volume_24h,
            pool_observed_at: quote.pool.observed_at,
            cex_observed_at: quote.cex.observed_at,
        }
    }
}

/// Raw price dislocation between a pool's asset on DEX and CEX.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadSignal {
    /// Identity and prices
    #[serde(flatten)]
    pub quote: QuoteSummary,
    /// (dex - cex) / cex in bps, signed
    pub spread_bps: i64,
    /// Cheaper venue
    pub direction: SpreadDirection,
    /// Balance ratio reported and below the imbalance bar
    pub imbalance_signal: bool,
}

/// Cost-adjusted, confidence-scored trade idea for the fixed notional.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    /// Identity and prices
    #[serde(flatten)]
    pub quote: QuoteSummary,
    /// Pool type hint the DEX fee was inferred from
    pub pool_type: Option<String>,
    /// (dex - cex) / cex in bps, signed
    pub spread_bps: i64,
    /// |spread_bps|
    pub gross_profit_bps: i64,
    /// Cost breakdown
    #[serde(flatten)]
    pub costs: CostBreakdown,
    /// `gross_profit_bps - total_cost_bps`
    pub net_profit_bps: i64,
    /// Net profit on the notional, rounded to cents
    pub estimated_net_profit_usd: f64,
    /// Confidence tier
    pub confidence: Confidence,
    /// Descriptive tags
    pub signals: Vec<SignalTag>,
    /// Which leg to buy on
    pub direction: TradeDirection,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_vocabularies_agree() {
        for (spread_bps, spread_direction, trade_direction) in [
            (50, SpreadDirection::CexCheap, TradeDirection::BuyCexSellDex),
            (1, SpreadDirection::CexCheap, TradeDirection::BuyCexSellDex),
            (0, SpreadDirection::DexCheap, TradeDirection::BuyDexSellCex),
            (-30, SpreadDirection::DexCheap, TradeDirection::BuyDexSellCex),
        ] {
            let direction = SpreadDirection::from_spread_bps(spread_bps);
            assert_eq!(direction, spread_direction);
            assert_eq!(TradeDirection::from(direction), trade_direction);
        }
    }

    #[test]
    fn test_labels_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&TradeDirection::BuyDexSellCex).ok(),
            Some("\"buy_dex_sell_cex\"".to_string())
        );
        assert_eq!(SignalTag::HighCexVolume.to_string(), "high_cex_volume");
        assert_eq!(SpreadDirection::DexCheap.to_string(), "dex_cheap");
        assert_eq!(Confidence::Medium.to_string(), "medium");
    }

    #[test]
    fn test_cost_breakdown_sums() {
        let costs = CostBreakdown::new(1, 4, 10, 5);
        assert_eq!(costs.total_cost_bps, 20);
    }
}
