//! Turns reconciled quotes into the spread feed and the opportunity feed.

use std::cmp::Reverse;

use itertools::Itertools;

use super::cost_model::CostModel;
use super::types::{
    Confidence, Opportunity, QuoteSummary, ReconciledQuote, SignalTag, SpreadDirection,
    SpreadSignal, TradeDirection,
};
use crate::config::EngineConfig;

/// Bars for the confidence tiers. Every comparison is strict.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceThresholds {
    /// High tier: net profit above this
    pub high_net_profit_bps: i64,
    /// High tier: TVL above this
    pub high_min_tvl_usd: f64,
    /// High tier: CEX volume above this
    pub high_min_cex_volume_usd: f64,
    /// High tier: balance ratio above this, when reported
    pub high_min_balance_ratio: f64,
    /// Medium tier: net profit above this
    pub medium_net_profit_bps: i64,
    /// Medium tier (alternative): TVL above this...
    pub medium_min_tvl_usd: f64,
    /// ...and CEX volume above this
    pub medium_min_cex_volume_usd: f64,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            high_net_profit_bps: 20,
            high_min_tvl_usd: 1_000_000.0,
            high_min_cex_volume_usd: 10_000_000.0,
            high_min_balance_ratio: 0.4,
            medium_net_profit_bps: 10,
            medium_min_tvl_usd: 500_000.0,
            medium_min_cex_volume_usd: 1_000_000.0,
        }
    }
}

/// Bars for the descriptive tags.
///
/// The balanced/imbalanced bars leave a dead zone between them where neither tag applies.
#[derive(Debug, Clone, PartialEq)]
pub struct TagThresholds {
    /// `strong_spread` when net profit is above this
    pub strong_spread_bps: i64,
    /// `deep_pool` when TVL is above this
    pub deep_pool_tvl_usd: f64,
    /// `shallow_pool` when TVL is below this
    pub shallow_pool_tvl_usd: f64,
    /// `high_cex_volume` when volume is above this
    pub high_cex_volume_usd: f64,
    /// `low_cex_volume` when volume is below this
    pub low_cex_volume_usd: f64,
    /// `pool_imbalanced` when the balance ratio is below this
    pub imbalanced_ratio: f64,
    /// `pool_balanced` when the balance ratio is above this
    pub balanced_ratio: f64,
}

impl Default for TagThresholds {
    fn default() -> Self {
        Self {
            strong_spread_bps: 20,
            deep_pool_tvl_usd: 1_000_000.0,
            shallow_pool_tvl_usd: 200_000.0,
            high_cex_volume_usd: 10_000_000.0,
            low_cex_volume_usd: 1_000_000.0,
            imbalanced_ratio: 0.42,
            balanced_ratio: 0.48,
        }
    }
}

/// Signed DEX-over-CEX spread in bps, `None` when either price is unusable.
///
/// Extreme ratios saturate at the `i64` bounds.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn spread_bps(cex_price: f64, dex_price: f64) -> Option<i64> {
    if !cex_price.is_finite() || !dex_price.is_finite() || cex_price <= 0.0 || dex_price < 0.0 {
        return None;
    }
    Some(((dex_price - cex_price) / cex_price * 10_000.0).round() as i64)
}

/// Net profit on `notional_usd`, rounded to cents
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn net_profit_usd(net_profit_bps: i64, notional_usd: f64) -> f64 {
    (net_profit_bps as f64 / 10_000.0 * notional_usd * 100.0).round() / 100.0
}

/// Scores reconciled quotes. Holds thresholds only; every call is pure.
#[derive(Debug, Clone)]
pub struct SignalScorer {
    /// Confidence tier bars
    confidence: ConfidenceThresholds,
    /// Tag bars
    tags: TagThresholds,
    /// `imbalance_signal` when the balance ratio is below this
    imbalance_signal_ratio: f64,
}

impl SignalScorer {
    /// Scorer using the thresholds in `config`
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            confidence: config.confidence.clone(),
            tags: config.tags.clone(),
            imbalance_signal_ratio: config.imbalance_signal_ratio,
        }
    }

    /// Raw spread feed: drops `|spread| < min_spread_bps`, sorted by `|spread|` descending.
    #[must_use]
    pub fn spreads(&self, quotes: &[ReconciledQuote], min_spread_bps: i64) -> Vec<SpreadSignal> {
        quotes
            .iter()
            .filter_map(|quote| {
                let spread_bps = quote_spread(quote)?;
                if spread_bps.saturating_abs() < min_spread_bps {
                    return None;
                }
                Some(SpreadSignal {
                    quote: QuoteSummary::from(quote),
                    spread_bps,
                    direction: SpreadDirection::from_spread_bps(spread_bps),
                    imbalance_signal: quote
                        .pool
                        .balance_ratio
                        .is_some_and(|ratio| ratio < self.imbalance_signal_ratio),
                })
            })
            .sorted_by(|a, b| {
                Reverse(a.spread_bps.saturating_abs())
                    .cmp(&Reverse(b.spread_bps.saturating_abs()))
                    .then_with(|| a.quote.pool_key.cmp(&b.quote.pool_key))
                    .then_with(|| a.quote.asset_id.cmp(&b.quote.asset_id))
            })
            .collect()
    }

    /// Cost-adjusted feed: drops `net < min_profit_bps`, sorted by net profit descending.
    #[must_use]
    pub fn opportunities(
        &self,
        quotes: &[ReconciledQuote],
        cost_model: &CostModel,
        min_profit_bps: i64,
    ) -> Vec<Opportunity> {
        quotes
            .iter()
            .filter_map(|quote| {
                let opportunity = self.score(quote, cost_model)?;
                (opportunity.net_profit_bps >= min_profit_bps).then_some(opportunity)
            })
            .sorted_by(|a, b| {
                Reverse(a.net_profit_bps)
                    .cmp(&Reverse(b.net_profit_bps))
                    .then_with(|| a.quote.pool_key.cmp(&b.quote.pool_key))
                    .then_with(|| a.quote.asset_id.cmp(&b.quote.asset_id))
            })
            .collect()
    }

    /// Score one quote, without any minimum profit filter
    #[must_use]
    pub fn score(&self, quote: &ReconciledQuote, cost_model: &CostModel) -> Option<Opportunity> {
        let spread_bps = quote_spread(quote)?;
        let pool = &quote.pool;

        let costs = cost_model.estimate(
            &pool.chain,
            pool.pool_type.as_deref(),
            pool.explicit_fee_bps,
            pool.tvl_usd,
        );
        let gross_profit_bps = spread_bps.saturating_abs();
        let net_profit_bps = gross_profit_bps.saturating_sub(costs.total_cost_bps);
        let cex_volume = quote.cex.top_exchange_volume_24h;

        Some(Opportunity {
            quote: QuoteSummary::from(quote),
            pool_type: pool.pool_type.clone(),
            spread_bps,
            gross_profit_bps,
            costs,
            net_profit_bps,
            estimated_net_profit_usd: net_profit_usd(net_profit_bps, cost_model.notional_usd()),
            confidence: self.classify(net_profit_bps, pool.tvl_usd, cex_volume, pool.balance_ratio),
            signals: self.tag(net_profit_bps, pool.tvl_usd, cex_volume, pool.balance_ratio),
            direction: TradeDirection::from(SpreadDirection::from_spread_bps(spread_bps)),
        })
    }

    /// Confidence tier, evaluated high then medium then low
    #[must_use]
    pub fn classify(
        &self,
        net_profit_bps: i64,
        tvl_usd: f64,
        cex_volume_usd: f64,
        balance_ratio: Option<f64>,
    ) -> Confidence {
        let t = &self.confidence;

        let high = net_profit_bps > t.high_net_profit_bps
            && tvl_usd > t.high_min_tvl_usd
            && cex_volume_usd > t.high_min_cex_volume_usd
            && balance_ratio.map_or(true, |ratio| ratio > t.high_min_balance_ratio);
        if high {
            return Confidence::High;
        }

        let medium = net_profit_bps > t.medium_net_profit_bps
            || (tvl_usd > t.medium_min_tvl_usd && cex_volume_usd > t.medium_min_cex_volume_usd);
        if medium {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    /// Descriptive tags, in a fixed order
    #[must_use]
    pub fn tag(
        &self,
        net_profit_bps: i64,
        tvl_usd: f64,
        cex_volume_usd: f64,
        balance_ratio: Option<f64>,
    ) -> Vec<SignalTag> {
        let t = &self.tags;
        let mut tags = Vec::new();

        if net_profit_bps > t.strong_spread_bps {
            tags.push(SignalTag::StrongSpread);
        }

        if tvl_usd > t.deep_pool_tvl_usd {
            tags.push(SignalTag::DeepPool);
        } else if tvl_usd < t.shallow_pool_tvl_usd {
            tags.push(SignalTag::ShallowPool);
        }

        if cex_volume_usd > t.high_cex_volume_usd {
            tags.push(SignalTag::HighCexVolume);
        } else if cex_volume_usd < t.low_cex_volume_usd {
            tags.push(SignalTag::LowCexVolume);
        }

        match balance_ratio {
            Some(ratio) if ratio < t.imbalanced_ratio => tags.push(SignalTag::PoolImbalanced),
            Some(ratio) if ratio > t.balanced_ratio => tags.push(SignalTag::PoolBalanced),
            _ => {}
        }

        tags
    }
}

/// Spread for a quote, logging quotes whose CEX price is unusable
fn quote_spread(quote: &ReconciledQuote) -> Option<i64> {
    let spread = spread_bps(quote.cex.avg_price, quote.dex.consensus_price_usd);
    if spread.is_none() {
        log::debug!(
            "scorer: Skipping {} / {}: unusable prices cex={} dex={}",
            quote.pool.pool_key,
            quote.pool.asset_id,
            quote.cex.avg_price,
            quote.dex.consensus_price_usd
        );
    }
    spread
}
