//! Per-request facade wiring the reconciler, cost model and scorer together.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::cost_model::{CostModel, SlippageModel};
use super::reconciler::PriceReconciler;
use super::scorer::SignalScorer;
use super::types::{Opportunity, SpreadSignal};
use crate::config::EngineConfig;
use crate::db_service::SnapshotStore;

/// Default `min_profit_bps` for the opportunity feed
pub const DEFAULT_MIN_PROFIT_BPS: i64 = 10;
/// Default `min_tvl` (USD) for the opportunity feed
pub const DEFAULT_MIN_TVL_USD: i64 = 100_000;
/// Default `min_spread_bps` for the spread feed
pub const DEFAULT_MIN_SPREAD_BPS: i64 = 5;

/// Opportunity feed parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpportunityParams {
    /// Restrict to one asset
    pub asset_id: Option<String>,
    /// Minimum net profit, inclusive
    pub min_profit_bps: i64,
    /// Minimum pool TVL in USD, inclusive
    pub min_tvl_usd: i64,
}

impl Default for OpportunityParams {
    fn default() -> Self {
        Self {
            asset_id: None,
            min_profit_bps: DEFAULT_MIN_PROFIT_BPS,
            min_tvl_usd: DEFAULT_MIN_TVL_USD,
        }
    }
}

/// Spread feed parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadParams {
    /// Restrict to one asset
    pub asset_id: Option<String>,
    /// Minimum |spread|, inclusive
    pub min_spread_bps: i64,
    /// Minimum pool TVL in USD, inclusive
    pub min_tvl_usd: i64,
}

impl Default for SpreadParams {
    fn default() -> Self {
        Self {
            asset_id: None,
            min_spread_bps: DEFAULT_MIN_SPREAD_BPS,
            min_tvl_usd: 0,
        }
    }
}

/// One computed feed
#[derive(Debug, Clone, PartialEq)]
pub struct Feed<T> {
    /// Computation time
    pub generated_at: DateTime<Utc>,
    /// The store was unreachable and `items` is empty
    pub degraded: bool,
    /// Sorted entries
    pub items: Vec<T>,
}

/// Spread feed
pub type SpreadFeed = Feed<SpreadSignal>;
/// Opportunity feed
pub type OpportunityFeed = Feed<Opportunity>;

/// Computes both feeds fresh on every call. Holds no mutable state.
#[derive(Clone)]
pub struct SignalEngine {
    /// Source join
    reconciler: PriceReconciler,
    /// Cost conversion
    cost_model: CostModel,
    /// Ranking and labelling
    scorer: SignalScorer,
}

impl SignalEngine {
    /// Engine over `store` configured by `config`
    #[must_use]
    pub fn new(store: Arc<dyn SnapshotStore>, config: &EngineConfig) -> Self {
        Self {
            reconciler: PriceReconciler::new(store, config),
            cost_model: CostModel::new(config),
            scorer: SignalScorer::new(config),
        }
    }

    /// Replace the slippage strategy
    #[must_use]
    pub fn with_slippage_model(mut self, slippage: Arc<dyn SlippageModel>) -> Self {
        self.cost_model = self.cost_model.with_slippage_model(slippage);
        self
    }

    /// Assumed trade size in USD
    #[must_use]
    pub fn notional_usd(&self) -> f64 {
        self.cost_model.notional_usd()
    }

    /// Raw spread feed at `now`
    pub async fn spreads(&self, params: &SpreadParams, now: DateTime<Utc>) -> SpreadFeed {
        let reconciliation = self
            .reconciler
            .reconcile(params.asset_id.as_deref(), params.min_tvl_usd, now)
            .await;

        Feed {
            generated_at: now,
            degraded: reconciliation.degraded,
            items: self
                .scorer
                .spreads(&reconciliation.quotes, params.min_spread_bps),
        }
    }

    /// Cost-adjusted opportunity feed at `now`
    pub async fn opportunities(
        &self,
        params: &OpportunityParams,
        now: DateTime<Utc>,
    ) -> OpportunityFeed {
        let reconciliation = self
            .reconciler
            .reconcile(params.asset_id.as_deref(), params.min_tvl_usd, now)
            .await;

        Feed {
            generated_at: now,
            degraded: reconciliation.degraded,
            items: self.scorer.opportunities(
                &reconciliation.quotes,
                &self.cost_model,
                params.min_profit_bps,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db_service::MemorySnapshotStore;
    use crate::signal::test_helpers::*;
    use crate::signal::types::{Confidence, SpreadDirection, TradeDirection};

    fn engine(store: MemorySnapshotStore) -> SignalEngine {
        SignalEngine::new(Arc::new(store), &EngineConfig::default())
    }

    fn scenario_a_store() -> MemorySnapshotStore {
        MemorySnapshotStore::new()
            .with_pool(pool("usdc", "curve-eth-3pool", 2_000_000.0, 60).with_balance_ratio(0.44))
            .with_cex_price(cex("usdc", 1.0, 20_000_000.0, 30))
            .with_dex_price(dex("usdc", 1.005))
    }

    #[tokio::test]
    async fn test_scenario_a_both_feeds() {
        let engine = engine(scenario_a_store());

        let opportunities = engine
            .opportunities(&OpportunityParams::default(), now())
            .await;
        assert!(!opportunities.degraded);
        assert_eq!(opportunities.generated_at, now());
        assert_eq!(opportunities.items.len(), 1);
        let item = &opportunities.items[0];
        assert_eq!(item.spread_bps, 50);
        assert_eq!(item.net_profit_bps, 30);
        assert_eq!(item.estimated_net_profit_usd, 300.0);
        assert_eq!(item.confidence, Confidence::High);
        assert_eq!(item.direction, TradeDirection::BuyCexSellDex);

        let spreads = engine.spreads(&SpreadParams::default(), now()).await;
        assert_eq!(spreads.items.len(), 1);
        assert_eq!(spreads.items[0].direction, SpreadDirection::CexCheap);
    }

    #[tokio::test]
    async fn test_scenario_b_and_d_absent_from_both_feeds() {
        let store = MemorySnapshotStore::new()
            // stale pool, otherwise qualifying
            .with_pool(pool("usdc", "curve-eth-3pool", 2_000_000.0, 1_000))
            .with_cex_price(cex("usdc", 1.0, 20_000_000.0, 30))
            .with_dex_price(dex("usdc", 1.005))
            // fresh pool with no CEX price
            .with_pool(pool("dai", "curve-eth-3pool", 2_000_000.0, 30))
            .with_dex_price(dex("dai", 1.02));
        let engine = engine(store);

        let spreads = engine.spreads(&SpreadParams::default(), now()).await;
        let opportunities = engine
            .opportunities(&OpportunityParams::default(), now())
            .await;
        assert!(!spreads.degraded && !opportunities.degraded);
        assert!(spreads.items.is_empty());
        assert!(opportunities.items.is_empty());
    }

    #[tokio::test]
    async fn test_degraded_store_gives_empty_feeds() {
        let engine = engine(scenario_a_store().unavailable());

        let spreads = engine.spreads(&SpreadParams::default(), now()).await;
        assert!(spreads.degraded);
        assert!(spreads.items.is_empty());

        let opportunities = engine
            .opportunities(&OpportunityParams::default(), now())
            .await;
        assert!(opportunities.degraded);
        assert!(opportunities.items.is_empty());
    }

    #[tokio::test]
    async fn test_alternate_notional() {
        let engine = SignalEngine::new(
            Arc::new(scenario_a_store()),
            &EngineConfig::default().with_notional_usd(1_000_000.0),
        );
        assert_eq!(engine.notional_usd(), 1_000_000.0);

        // slippage 50, gas 0 (5/1M), fee 4, cex 10: 64 bps of cost on a 50 bps spread
        let params = OpportunityParams {
            min_profit_bps: -100,
            ..OpportunityParams::default()
        };
        let feed = engine.opportunities(&params, now()).await;
        assert_eq!(feed.items[0].costs.total_cost_bps, 64);
        assert_eq!(feed.items[0].net_profit_bps, -14);
        assert_eq!(feed.items[0].estimated_net_profit_usd, -1_400.0);

        let default_feed = engine
            .opportunities(&OpportunityParams::default(), now())
            .await;
        assert!(default_feed.items.is_empty());
    }
}
