//! Converts gas, pool fee, CEX fee and slippage into basis points of a fixed notional.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use super::types::CostBreakdown;
use crate::config::EngineConfig;

/// Slippage charged when a pool reports no usable TVL (100%)
const MAX_SLIPPAGE_BPS: i64 = 10_000;

/// Round a bps figure to the nearest integer
#[allow(clippy::cast_possible_truncation)]
fn round_bps(value: f64) -> i64 {
    value.round() as i64
}

/// One fee inference rule: descriptors containing `pattern` pay `fee_bps`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeRule {
    /// Lowercase substring to look for
    pub pattern: String,
    /// Fee charged when it matches
    pub fee_bps: i64,
}

impl FeeRule {
    /// Build a rule, lowercasing the pattern
    #[must_use]
    pub fn new(pattern: &str, fee_bps: i64) -> Self {
        Self {
            pattern: pattern.to_lowercase(),
            fee_bps,
        }
    }
}

/// Ordered fee inference table. The first matching rule wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeSchedule {
    /// Rules, evaluated in order
    pub rules: Vec<FeeRule>,
    /// Fee when nothing matches (a Curve-like pool)
    pub default_fee_bps: i64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        // "0.01%" has to come before "1%", which it contains
        let rules = [
            ("1bp", 1),
            ("0.01%", 1),
            ("stableswap", 4),
            ("curve", 4),
            ("5bp", 5),
            ("0.05%", 5),
            ("30bp", 30),
            ("0.3%", 30),
            ("100bp", 100),
            ("1%", 100),
        ]
        .into_iter()
        .map(|(pattern, fee_bps)| FeeRule::new(pattern, fee_bps))
        .collect();

        Self {
            rules,
            default_fee_bps: 4,
        }
    }
}

impl FeeSchedule {
    /// First rule matching the descriptor, case-insensitively
    #[must_use]
    pub fn matching_rule(&self, pool_type: &str) -> Option<&FeeRule> {
        let pool_type = pool_type.to_lowercase();
        self.rules
            .iter()
            .find(|rule| pool_type.contains(&rule.pattern))
    }

    /// Fee for a pool: explicit fee if known, else inferred from the descriptor
    #[must_use]
    pub fn fee_bps(&self, pool_type: Option<&str>, explicit_fee_bps: Option<i32>) -> i64 {
        if let Some(fee) = explicit_fee_bps {
            return i64::from(fee);
        }
        pool_type
            .and_then(|pool_type| self.matching_rule(pool_type))
            .map_or(self.default_fee_bps, |rule| rule.fee_bps)
    }
}

/// Typical USD cost of one swap, per chain.
#[derive(Debug, Clone, PartialEq)]
pub struct GasTable {
    /// Lowercase chain name to USD cost
    pub per_chain_usd: HashMap<String, f64>,
    /// Cost for chains not in the table
    pub default_usd: f64,
}

impl Default for GasTable {
    fn default() -> Self {
        let per_chain_usd = [
            ("ethereum", 5.0),
            ("arbitrum", 0.25),
            ("optimism", 0.25),
            ("base", 0.10),
            ("polygon", 0.05),
            ("bsc", 0.30),
            ("avalanche", 0.25),
            ("gnosis", 0.01),
            ("fantom", 0.05),
            ("solana", 0.01),
        ]
        .into_iter()
        .map(|(chain, usd)| (chain.to_string(), usd))
        .collect();

        // Unknown chains are priced like mainnet
        Self {
            per_chain_usd,
            default_usd: 5.0,
        }
    }
}

impl GasTable {
    /// Swap cost on `chain`, matched case-insensitively
    #[must_use]
    pub fn cost_usd(&self, chain: &str) -> f64 {
        self.per_chain_usd
            .get(&chain.trim().to_lowercase())
            .copied()
            .unwrap_or(self.default_usd)
    }

    /// Override one chain
    #[must_use]
    pub fn with_chain(mut self, chain: &str, usd: f64) -> Self {
        self.per_chain_usd.insert(chain.to_lowercase(), usd);
        self
    }
}

/// Price impact estimate for trading `notional_usd` against a pool.
pub trait SlippageModel: Debug + Send + Sync {
    /// Slippage in bps
    fn slippage_bps(&self, notional_usd: f64, tvl_usd: f64) -> i64;
}

/// Trade size as a share of TVL, read as bps: `notional / tvl * 100`.
///
/// Overstates impact for large trades against small pools.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearSlippage;

impl SlippageModel for LinearSlippage {
    fn slippage_bps(&self, notional_usd: f64, tvl_usd: f64) -> i64 {
        if !tvl_usd.is_finite() || tvl_usd <= 0.0 {
            return MAX_SLIPPAGE_BPS;
        }
        round_bps(notional_usd / tvl_usd * 100.0)
    }
}

/// Pure cost model for a fixed notional trade.
#[derive(Debug, Clone)]
pub struct CostModel {
    /// Assumed trade size in USD
    notional_usd: f64,
    /// Per-chain gas costs
    gas: GasTable,
    /// Pool fee inference
    fees: FeeSchedule,
    /// CEX taker fee
    cex_fee_bps: i64,
    /// Slippage strategy
    slippage: Arc<dyn SlippageModel>,
}

impl CostModel {
    /// Cost model with the linear slippage strategy
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            notional_usd: config.notional_usd,
            gas: config.gas.clone(),
            fees: config.fee_schedule.clone(),
            cex_fee_bps: config.cex_fee_bps,
            slippage: Arc::new(LinearSlippage),
        }
    }

    /// Swap the slippage strategy
    #[must_use]
    pub fn with_slippage_model(mut self, slippage: Arc<dyn SlippageModel>) -> Self {
        self.slippage = slippage;
        self
    }

    /// Assumed trade size in USD
    #[must_use]
    pub fn notional_usd(&self) -> f64 {
        self.notional_usd
    }

    /// Gas cost on `chain` as bps of the notional
    #[must_use]
    pub fn gas_cost_bps(&self, chain: &str) -> i64 {
        if self.notional_usd <= 0.0 {
            return 0;
        }
        round_bps(self.gas.cost_usd(chain) / self.notional_usd * 10_000.0)
    }

    /// Full cost breakdown for a pool. Never fails; unknown inputs use defaults.
    #[must_use]
    pub fn estimate(
        &self,
        chain: &str,
        pool_type: Option<&str>,
        explicit_fee_bps: Option<i32>,
        tvl_usd: f64,
    ) -> CostBreakdown {
        CostBreakdown::new(
            self.gas_cost_bps(chain),
            self.fees.fee_bps(pool_type, explicit_fee_bps),
            self.cex_fee_bps,
            self.slippage.slippage_bps(self.notional_usd, tvl_usd),
        )
    }
}
