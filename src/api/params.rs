//! Lenient query string parsing.
//!
//! Every value arrives as an optional string. Unparseable numbers fall back
//! to their defaults and negative numbers are clamped to zero, so a request
//! is never rejected over its parameters.

use serde::Deserialize;

use crate::signal::engine::{
    OpportunityParams, SpreadParams, DEFAULT_MIN_PROFIT_BPS, DEFAULT_MIN_SPREAD_BPS,
    DEFAULT_MIN_TVL_USD,
};

/// Raw `/api/arbitrage/opportunities` query
#[derive(Debug, Default, Deserialize)]
pub struct OpportunityQuery {
    /// Restrict to one asset
    pub asset_id: Option<String>,
    /// Minimum net profit in bps
    pub min_profit_bps: Option<String>,
    /// Minimum pool TVL in USD
    pub min_tvl: Option<String>,
}

/// Raw `/api/arbitrage/spreads` query
#[derive(Debug, Default, Deserialize)]
pub struct SpreadQuery {
    /// Restrict to one asset
    pub asset_id: Option<String>,
    /// Minimum |spread| in bps
    pub min_spread_bps: Option<String>,
    /// Minimum pool TVL in USD
    pub min_tvl: Option<String>,
}

/// Trimmed asset id, `None` when blank
fn asset_id(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ToString::to_string)
}

/// Non-negative integer, `default` when missing or unparseable. Floats truncate and saturate.
#[allow(clippy::cast_possible_truncation)]
fn non_negative(raw: Option<&str>, default: i64) -> i64 {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return default;
    };
    let parsed = raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(|value| value.trunc() as i64)
    });
    parsed.map_or(default, |value| value.max(0))
}

impl From<&OpportunityQuery> for OpportunityParams {
    fn from(query: &OpportunityQuery) -> Self {
        Self {
            asset_id: asset_id(query.asset_id.as_deref()),
            min_profit_bps: non_negative(query.min_profit_bps.as_deref(), DEFAULT_MIN_PROFIT_BPS),
            min_tvl_usd: non_negative(query.min_tvl.as_deref(), DEFAULT_MIN_TVL_USD),
        }
    }
}

impl From<&SpreadQuery> for SpreadParams {
    fn from(query: &SpreadQuery) -> Self {
        Self {
            asset_id: asset_id(query.asset_id.as_deref()),
            min_spread_bps: non_negative(query.min_spread_bps.as_deref(), DEFAULT_MIN_SPREAD_BPS),
            min_tvl_usd: non_negative(query.min_tvl.as_deref(), 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_negative() {
        for (raw, expected) in [
            (None, 10),
            (Some(""), 10),
            (Some("  "), 10),
            (Some("25"), 25),
            (Some(" 25 "), 25),
            (Some("0"), 0),
            (Some("-5"), 0),
            (Some("12.9"), 12),
            (Some("-0.5"), 0),
            (Some("lots"), 10),
            (Some("NaN"), 10),
            (Some("1e30"), i64::MAX),
        ] {
            assert_eq!(non_negative(raw, 10), expected, "{raw:?}");
        }
    }

    #[test]
    fn test_opportunity_defaults() {
        let params = OpportunityParams::from(&OpportunityQuery::default());
        assert_eq!(params, OpportunityParams::default());
        assert_eq!(params.min_profit_bps, 10);
        assert_eq!(params.min_tvl_usd, 100_000);
    }

    #[test]
    fn test_opportunity_query() {
        let query = OpportunityQuery {
            asset_id: Some(" usdc ".to_string()),
            min_profit_bps: Some("abc".to_string()),
            min_tvl: Some("-1".to_string()),
        };
        let params = OpportunityParams::from(&query);
        assert_eq!(params.asset_id.as_deref(), Some("usdc"));
        assert_eq!(params.min_profit_bps, 10);
        assert_eq!(params.min_tvl_usd, 0);
    }

    #[test]
    fn test_spread_query() {
        let params = SpreadParams::from(&SpreadQuery::default());
        assert_eq!(params, SpreadParams::default());
        assert_eq!(params.min_spread_bps, 5);
        assert_eq!(params.min_tvl_usd, 0);

        let query = SpreadQuery {
            asset_id: Some(String::new()),
            min_spread_bps: Some("20".to_string()),
            min_tvl: Some("500000".to_string()),
        };
        let params = SpreadParams::from(&query);
        assert_eq!(params.asset_id, None);
        assert_eq!(params.min_spread_bps, 20);
        assert_eq!(params.min_tvl_usd, 500_000);
    }
}
