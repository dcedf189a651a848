//! Row types for the three snapshot tables and their domain counterparts.

use bigdecimal::{BigDecimal, ToPrimitive};
use eyre::{eyre, Result};

/// CEX aggregated price snapshots
pub mod cex_price;
/// Current DEX consensus prices
pub mod dex_price;
/// Liquidity pool snapshots
pub mod pool_snapshot;

pub use cex_price::{CexPriceRow, CexPriceSnapshot};
pub use dex_price::{DexPrice, DexPriceRow};
pub use pool_snapshot::{PoolSnapshot, PoolSnapshotRow};

/// Convert a NUMERIC column to `f64`, rejecting values that don't fit.
fn numeric_to_f64(value: &BigDecimal, column: &'static str) -> Result<f64> {
    value
        .to_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| eyre!("{column} value {value} is not representable as f64"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_numeric_to_f64() {
        let value = BigDecimal::from_str("1.0050").unwrap();
        assert!((numeric_to_f64(&value, "avg_price").unwrap() - 1.005).abs() < f64::EPSILON);

        let huge = BigDecimal::from_str("1e400").unwrap();
        let err = numeric_to_f64(&huge, "tvl_usd").unwrap_err();
        assert!(err.to_string().starts_with("tvl_usd value"));
    }
}
