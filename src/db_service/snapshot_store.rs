use async_trait::async_trait;
use thiserror::Error;

use super::SnapshotQuery;
use crate::models::{CexPriceSnapshot, DexPrice, PoolSnapshot};

/// Failures reading the snapshot tables.
///
/// None of these reach API callers: the reconciler turns them into an empty,
/// degraded result.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Couldn't check a connection out of the pool
    #[error("snapshot store unavailable: {0}")]
    Pool(String),
    /// The query itself failed
    #[error("snapshot query failed: {0}")]
    Query(#[from] diesel::result::Error),
    /// The store reported itself down
    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),
}

/// Read-only access to the three snapshot views.
///
/// Implementations apply every filter in the query. "Newest" means the
/// greatest `(observed_at, id)`.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Newest admitted CEX price snapshot per asset, ordered by asset id
    async fn cex_prices(&self, query: &SnapshotQuery) -> Result<Vec<CexPriceSnapshot>, StoreError>;

    /// Fresh pool snapshots above the TVL floor, newest first
    async fn pool_snapshots(&self, query: &SnapshotQuery) -> Result<Vec<PoolSnapshot>, StoreError>;

    /// Current DEX consensus prices
    async fn dex_prices(&self, query: &SnapshotQuery) -> Result<Vec<DexPrice>, StoreError>;
}
