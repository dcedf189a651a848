use async_trait::async_trait;
use bigdecimal::BigDecimal;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::{SnapshotQuery, SnapshotStore, StoreError};
use crate::models::{
    CexPriceRow, CexPriceSnapshot, DexPrice, DexPriceRow, PoolSnapshot, PoolSnapshotRow,
};
use crate::schemas::{cex_price_snapshots, dex_prices, pool_snapshots};
use crate::utils::db_connect::{DbConnection, DbPool};

/// Postgres-backed snapshot store.
#[derive(Clone)]
pub struct PgSnapshotStore {
    /// Connection pool shared with the host
    pool: DbPool,
}

impl PgSnapshotStore {
    /// Wrap an existing pool
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Check a connection out of the pool
    async fn connection(&self) -> Result<DbConnection, StoreError> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Pool(e.to_string()))
    }
}

#[async_trait]
impl SnapshotStore for PgSnapshotStore {
    async fn cex_prices(&self, query: &SnapshotQuery) -> Result<Vec<CexPriceSnapshot>, StoreError> {
        let mut conn = self.connection().await?;

        // DISTINCT ON runs after WHERE, so the age bound applies before the newest row is picked
        let mut statement = cex_price_snapshots::table
            .distinct_on(cex_price_snapshots::asset_id)
            .order((
                cex_price_snapshots::asset_id,
                cex_price_snapshots::observed_at.desc(),
                cex_price_snapshots::id.desc(),
            ))
            .select(CexPriceRow::as_select())
            .into_boxed();

        if let Some(asset_id) = &query.asset_id {
            statement = statement.filter(cex_price_snapshots::asset_id.eq(asset_id.clone()));
        }
        if let Some(since) = query.cex_observed_since {
            statement = statement.filter(cex_price_snapshots::observed_at.ge(since));
        }

        let rows = statement.load::<CexPriceRow>(&mut conn).await?;
        log::debug!("db_service::pg_store: Loaded {} cex price rows", rows.len());
        Ok(convert_rows(rows, "cex_price_snapshots"))
    }

    async fn pool_snapshots(&self, query: &SnapshotQuery) -> Result<Vec<PoolSnapshot>, StoreError> {
        let mut conn = self.connection().await?;

        let mut statement = pool_snapshots::table
            .filter(pool_snapshots::observed_at.ge(query.pool_observed_since))
            .filter(pool_snapshots::tvl_usd.ge(BigDecimal::from(query.min_tvl_usd)))
            .order((pool_snapshots::observed_at.desc(), pool_snapshots::id.desc()))
            .select(PoolSnapshotRow::as_select())
            .into_boxed();

        if let Some(asset_id) = &query.asset_id {
            statement = statement.filter(pool_snapshots::asset_id.eq(asset_id.clone()));
        }

        let rows = statement.load::<PoolSnapshotRow>(&mut conn).await?;
        log::debug!("db_service::pg_store: Loaded {} pool snapshot rows", rows.len());
        Ok(convert_rows(rows, "pool_snapshots"))
    }

    async fn dex_prices(&self, query: &SnapshotQuery) -> Result<Vec<DexPrice>, StoreError> {
        let mut conn = self.connection().await?;

        let mut statement = dex_prices::table
            .order(dex_prices::asset_id.asc())
            .select(DexPriceRow::as_select())
            .into_boxed();

        if let Some(asset_id) = &query.asset_id {
            statement = statement.filter(dex_prices::asset_id.eq(asset_id.clone()));
        }

        let rows = statement.load::<DexPriceRow>(&mut conn).await?;
        Ok(convert_rows(rows, "dex_prices"))
    }
}

/// Convert rows to domain values, skipping (and logging) rows whose numerics don't fit.
fn convert_rows<R, T>(rows: Vec<R>, table: &str) -> Vec<T>
where
    T: TryFrom<R, Error = eyre::Report>,
{
    rows.into_iter()
        .filter_map(|row| match T::try_from(row) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("db_service::pg_store: Skipping {table} row: {e}");
                None
            }
        })
        .collect()
}
