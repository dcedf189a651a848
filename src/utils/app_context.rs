//! Application context for wiring the snapshot store into the engine.
//!
//! The store is either Postgres, through a pooled async connection, or an
//! in-memory fixture loaded from JSON for offline runs.

use std::path::Path;
use std::sync::Arc;

use eyre::{Error, Result};
use log::info;

use crate::config::Config;
use crate::db_service::{MemorySnapshotStore, PgSnapshotStore, SnapshotStore};
use crate::signal::SignalEngine;
use crate::utils::db_connect::build_pool;

/// Application context holding the configuration and the snapshot store.
pub struct AppContext {
    /// Process configuration
    pub config: Config,
    /// Snapshot source shared by every request
    pub store: Arc<dyn SnapshotStore>,
}

impl AppContext {
    /// Creates a context backed by Postgres.
    ///
    /// # Returns
    /// * `Result<Self, Error>` - The initialized context or an error
    ///
    /// # Errors
    /// * If `DATABASE_URL` is not set
    /// * If the pool can't be built
    pub fn postgres(config: Config) -> Result<Self, Error> {
        let pool = build_pool(config.require_database_url()?, config.db_pool_size)?;
        info!("app_context: postgres pool ready (max {} connections)", config.db_pool_size);
        Ok(Self {
            config,
            store: Arc::new(PgSnapshotStore::new(pool)),
        })
    }

    /// Creates a context backed by a JSON fixture.
    ///
    /// # Errors
    /// * If the fixture can't be read or parsed
    pub async fn fixture(config: Config, path: &Path) -> Result<Self, Error> {
        let store = MemorySnapshotStore::load(path).await?;
        Ok(Self {
            config,
            store: Arc::new(store),
        })
    }

    /// Picks the fixture store when a path is given, Postgres otherwise.
    ///
    /// # Errors
    /// * See [`AppContext::postgres`] and [`AppContext::fixture`]
    pub async fn new(config: Config, fixture: Option<&Path>) -> Result<Self, Error> {
        match fixture {
            Some(path) => Self::fixture(config, path).await,
            None => Self::postgres(config),
        }
    }

    /// A signal engine over this context's store
    #[must_use]
    pub fn engine(&self) -> SignalEngine {
        SignalEngine::new(Arc::clone(&self.store), &self.config.engine)
    }
}
