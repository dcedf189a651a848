use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use eyre::Result;
use log::{info, warn};
use serde::Serialize;
use tokio::net::TcpListener;

use super::params::{OpportunityQuery, SpreadQuery};
use crate::signal::{Opportunity, OpportunityParams, SignalEngine, SpreadParams, SpreadSignal};

/// Source of the request time
pub type Clock = fn() -> DateTime<Utc>;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    /// Feed computation
    engine: Arc<SignalEngine>,
    /// Request time
    clock: Clock,
}

impl AppState {
    /// State using the wall clock
    #[must_use]
    pub fn new(engine: SignalEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            clock: Utc::now,
        }
    }

    /// Replace the clock
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

/// `/api/arbitrage/opportunities` body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunitiesResponse {
    /// Computation time (unix seconds)
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: DateTime<Utc>,
    /// Number of items
    pub count: usize,
    /// Echoed asset filter
    pub asset_id: Option<String>,
    /// Echoed minimum net profit
    pub min_profit_bps: i64,
    /// Echoed minimum TVL
    pub min_tvl: i64,
    /// Notional every figure assumes
    pub assumed_trade_size_usd: f64,
    /// The snapshot store was unreachable
    pub degraded: bool,
    /// Opportunities, best first
    pub items: Vec<Opportunity>,
}

/// `/api/arbitrage/spreads` body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsResponse {
    /// Computation time (unix seconds)
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: DateTime<Utc>,
    /// Number of items
    pub count: usize,
    /// Echoed asset filter
    pub asset_id: Option<String>,
    /// Echoed minimum |spread|
    pub min_spread_bps: i64,
    /// Echoed minimum TVL
    pub min_tvl: i64,
    /// The snapshot store was unreachable
    pub degraded: bool,
    /// Spreads, widest first
    pub items: Vec<SpreadSignal>,
}

/// `/health` body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok" while the process serves requests
    pub status: &'static str,
}

/// Router with every endpoint
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/arbitrage/opportunities", get(get_opportunities))
        .route("/api/arbitrage/spreads", get(get_spreads))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Cost-adjusted opportunity feed
pub async fn get_opportunities(
    State(state): State<AppState>,
    Query(query): Query<OpportunityQuery>,
) -> Json<OpportunitiesResponse> {
    let params = OpportunityParams::from(&query);
    let feed = state.engine.opportunities(&params, (state.clock)()).await;
    info!(
        "api::opportunities: {} items (asset {:?}, min_profit_bps {}, min_tvl {}, degraded {})",
        feed.items.len(),
        params.asset_id,
        params.min_profit_bps,
        params.min_tvl_usd,
        feed.degraded
    );

    Json(OpportunitiesResponse {
        updated_at: feed.generated_at,
        count: feed.items.len(),
        asset_id: params.asset_id,
        min_profit_bps: params.min_profit_bps,
        min_tvl: params.min_tvl_usd,
        assumed_trade_size_usd: state.engine.notional_usd(),
        degraded: feed.degraded,
        items: feed.items,
    })
}

/// Raw spread feed
pub async fn get_spreads(
    State(state): State<AppState>,
    Query(query): Query<SpreadQuery>,
) -> Json<SpreadsResponse> {
    let params = SpreadParams::from(&query);
    let feed = state.engine.spreads(&params, (state.clock)()).await;
    info!(
        "api::spreads: {} items (asset {:?}, min_spread_bps {}, min_tvl {}, degraded {})",
        feed.items.len(),
        params.asset_id,
        params.min_spread_bps,
        params.min_tvl_usd,
        feed.degraded
    );

    Json(SpreadsResponse {
        updated_at: feed.generated_at,
        count: feed.items.len(),
        asset_id: params.asset_id,
        min_spread_bps: params.min_spread_bps,
        min_tvl: params.min_tvl_usd,
        degraded: feed.degraded,
        items: feed.items,
    })
}

/// Liveness probe
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Serve the API on `addr` until ctrl-c.
///
/// # Errors
/// * If the address can't be bound
/// * If the server fails
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("api: listening on {addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("api: stopped");
    Ok(())
}

/// Resolves on ctrl-c
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("api: failed to listen for ctrl-c: {e}");
    }
}
