use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use eyre::{Error, Result};
use log::{info, warn};
use serde::Serialize;

use spreadwatch::api::{serve, AppState};
use spreadwatch::config::Config;
use spreadwatch::signal::engine::{
    DEFAULT_MIN_PROFIT_BPS, DEFAULT_MIN_SPREAD_BPS, DEFAULT_MIN_TVL_USD,
};
use spreadwatch::signal::{OpportunityParams, SpreadParams};
use spreadwatch::utils::app_context::AppContext;
use spreadwatch::utils::logger::setup_logger;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Read snapshots from a JSON fixture instead of Postgres
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API (default)
    Serve,
    /// Print the spread feed once as JSON
    Spreads(SpreadArgs),
    /// Print the opportunity feed once as JSON
    Opportunities(OpportunityArgs),
}

#[derive(Args)]
struct SpreadArgs {
    /// Restrict to one asset
    #[arg(long)]
    asset_id: Option<String>,
    /// Minimum |spread| in bps
    #[arg(long, default_value_t = DEFAULT_MIN_SPREAD_BPS)]
    min_spread_bps: i64,
    /// Minimum pool TVL in USD
    #[arg(long, default_value_t = 0)]
    min_tvl: i64,
}

#[derive(Args)]
struct OpportunityArgs {
    /// Restrict to one asset
    #[arg(long)]
    asset_id: Option<String>,
    /// Minimum net profit in bps
    #[arg(long, default_value_t = DEFAULT_MIN_PROFIT_BPS)]
    min_profit_bps: i64,
    /// Minimum pool TVL in USD
    #[arg(long, default_value_t = DEFAULT_MIN_TVL_USD)]
    min_tvl: i64,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Error> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

async fn print_spreads(ctx: &AppContext, args: SpreadArgs) -> Result<(), Error> {
    let params = SpreadParams {
        asset_id: args.asset_id,
        min_spread_bps: args.min_spread_bps.max(0),
        min_tvl_usd: args.min_tvl.max(0),
    };
    let feed = ctx.engine().spreads(&params, Utc::now()).await;
    if feed.degraded {
        warn!("Snapshot store unavailable, feed is empty");
    }
    print_json(&feed.items)
}

async fn print_opportunities(ctx: &AppContext, args: OpportunityArgs) -> Result<(), Error> {
    let params = OpportunityParams {
        asset_id: args.asset_id,
        min_profit_bps: args.min_profit_bps.max(0),
        min_tvl_usd: args.min_tvl.max(0),
    };
    let feed = ctx.engine().opportunities(&params, Utc::now()).await;
    if feed.degraded {
        warn!("Snapshot store unavailable, feed is empty");
    }
    print_json(&feed.items)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    setup_logger()?;

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let ctx = AppContext::new(config, cli.fixture.as_deref()).await?;

    match cli.command {
        Some(Commands::Spreads(args)) => print_spreads(&ctx, args).await?,
        Some(Commands::Opportunities(args)) => print_opportunities(&ctx, args).await?,
        Some(Commands::Serve) | None => {
            info!("Server starting on {}", ctx.config.bind_addr);
            serve(AppState::new(ctx.engine()), ctx.config.bind_addr).await?;
        }
    }

    Ok(())
}
