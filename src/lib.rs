/*!
 * # Spreadwatch - DEX/CEX Spread Detection
 *
 * Spreadwatch reconciles three independently updated price feeds (liquidity
 * pool snapshots, aggregated centralized exchange prices and the current
 * on-chain consensus price) and turns them into ranked trading signals.
 *
 * ## Core Features
 *
 * - **Reconciliation**: Joins the freshest pool snapshot per pool with the newest CEX price
 * - **Cost Model**: Prices gas, pool fees, CEX fees and slippage in basis points
 * - **Scoring**: Ranks opportunities by net profit with confidence tiers and tags
 * - **Degraded Mode**: An unreachable store yields flagged, empty feeds instead of errors
 *
 * ## Module Structure
 *
 * - `api`: HTTP routes and query parsing
 * - `config`: Configuration management for the system
 * - `db_service`: Snapshot store trait with Postgres and in-memory implementations
 * - `models`: Data models for the application
 * - `schemas`: Database schema definitions
 * - `signal`: Reconciliation, cost model and scoring
 * - `utils`: Utility functions and helpers
 */

/// HTTP routes and query parsing
pub mod api;
/// Configuration management for the system
pub mod config;
/// Snapshot store access
pub mod db_service;
/// Data models for the application
pub mod models;
/// Database schema definitions
pub mod schemas;
/// Reconciliation, cost model and scoring
pub mod signal;
/// Utility functions and helpers
pub mod utils;
