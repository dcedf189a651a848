//! Spread and opportunity computation over stored snapshots.
//!
//! [`reconciler`] joins the three snapshot sources, [`cost_model`] prices a
//! round trip and [`scorer`] turns quotes into ranked feeds. [`engine`] ties
//! them together per request.

pub mod cost_model;
pub mod engine;
pub mod reconciler;
pub mod scorer;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use cost_model::{CostModel, FeeRule, FeeSchedule, GasTable, LinearSlippage, SlippageModel};
pub use engine::{
    Feed, OpportunityFeed, OpportunityParams, SignalEngine, SpreadFeed, SpreadParams,
};
pub use reconciler::PriceReconciler;
pub use scorer::{ConfidenceThresholds, SignalScorer, TagThresholds};
pub use types::{
    Confidence, CostBreakdown, Opportunity, QuoteSummary, ReconciledQuote, Reconciliation,
    SignalTag, SpreadDirection, SpreadSignal, TradeDirection,
};
