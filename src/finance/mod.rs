//! Investment analysis: cash-flow series and financial metrics.

/// Per-year nominal/discounted cash flows.
pub mod cashflow;
/// NPV, IRR, LCOE, payback, and the analysis entry point.
pub mod metrics;

pub use cashflow::CashFlowSeries;
pub use metrics::{
    FinancialAnalysis, FinancialInputs, FinancialMetrics, analyze, annualize_daily_savings,
};
