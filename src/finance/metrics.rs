//! Investment metrics: payback, NPV, IRR, ROI, and LCOE.

use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::finance::cashflow::CashFlowSeries;

/// IRR scan bounds and resolution.
const IRR_SCAN_MIN: f64 = -0.5;
const IRR_SCAN_MAX: f64 = 1.0;
const IRR_SCAN_STEP: f64 = 1e-4;

/// Inputs to the financial analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinancialInputs {
    /// System cost after incentives.
    pub net_system_cost: f64,
    /// Energy-bill savings plus feed-in revenue in year 1.
    pub annual_revenue_year1: f64,
    /// Yearly operation and maintenance cost (flat).
    pub annual_maintenance: f64,
    /// Yearly electricity price inflation (fraction).
    pub price_inflation: f64,
    /// Discount rate for present-value calculations (fraction, [0, 1)).
    pub discount_rate: f64,
    /// Yearly production degradation (fraction, [0, 1)).
    pub degradation_rate: f64,
    /// Analysis horizon in years.
    pub horizon_years: usize,
}

impl FinancialInputs {
    /// Checks all inputs before any computation proceeds.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] naming the first offending
    /// field.
    pub fn validate(&self) -> SimResult<()> {
        if self.net_system_cost <= 0.0 {
            return Err(SimError::invalid("net_system_cost", "must be > 0"));
        }
        if self.annual_maintenance < 0.0 {
            return Err(SimError::invalid("annual_maintenance", "must be >= 0"));
        }
        if !(0.0..1.0).contains(&self.discount_rate) {
            return Err(SimError::invalid("discount_rate", "must be in [0, 1)"));
        }
        if !(0.0..1.0).contains(&self.degradation_rate) {
            return Err(SimError::invalid("degradation_rate", "must be in [0, 1)"));
        }
        if self.price_inflation < 0.0 || self.price_inflation >= 1.0 {
            return Err(SimError::invalid("price_inflation", "must be in [0, 1)"));
        }
        if self.horizon_years == 0 {
            return Err(SimError::invalid("horizon_years", "must be > 0"));
        }
        Ok(())
    }

    /// Net operating cash flow for years 1..=horizon: year-1 revenue
    /// compounded by price inflation and shrunk by production
    /// degradation, minus flat maintenance.
    pub fn annual_cash_flows(&self) -> Vec<f64> {
        (0..self.horizon_years)
            .map(|index| {
                let growth = (1.0 + self.price_inflation).powi(index as i32);
                let fade = (1.0 - self.degradation_rate).powi(index as i32);
                self.annual_revenue_year1 * growth * fade - self.annual_maintenance
            })
            .collect()
    }
}

/// Summary investment metrics. Payback fields are `f64::INFINITY` when
/// the investment never recovers; IRR is `None` when the scan finds no
/// root.
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialMetrics {
    pub net_system_cost: f64,
    /// Years to recover the cost from undiscounted year-1 net revenue.
    pub payback_years: f64,
    /// Years until the cumulative discounted cash flow turns positive.
    pub discounted_payback_years: f64,
    /// Net present value over the horizon.
    pub npv: f64,
    /// Internal rate of return, if the bounded scan finds one.
    pub irr: Option<f64>,
    /// Cumulative discounted return over net cost.
    pub roi: f64,
    /// Levelized cost of energy (currency per kWh).
    pub lcoe: f64,
}

/// Metrics together with the cash-flow series they were derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialAnalysis {
    pub metrics: FinancialMetrics,
    pub cash_flows: CashFlowSeries,
}

/// Runs the full financial analysis.
///
/// `annual_energy_year1_kwh` is the production feeding the LCOE
/// denominator; it degrades yearly by the configured rate.
///
/// # Errors
///
/// Returns [`SimError::InvalidParameter`] for out-of-range inputs or
/// non-positive first-year energy.
pub fn analyze(
    inputs: &FinancialInputs,
    annual_energy_year1_kwh: f64,
) -> SimResult<FinancialAnalysis> {
    inputs.validate()?;
    if annual_energy_year1_kwh <= 0.0 {
        return Err(SimError::invalid("annual_energy_year1_kwh", "must be > 0"));
    }

    let flows = inputs.annual_cash_flows();
    let cash_flows = CashFlowSeries::build(inputs.net_system_cost, &flows, inputs.discount_rate)?;

    let npv = net_present_value(inputs.net_system_cost, &flows, inputs.discount_rate);
    let irr = internal_rate_of_return(inputs.net_system_cost, &flows);
    let roi = (npv + inputs.net_system_cost) / inputs.net_system_cost;

    let metrics = FinancialMetrics {
        net_system_cost: inputs.net_system_cost,
        payback_years: simple_payback(inputs),
        discounted_payback_years: discounted_payback(&cash_flows),
        npv,
        irr,
        roi,
        lcoe: levelized_cost(inputs, annual_energy_year1_kwh),
    };

    debug!(npv = metrics.npv, irr = ?metrics.irr, "financial analysis complete");
    Ok(FinancialAnalysis {
        metrics,
        cash_flows,
    })
}

/// Net cost over undiscounted year-1 net revenue; infinite when the
/// denominator is not positive.
fn simple_payback(inputs: &FinancialInputs) -> f64 {
    let year1_net = inputs.annual_revenue_year1 - inputs.annual_maintenance;
    if year1_net <= 0.0 {
        f64::INFINITY
    } else {
        inputs.net_system_cost / year1_net
    }
}

/// First year the cumulative discounted cash flow crosses zero, linearly
/// interpolated within that year; infinite if it never crosses within
/// the horizon.
fn discounted_payback(series: &CashFlowSeries) -> f64 {
    for year in 1..series.cumulative.len() {
        if series.cumulative[year] >= 0.0 {
            let recovered_in_year = series.discounted[year];
            let shortfall = -series.cumulative[year - 1];
            let fraction = if recovered_in_year > 0.0 {
                shortfall / recovered_in_year
            } else {
                0.0
            };
            return (year - 1) as f64 + fraction;
        }
    }
    f64::INFINITY
}

/// Net present value of the investment at the given rate.
fn net_present_value(net_system_cost: f64, flows: &[f64], rate: f64) -> f64 {
    let mut npv = -net_system_cost;
    for (index, &flow) in flows.iter().enumerate() {
        npv += flow / (1.0 + rate).powi((index + 1) as i32);
    }
    npv
}

/// Bounded fixed-resolution IRR scan over [-50%, +100%].
///
/// Walks the grid until NPV changes sign, then interpolates within that
/// step and accepts the rate if |NPV| lands under tolerance. The first
/// crossing wins: cash flows with more than one sign change may have
/// further roots this search never reports, and a never-positive NPV
/// yields `None`.
fn internal_rate_of_return(net_system_cost: f64, flows: &[f64]) -> Option<f64> {
    let tolerance = net_system_cost * 1e-5;
    let mut rate = IRR_SCAN_MIN;
    let mut previous = net_present_value(net_system_cost, flows, rate);
    if previous.abs() < tolerance {
        return Some(rate);
    }

    while rate < IRR_SCAN_MAX {
        let next_rate = rate + IRR_SCAN_STEP;
        let current = net_present_value(net_system_cost, flows, next_rate);
        if current.abs() < tolerance {
            return Some(next_rate);
        }
        if previous.signum() != current.signum() {
            let fraction = previous / (previous - current);
            let root = rate + IRR_SCAN_STEP * fraction;
            if net_present_value(net_system_cost, flows, root).abs() < tolerance {
                return Some(root);
            }
        }
        rate = next_rate;
        previous = current;
    }
    None
}

/// Lifetime discounted cost over lifetime discounted production.
fn levelized_cost(inputs: &FinancialInputs, annual_energy_year1_kwh: f64) -> f64 {
    let rate = inputs.discount_rate;
    let mut discounted_cost = inputs.net_system_cost;
    let mut discounted_energy = 0.0;
    for year in 1..=inputs.horizon_years {
        let factor = (1.0 + rate).powi(year as i32);
        discounted_cost += inputs.annual_maintenance / factor;
        discounted_energy += annual_energy_year1_kwh
            * (1.0 - inputs.degradation_rate).powi((year - 1) as i32)
            / factor;
    }
    discounted_cost / discounted_energy
}

/// Annualizes the daily cost advantage of one dispatch setup over
/// another, for layering battery economics on top of the PV case.
pub fn annualize_daily_savings(baseline_daily_cost: f64, candidate_daily_cost: f64) -> f64 {
    (baseline_daily_cost - candidate_daily_cost) * 365.0
}
