//! Cash-flow series over the investment horizon.

use crate::error::{SimError, SimResult};

/// Per-year cash flows, indexed by year with year 0 = the investment.
///
/// Index 0 of every vector is the negated net system cost; years 1..=N
/// hold the operating flows. Invariant: `cumulative[0] == -net_system_cost`.
#[derive(Debug, Clone, PartialEq)]
pub struct CashFlowSeries {
    /// Nominal (undiscounted) flow per year.
    pub nominal: Vec<f64>,
    /// Flow discounted to present value.
    pub discounted: Vec<f64>,
    /// Running sum of discounted flows.
    pub cumulative: Vec<f64>,
}

impl CashFlowSeries {
    /// Builds the series from the investment and the operating flows for
    /// years 1..=N.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] for an empty horizon or a
    /// discount rate outside [0, 1).
    pub fn build(
        net_system_cost: f64,
        annual_flows: &[f64],
        discount_rate: f64,
    ) -> SimResult<Self> {
        if annual_flows.is_empty() {
            return Err(SimError::invalid("annual_flows", "horizon must be > 0"));
        }
        if !(0.0..1.0).contains(&discount_rate) {
            return Err(SimError::invalid("discount_rate", "must be in [0, 1)"));
        }

        let mut nominal = Vec::with_capacity(annual_flows.len() + 1);
        let mut discounted = Vec::with_capacity(annual_flows.len() + 1);
        let mut cumulative = Vec::with_capacity(annual_flows.len() + 1);

        nominal.push(-net_system_cost);
        discounted.push(-net_system_cost);
        cumulative.push(-net_system_cost);

        for (index, &flow) in annual_flows.iter().enumerate() {
            let year = (index + 1) as i32;
            let present = flow / (1.0 + discount_rate).powi(year);
            nominal.push(flow);
            discounted.push(present);
            cumulative.push(cumulative[index] + present);
        }

        Ok(Self {
            nominal,
            discounted,
            cumulative,
        })
    }

    /// Number of operating years (excludes year 0).
    pub fn horizon_years(&self) -> usize {
        self.nominal.len() - 1
    }
}
