//! Dispatch control policies.
//!
//! The hourly loop stays strategy-agnostic: it consults a
//! [`DispatchPolicy`] for the charge/discharge decision and applies the
//! physical limits itself.

/// Fraction of the day's running peak import above which the peak-shaving
/// policy starts discharging.
const PEAK_SHAVING_TRIGGER: f64 = 0.7;

/// Read-only view of the dispatch state offered to a policy each hour.
#[derive(Debug, Clone, Copy)]
pub struct DispatchContext {
    /// Hour of day (0-23).
    pub hour: usize,
    /// Current state of charge (kWh).
    pub soc_kwh: f64,
    /// Usable capacity: capacity × depth-of-discharge (kWh).
    pub usable_kwh: f64,
    /// Import tariff rate for this hour.
    pub import_rate: f64,
    /// Highest grid import seen so far today (kW).
    pub running_peak_import_kw: f64,
    /// Import this hour would require without a discharge (kW).
    pub projected_import_kw: f64,
}

/// A battery control strategy: decides *whether* to charge or discharge;
/// the simulation decides *how much* within physical limits.
pub trait DispatchPolicy {
    /// Strategy name for reports.
    fn name(&self) -> &'static str;

    /// Whether to charge from surplus production this hour.
    fn should_charge(&self, ctx: &DispatchContext) -> bool;

    /// Whether to discharge into a deficit this hour.
    fn should_discharge(&self, ctx: &DispatchContext) -> bool;
}

/// Maximize on-site use: charge whenever there is room, discharge
/// whenever there is charge.
#[derive(Debug, Default, Clone, Copy)]
pub struct SelfConsumption;

impl DispatchPolicy for SelfConsumption {
    fn name(&self) -> &'static str {
        "self-consumption"
    }

    fn should_charge(&self, ctx: &DispatchContext) -> bool {
        ctx.soc_kwh < ctx.usable_kwh
    }

    fn should_discharge(&self, ctx: &DispatchContext) -> bool {
        ctx.soc_kwh > 0.0
    }
}

/// Arbitrage against an hourly tariff: charge while electricity is cheap,
/// discharge while it is expensive.
#[derive(Debug, Clone, Copy)]
pub struct TimeOfUse {
    /// Import rate separating cheap from expensive hours.
    pub threshold_rate: f64,
}

impl DispatchPolicy for TimeOfUse {
    fn name(&self) -> &'static str {
        "time-of-use"
    }

    fn should_charge(&self, ctx: &DispatchContext) -> bool {
        ctx.soc_kwh < ctx.usable_kwh && ctx.import_rate < self.threshold_rate
    }

    fn should_discharge(&self, ctx: &DispatchContext) -> bool {
        ctx.soc_kwh > 0.0 && ctx.import_rate >= self.threshold_rate
    }
}

/// Flatten the import peak: always bank surplus, spend it only when the
/// projected import approaches the day's running peak.
#[derive(Debug, Default, Clone, Copy)]
pub struct PeakShaving;

impl DispatchPolicy for PeakShaving {
    fn name(&self) -> &'static str {
        "peak-shaving"
    }

    fn should_charge(&self, _ctx: &DispatchContext) -> bool {
        true
    }

    fn should_discharge(&self, ctx: &DispatchContext) -> bool {
        ctx.running_peak_import_kw > 0.0
            && ctx.projected_import_kw > PEAK_SHAVING_TRIGGER * ctx.running_peak_import_kw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(soc_kwh: f64, import_rate: f64) -> DispatchContext {
        DispatchContext {
            hour: 12,
            soc_kwh,
            usable_kwh: 9.0,
            import_rate,
            running_peak_import_kw: 0.0,
            projected_import_kw: 0.0,
        }
    }

    #[test]
    fn self_consumption_charges_until_full() {
        let policy = SelfConsumption;
        assert!(policy.should_charge(&ctx(4.0, 0.1)));
        assert!(!policy.should_charge(&ctx(9.0, 0.1)));
    }

    #[test]
    fn self_consumption_discharges_while_charged() {
        let policy = SelfConsumption;
        assert!(policy.should_discharge(&ctx(1.0, 0.1)));
        assert!(!policy.should_discharge(&ctx(0.0, 0.1)));
    }

    #[test]
    fn time_of_use_charges_only_below_threshold() {
        let policy = TimeOfUse {
            threshold_rate: 0.20,
        };
        assert!(policy.should_charge(&ctx(4.0, 0.10)));
        assert!(!policy.should_charge(&ctx(4.0, 0.30)));
    }

    #[test]
    fn time_of_use_discharges_only_at_or_above_threshold() {
        let policy = TimeOfUse {
            threshold_rate: 0.20,
        };
        assert!(policy.should_discharge(&ctx(4.0, 0.20)));
        assert!(!policy.should_discharge(&ctx(4.0, 0.10)));
    }

    #[test]
    fn peak_shaving_always_charges() {
        let policy = PeakShaving;
        assert!(policy.should_charge(&ctx(9.0, 0.1)));
    }

    #[test]
    fn peak_shaving_discharges_near_running_peak() {
        let policy = PeakShaving;
        let near_peak = DispatchContext {
            running_peak_import_kw: 5.0,
            projected_import_kw: 4.0,
            ..ctx(4.0, 0.1)
        };
        assert!(policy.should_discharge(&near_peak));

        let well_below = DispatchContext {
            running_peak_import_kw: 5.0,
            projected_import_kw: 2.0,
            ..ctx(4.0, 0.1)
        };
        assert!(!policy.should_discharge(&well_below));
    }

    #[test]
    fn peak_shaving_holds_fire_before_any_import() {
        let policy = PeakShaving;
        let first_import = DispatchContext {
            running_peak_import_kw: 0.0,
            projected_import_kw: 3.0,
            ..ctx(4.0, 0.1)
        };
        assert!(!policy.should_discharge(&first_import));
    }
}
