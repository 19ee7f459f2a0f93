//! 24-hour stateful battery dispatch simulation.
//!
//! Single forward pass, hour 0 to 23, no backtracking. The loop owns the
//! energy balance and the physical limits; charge/discharge decisions are
//! delegated to a [`DispatchPolicy`]. Identical inputs produce
//! bit-for-bit identical outputs — there is no randomness anywhere in the
//! dispatch algorithm.

use tracing::debug;

use crate::battery::policy::{DispatchContext, DispatchPolicy};
use crate::error::{SimError, SimResult};
use crate::tariff::TariffSchedule;

/// Electrical and lifetime parameters of the storage system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryParameters {
    /// Nameplate capacity (kWh).
    pub capacity_kwh: f64,
    /// Maximum charging power (kW).
    pub max_charge_kw: f64,
    /// Maximum discharging power (kW).
    pub max_discharge_kw: f64,
    /// Round-trip efficiency (0..1], applied on charge.
    pub round_trip_efficiency: f64,
    /// Usable fraction of nameplate capacity (0..1].
    pub depth_of_discharge: f64,
    /// Rated cycle life (full equivalent cycles).
    pub cycle_life: u32,
}

impl BatteryParameters {
    /// Creates validated parameters.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] on non-positive capacity or
    /// power limits, or efficiency/depth-of-discharge outside (0, 1].
    pub fn new(
        capacity_kwh: f64,
        max_charge_kw: f64,
        max_discharge_kw: f64,
        round_trip_efficiency: f64,
        depth_of_discharge: f64,
        cycle_life: u32,
    ) -> SimResult<Self> {
        if capacity_kwh <= 0.0 {
            return Err(SimError::invalid("battery.capacity_kwh", "must be > 0"));
        }
        if max_charge_kw <= 0.0 || max_discharge_kw <= 0.0 {
            return Err(SimError::invalid("battery.power_limits", "must be > 0"));
        }
        if !(0.0..=1.0).contains(&round_trip_efficiency) || round_trip_efficiency == 0.0 {
            return Err(SimError::invalid(
                "battery.round_trip_efficiency",
                "must be in (0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&depth_of_discharge) || depth_of_discharge == 0.0 {
            return Err(SimError::invalid(
                "battery.depth_of_discharge",
                "must be in (0, 1]",
            ));
        }
        Ok(Self {
            capacity_kwh,
            max_charge_kw,
            max_discharge_kw,
            round_trip_efficiency,
            depth_of_discharge,
            cycle_life,
        })
    }

    /// Usable capacity: nameplate × depth-of-discharge (kWh).
    pub fn usable_kwh(&self) -> f64 {
        self.capacity_kwh * self.depth_of_discharge
    }
}

/// Grid connection limits (kW). Import and export are independent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLimits {
    pub import_kw: f64,
    pub export_kw: f64,
}

impl GridLimits {
    /// Creates validated limits.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] on negative limits.
    pub fn new(import_kw: f64, export_kw: f64) -> SimResult<Self> {
        if import_kw < 0.0 || export_kw < 0.0 {
            return Err(SimError::invalid("grid_limits", "must be >= 0"));
        }
        Ok(Self {
            import_kw,
            export_kw,
        })
    }

    /// An unconstrained grid connection.
    pub fn unlimited() -> Self {
        Self {
            import_kw: f64::INFINITY,
            export_kw: f64::INFINITY,
        }
    }
}

/// Complete record of one simulated dispatch day. Immutable value.
///
/// All per-hour arrays are in kWh for that hour. The five energy-flow
/// arrays decompose every kWh by its route; curtailment and unserved load
/// are tracked separately so neither is silently dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchResult {
    /// Energy charged into the battery per hour.
    pub charge_kwh: [f64; 24],
    /// Energy discharged from the battery per hour.
    pub discharge_kwh: [f64; 24],
    /// State of charge at the end of each hour.
    pub soc_kwh: [f64; 24],
    /// Grid import per hour.
    pub grid_import_kwh: [f64; 24],
    /// Grid export per hour.
    pub grid_export_kwh: [f64; 24],
    /// Production consumed directly by the load.
    pub pv_to_load_kwh: [f64; 24],
    /// Production banked into the battery.
    pub pv_to_battery_kwh: [f64; 24],
    /// Battery energy serving the load.
    pub battery_to_load_kwh: [f64; 24],
    /// Production exported to the grid.
    pub pv_to_grid_kwh: [f64; 24],
    /// Grid energy serving the load.
    pub grid_to_load_kwh: [f64; 24],
    /// Surplus lost to the export limit.
    pub curtailed_kwh: [f64; 24],
    /// Load left unserved by the import limit.
    pub unserved_kwh: [f64; 24],
    /// Fraction of production consumed on-site (directly or via battery).
    pub self_consumption_rate: f64,
    /// Fraction of load met without grid import.
    pub self_sufficiency_rate: f64,
    /// Import cost minus export revenue over the day.
    pub daily_cost: f64,
    /// Equivalent full cycles: one full charge plus one full discharge
    /// counts as 1.0.
    pub equivalent_cycles: f64,
}

impl DispatchResult {
    /// Total unserved load over the day (kWh).
    pub fn total_unserved_kwh(&self) -> f64 {
        self.unserved_kwh.iter().sum()
    }

    /// Total curtailed surplus over the day (kWh).
    pub fn total_curtailed_kwh(&self) -> f64 {
        self.curtailed_kwh.iter().sum()
    }

    /// State of charge after the final hour (kWh).
    pub fn ending_soc_kwh(&self) -> f64 {
        self.soc_kwh[23]
    }
}

/// Simulates one day of battery dispatch.
///
/// `production_kwh` and `load_kwh` are per-hour energies. The state of
/// charge starts at 50% of usable capacity. Surplus hours serve the load
/// from production, then charge (policy permitting), then export up to
/// the grid limit; anything beyond is curtailed. Deficit hours drain
/// production, then the battery (policy permitting), then import up to
/// the grid limit; anything beyond is recorded as unserved load.
pub fn simulate_day(
    production_kwh: &[f64; 24],
    load_kwh: &[f64; 24],
    params: &BatteryParameters,
    policy: &dyn DispatchPolicy,
    tariff: &TariffSchedule,
    limits: &GridLimits,
) -> DispatchResult {
    let usable = params.usable_kwh();
    let mut soc = 0.5 * usable;
    let mut running_peak_import = 0.0_f64;

    let mut result = DispatchResult {
        charge_kwh: [0.0; 24],
        discharge_kwh: [0.0; 24],
        soc_kwh: [0.0; 24],
        grid_import_kwh: [0.0; 24],
        grid_export_kwh: [0.0; 24],
        pv_to_load_kwh: [0.0; 24],
        pv_to_battery_kwh: [0.0; 24],
        battery_to_load_kwh: [0.0; 24],
        pv_to_grid_kwh: [0.0; 24],
        grid_to_load_kwh: [0.0; 24],
        curtailed_kwh: [0.0; 24],
        unserved_kwh: [0.0; 24],
        self_consumption_rate: 0.0,
        self_sufficiency_rate: 0.0,
        daily_cost: 0.0,
        equivalent_cycles: 0.0,
    };

    for hour in 0..24 {
        let production = production_kwh[hour];
        let load = load_kwh[hour];
        let balance = production - load;

        if balance > 0.0 {
            // Surplus: load is fully served from production.
            result.pv_to_load_kwh[hour] = load;
            let mut surplus = balance;

            let ctx = DispatchContext {
                hour,
                soc_kwh: soc,
                usable_kwh: usable,
                import_rate: tariff.import_rate(hour),
                running_peak_import_kw: running_peak_import,
                projected_import_kw: 0.0,
            };
            if policy.should_charge(&ctx) {
                let charge = surplus.min(params.max_charge_kw).min(usable - soc);
                if charge > 0.0 {
                    soc += charge * params.round_trip_efficiency;
                    surplus -= charge;
                    result.charge_kwh[hour] = charge;
                    result.pv_to_battery_kwh[hour] = charge;
                }
            }

            let export = surplus.min(limits.export_kw);
            // Beyond the export limit the surplus is lost, not queued.
            result.curtailed_kwh[hour] = surplus - export;
            result.grid_export_kwh[hour] = export;
            result.pv_to_grid_kwh[hour] = export;
        } else {
            // Deficit: production covers what it can.
            result.pv_to_load_kwh[hour] = production;
            let mut deficit = -balance;

            let ctx = DispatchContext {
                hour,
                soc_kwh: soc,
                usable_kwh: usable,
                import_rate: tariff.import_rate(hour),
                running_peak_import_kw: running_peak_import,
                projected_import_kw: deficit,
            };
            if policy.should_discharge(&ctx) {
                let discharge = deficit.min(params.max_discharge_kw).min(soc);
                if discharge > 0.0 {
                    soc -= discharge;
                    deficit -= discharge;
                    result.discharge_kwh[hour] = discharge;
                    result.battery_to_load_kwh[hour] = discharge;
                }
            }

            let import = deficit.min(limits.import_kw);
            // Load beyond the import limit goes unserved and is tracked.
            result.unserved_kwh[hour] = deficit - import;
            result.grid_import_kwh[hour] = import;
            result.grid_to_load_kwh[hour] = import;
            running_peak_import = running_peak_import.max(import);
        }

        result.soc_kwh[hour] = soc;
        result.daily_cost += result.grid_import_kwh[hour] * tariff.import_rate(hour)
            - result.grid_export_kwh[hour] * tariff.export_rate;
        result.equivalent_cycles += (result.charge_kwh[hour] + result.discharge_kwh[hour])
            / (2.0 * params.capacity_kwh);
    }

    let total_production: f64 = production_kwh.iter().sum();
    let total_load: f64 = load_kwh.iter().sum();
    let total_import: f64 = result.grid_import_kwh.iter().sum();
    let consumed_on_site: f64 = result.pv_to_load_kwh.iter().sum::<f64>()
        + result.pv_to_battery_kwh.iter().sum::<f64>();

    result.self_consumption_rate = if total_production > 0.0 {
        consumed_on_site / total_production
    } else {
        0.0
    };
    result.self_sufficiency_rate = if total_load > 0.0 {
        (total_load - total_import) / total_load
    } else {
        0.0
    };

    debug!(
        policy = policy.name(),
        daily_cost = result.daily_cost,
        cycles = result.equivalent_cycles,
        "dispatch day complete"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battery::policy::{PeakShaving, SelfConsumption, TimeOfUse};

    fn battery() -> BatteryParameters {
        BatteryParameters::new(10.0, 5.0, 5.0, 1.0, 0.9, 6000).unwrap()
    }

    fn flat_tariff() -> TariffSchedule {
        TariffSchedule::flat(0.25, 0.08).unwrap()
    }

    /// Production exceeds load every hour.
    fn sunny_surplus() -> ([f64; 24], [f64; 24]) {
        let production = [3.0; 24];
        let load = [1.0; 24];
        (production, load)
    }

    /// Load exceeds production every hour.
    fn dark_deficit() -> ([f64; 24], [f64; 24]) {
        let production = [0.0; 24];
        let load = [2.0; 24];
        (production, load)
    }

    #[test]
    fn rejects_non_positive_capacity() {
        assert!(BatteryParameters::new(0.0, 5.0, 5.0, 0.95, 0.9, 6000).is_err());
    }

    #[test]
    fn rejects_depth_of_discharge_above_one() {
        assert!(BatteryParameters::new(10.0, 5.0, 5.0, 0.95, 1.1, 6000).is_err());
    }

    #[test]
    fn usable_capacity_applies_depth_of_discharge() {
        assert!((battery().usable_kwh() - 9.0).abs() < 1e-12);
    }

    #[test]
    fn permanent_surplus_fills_battery_to_usable_capacity() {
        let (production, load) = sunny_surplus();
        let result = simulate_day(
            &production,
            &load,
            &battery(),
            &SelfConsumption,
            &flat_tariff(),
            &GridLimits::unlimited(),
        );
        assert_eq!(result.ending_soc_kwh(), 9.0);
        assert_eq!(result.total_unserved_kwh(), 0.0);
        // Charging is surplus-limited: 2 kWh/h until usable capacity.
        assert_eq!(result.charge_kwh[0], 2.0);
        assert_eq!(result.charge_kwh[2], 0.5);
        assert_eq!(result.charge_kwh[3], 0.0);
    }

    #[test]
    fn soc_stays_within_bounds_every_hour() {
        let production = [
            0.0, 0.0, 0.0, 0.0, 0.0, 0.5, 1.5, 3.0, 4.5, 5.5, 6.0, 6.2, 6.0, 5.5, 4.5, 3.0, 1.5,
            0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
        ];
        let load = [
            0.8, 0.7, 0.7, 0.7, 0.8, 1.0, 1.5, 2.0, 1.5, 1.2, 1.0, 1.0, 1.1, 1.0, 1.2, 1.5, 2.0,
            2.8, 3.2, 3.0, 2.5, 1.8, 1.2, 0.9,
        ];
        let params = BatteryParameters::new(10.0, 3.0, 3.0, 0.92, 0.85, 6000).unwrap();
        for policy in [
            &SelfConsumption as &dyn DispatchPolicy,
            &TimeOfUse {
                threshold_rate: 0.2,
            },
            &PeakShaving,
        ] {
            let result = simulate_day(
                &production,
                &load,
                &params,
                policy,
                &TariffSchedule::new(0.10, 0.30, 17, 21, 0.05).unwrap(),
                &GridLimits::unlimited(),
            );
            for hour in 0..24 {
                assert!(
                    result.soc_kwh[hour] >= 0.0 && result.soc_kwh[hour] <= params.usable_kwh(),
                    "{}: SoC out of bounds at hour {hour}: {}",
                    policy.name(),
                    result.soc_kwh[hour]
                );
            }
        }
    }

    #[test]
    fn deficit_day_discharges_then_imports() {
        let (production, load) = dark_deficit();
        let result = simulate_day(
            &production,
            &load,
            &battery(),
            &SelfConsumption,
            &flat_tariff(),
            &GridLimits::unlimited(),
        );
        // 4.5 kWh of initial charge serves the first hours.
        assert_eq!(result.discharge_kwh[0], 2.0);
        assert_eq!(result.grid_import_kwh[0], 0.0);
        assert!(result.soc_kwh[23] == 0.0);
        let total_import: f64 = result.grid_import_kwh.iter().sum();
        assert!((total_import - (48.0 - 4.5)).abs() < 1e-9);
    }

    #[test]
    fn export_limit_curtails_surplus() {
        let (production, load) = sunny_surplus();
        let limits = GridLimits::new(10.0, 0.5).unwrap();
        let result = simulate_day(
            &production,
            &load,
            &battery(),
            &SelfConsumption,
            &flat_tariff(),
            &limits,
        );
        // Once the battery is full, 2 kWh/h of surplus meets a 0.5 kW cap.
        assert!(result.total_curtailed_kwh() > 0.0);
        for hour in 0..24 {
            assert!(result.grid_export_kwh[hour] <= 0.5 + 1e-12);
        }
    }

    #[test]
    fn import_limit_leaves_load_unserved() {
        let (production, load) = dark_deficit();
        let limits = GridLimits::new(1.0, 10.0).unwrap();
        let result = simulate_day(
            &production,
            &load,
            &battery(),
            &SelfConsumption,
            &flat_tariff(),
            &limits,
        );
        // After the battery empties, 2 kWh/h of load meets a 1 kW cap.
        assert!(result.total_unserved_kwh() > 0.0);
        for hour in 0..24 {
            assert!(result.grid_import_kwh[hour] <= 1.0 + 1e-12);
        }
    }

    #[test]
    fn round_trip_efficiency_shrinks_stored_energy() {
        let (production, load) = sunny_surplus();
        let lossy = BatteryParameters::new(10.0, 5.0, 5.0, 0.9, 0.9, 6000).unwrap();
        let result = simulate_day(
            &production,
            &load,
            &lossy,
            &SelfConsumption,
            &flat_tariff(),
            &GridLimits::unlimited(),
        );
        // First hour: charge 2.0 kWh stores 1.8 kWh on top of 4.5.
        assert!((result.soc_kwh[0] - 6.3).abs() < 1e-9);
    }

    #[test]
    fn time_of_use_waits_for_peak_hours() {
        let production = [0.0; 24];
        let load = [1.0; 24];
        let tariff = TariffSchedule::new(0.10, 0.40, 18, 22, 0.05).unwrap();
        let policy = TimeOfUse {
            threshold_rate: 0.25,
        };
        let result = simulate_day(
            &production,
            &load,
            &battery(),
            &policy,
            &tariff,
            &GridLimits::unlimited(),
        );
        // Off-peak deficit hours import; the battery is saved for the peak.
        for hour in 0..18 {
            assert_eq!(result.discharge_kwh[hour], 0.0, "hour {hour}");
        }
        assert!(result.discharge_kwh[18] > 0.0);
    }

    #[test]
    fn equivalent_cycles_count_full_round_trip_as_one() {
        // Charge 5 kWh then discharge 5 kWh on a 10 kWh battery: 0.5 cycles.
        let mut production = [0.0; 24];
        let mut load = [0.0; 24];
        production[6] = 5.0;
        load[18] = 5.0;
        let params = BatteryParameters::new(10.0, 5.0, 5.0, 1.0, 1.0, 6000).unwrap();
        let result = simulate_day(
            &production,
            &load,
            &params,
            &SelfConsumption,
            &flat_tariff(),
            &GridLimits::unlimited(),
        );
        assert!((result.equivalent_cycles - 0.5).abs() < 1e-9);
    }

    #[test]
    fn self_consumption_and_sufficiency_rates() {
        let (production, load) = sunny_surplus();
        let result = simulate_day(
            &production,
            &load,
            &battery(),
            &SelfConsumption,
            &flat_tariff(),
            &GridLimits::unlimited(),
        );
        // All load served by PV, no imports.
        assert!((result.self_sufficiency_rate - 1.0).abs() < 1e-12);
        // 24 kWh direct + 4.5 kWh banked, out of 72 kWh produced.
        assert!((result.self_consumption_rate - 28.5 / 72.0).abs() < 1e-9);
    }

    #[test]
    fn zero_production_day_has_zero_self_consumption_rate() {
        let (production, load) = dark_deficit();
        let result = simulate_day(
            &production,
            &load,
            &battery(),
            &SelfConsumption,
            &flat_tariff(),
            &GridLimits::unlimited(),
        );
        assert_eq!(result.self_consumption_rate, 0.0);
    }

    #[test]
    fn dispatch_is_bit_for_bit_deterministic() {
        let production = [
            0.0, 0.0, 0.0, 0.0, 0.0, 0.5, 1.5, 3.0, 4.5, 5.5, 6.0, 6.2, 6.0, 5.5, 4.5, 3.0, 1.5,
            0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
        ];
        let load = [1.1; 24];
        let run = || {
            simulate_day(
                &production,
                &load,
                &battery(),
                &PeakShaving,
                &TariffSchedule::new(0.10, 0.30, 17, 21, 0.05).unwrap(),
                &GridLimits::new(4.0, 3.0).unwrap(),
            )
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn peak_shaving_discharges_against_evening_peak() {
        // Morning deficit sets the running peak; evening deficit projected
        // above 70% of it triggers a discharge.
        let mut production = [0.0; 24];
        production[10] = 6.0;
        let mut load = [0.5; 24];
        load[7] = 4.0;
        load[19] = 3.5;
        let result = simulate_day(
            &production,
            &load,
            &battery(),
            &PeakShaving,
            &flat_tariff(),
            &GridLimits::unlimited(),
        );
        assert!(result.discharge_kwh[19] > 0.0);
        assert!(result.grid_import_kwh[19] < 3.5);
    }
}
