//! ---
//! ems_section: "02-quote-engine"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Solar sizing and cost-estimation routines."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Cost composition in USD.
//!
//! The order is fixed: equipment, fixed installation and transport form the
//! subtotal, the sector multiplier adjusts it, then the variable costs are
//! applied as a waterfall (`utilidad`, `comision`, `it`, `iva`). Every
//! intermediate figure is kept so the total can be re-derived from the ledger.
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{CostBase, FixedInstallationCosts, VariableCostRates, VariableRate};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquipmentCosts {
    pub panels: f64,
    pub inverter: f64,
    pub battery: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedCostBreakdown {
    #[serde(flatten)]
    pub items: FixedInstallationCosts,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariableCostLine {
    pub rate: f64,
    pub base: CostBase,
    pub base_amount: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableCostBreakdown {
    pub utilidad: VariableCostLine,
    pub comision: VariableCostLine,
    pub it: VariableCostLine,
    pub iva: VariableCostLine,
    pub total: f64,
}

impl VariableCostBreakdown {
    pub fn lines(&self) -> [(&'static str, &VariableCostLine); 4] {
        [
            ("utilidad", &self.utilidad),
            ("comision", &self.comision),
            ("it", &self.it),
            ("iva", &self.iva),
        ]
    }

    fn rates(&self) -> VariableCostRates {
        let rate = |line: &VariableCostLine| VariableRate {
            rate: line.rate,
            base: line.base,
        };
        VariableCostRates {
            utilidad: rate(&self.utilidad),
            comision: rate(&self.comision),
            it: rate(&self.it),
            iva: rate(&self.iva),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub panels: f64,
    pub inverter: f64,
    pub battery: f64,
    pub fixed_costs: FixedCostBreakdown,
    pub transport: f64,
    pub subtotal: f64,
    pub sector_multiplier: f64,
    pub sector_adjustment: f64,
    pub subtotal_with_sector: f64,
    pub variable_costs: VariableCostBreakdown,
    pub total: f64,
}

impl CostBreakdown {
    /// Re-derive the final price from the stored inputs of each stage.
    ///
    /// Uses the same operation order as [`aggregate_costs`], so the result is
    /// bit-identical to `total` for any untampered breakdown.
    pub fn recompute_total(&self) -> f64 {
        let equipment = EquipmentCosts {
            panels: self.panels,
            inverter: self.inverter,
            battery: self.battery,
        };
        aggregate_costs(
            &equipment,
            &self.fixed_costs.items,
            self.transport,
            self.sector_multiplier,
            &self.variable_costs.rates(),
        )
        .total
    }
}

pub fn aggregate_costs(
    equipment: &EquipmentCosts,
    fixed_costs: &FixedInstallationCosts,
    transport_cost: f64,
    sector_multiplier: f64,
    variable_rates: &VariableCostRates,
) -> CostBreakdown {
    let fixed_total = fixed_costs.total();
    let subtotal =
        equipment.panels + equipment.inverter + equipment.battery + fixed_total + transport_cost;
    let sector_adjustment = subtotal * (sector_multiplier - 1.0);
    let subtotal_with_sector = subtotal + sector_adjustment;
    let variable_costs = apply_variable_costs(subtotal_with_sector, variable_rates);
    let total = subtotal_with_sector + variable_costs.total;

    debug!(
        subtotal,
        sector_adjustment,
        variable_costs = variable_costs.total,
        total,
        "costs aggregated"
    );

    CostBreakdown {
        panels: equipment.panels,
        inverter: equipment.inverter,
        battery: equipment.battery,
        fixed_costs: FixedCostBreakdown {
            items: fixed_costs.clone(),
            total: fixed_total,
        },
        transport: transport_cost,
        subtotal,
        sector_multiplier,
        sector_adjustment,
        subtotal_with_sector,
        variable_costs,
        total,
    }
}

fn apply_variable_costs(
    subtotal_with_sector: f64,
    rates: &VariableCostRates,
) -> VariableCostBreakdown {
    let mut running = subtotal_with_sector;
    let mut total = 0.0;
    let mut apply = |rate: VariableRate| {
        let base_amount = match rate.base {
            CostBase::Subtotal => subtotal_with_sector,
            CostBase::Running => running,
        };
        let amount = rate.rate * base_amount;
        running += amount;
        total += amount;
        VariableCostLine {
            rate: rate.rate,
            base: rate.base,
            base_amount,
            amount,
        }
    };

    let utilidad = apply(rates.utilidad);
    let comision = apply(rates.comision);
    let it = apply(rates.it);
    let iva = apply(rates.iva);

    VariableCostBreakdown {
        utilidad,
        comision,
        it,
        iva,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_catalog;

    fn zero_fixed() -> FixedInstallationCosts {
        FixedInstallationCosts {
            tablero: 0.0,
            aterramiento: 0.0,
            proyecto: 0.0,
            pilastra: 0.0,
            cableado: 0.0,
            instalacion_inversor: 0.0,
        }
    }

    fn no_variable_costs() -> VariableCostRates {
        let zero = VariableRate {
            rate: 0.0,
            base: CostBase::Running,
        };
        VariableCostRates {
            utilidad: zero,
            comision: zero,
            it: zero,
            iva: zero,
        }
    }

    #[test]
    fn industrial_multiplier_adjusts_subtotal() {
        let equipment = EquipmentCosts {
            panels: 6_000.0,
            inverter: 2_500.0,
            battery: 0.0,
        };
        let breakdown = aggregate_costs(&equipment, &zero_fixed(), 1_500.0, 1.1, &no_variable_costs());
        assert_eq!(breakdown.subtotal, 10_000.0);
        assert!((breakdown.sector_adjustment - 1_000.0).abs() < 1e-6);
        assert!((breakdown.subtotal_with_sector - 11_000.0).abs() < 1e-6);
        assert_eq!(breakdown.total, breakdown.subtotal_with_sector);
    }

    #[test]
    fn waterfall_respects_bases_and_order() {
        let rates = VariableCostRates {
            utilidad: VariableRate {
                rate: 0.20,
                base: CostBase::Subtotal,
            },
            comision: VariableRate {
                rate: 0.05,
                base: CostBase::Subtotal,
            },
            it: VariableRate {
                rate: 0.03,
                base: CostBase::Running,
            },
            iva: VariableRate {
                rate: 0.13,
                base: CostBase::Running,
            },
        };
        let equipment = EquipmentCosts {
            panels: 1_000.0,
            inverter: 0.0,
            battery: 0.0,
        };
        let breakdown = aggregate_costs(&equipment, &zero_fixed(), 0.0, 1.0, &rates);
        let v = &breakdown.variable_costs;
        assert!((v.utilidad.amount - 200.0).abs() < 1e-9);
        assert!((v.comision.amount - 50.0).abs() < 1e-9);
        assert!((v.it.base_amount - 1_250.0).abs() < 1e-9);
        assert!((v.it.amount - 37.5).abs() < 1e-9);
        assert!((v.iva.base_amount - 1_287.5).abs() < 1e-9);
        assert!((v.iva.amount - 167.375).abs() < 1e-9);
        assert!((breakdown.total - 1_454.875).abs() < 1e-9);
        let summed: f64 = v.lines().iter().map(|(_, line)| line.amount).sum();
        assert!((summed - v.total).abs() < 1e-9);
    }

    #[test]
    fn recompute_reproduces_total_exactly() {
        let catalog = sample_catalog();
        let equipment = EquipmentCosts {
            panels: 4.0 * 187.35,
            inverter: 612.4,
            battery: 1_733.0,
        };
        let breakdown = aggregate_costs(
            &equipment,
            &catalog.fixed_installation_costs,
            93.17,
            1.07,
            &catalog.variable_cost_rates,
        );
        assert_eq!(breakdown.recompute_total(), breakdown.total);
        assert_eq!(
            breakdown.fixed_costs.total,
            catalog.fixed_installation_costs.total()
        );
    }

    #[test]
    fn ledger_serializes_flat_fixed_items() {
        let catalog = sample_catalog();
        let breakdown = aggregate_costs(
            &EquipmentCosts {
                panels: 1.0,
                inverter: 1.0,
                battery: 0.0,
            },
            &catalog.fixed_installation_costs,
            0.0,
            1.0,
            &catalog.variable_cost_rates,
        );
        let json = serde_json::to_value(&breakdown).unwrap();
        assert!(json["fixed_costs"]["tablero"].is_number());
        assert!(json["fixed_costs"]["total"].is_number());
        assert_eq!(json["variable_costs"]["utilidad"]["base"], "subtotal");
    }
}
