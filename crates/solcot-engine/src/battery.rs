//! ---
//! ems_section: "02-quote-engine"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Solar sizing and cost-estimation routines."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Backup battery bank sizing.
//!
//! The bank must carry the average hourly demand for [`BACKUP_AUTONOMY_HOURS`].
//! Every catalog model is evaluated; the cheapest feasible bank wins.
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    catalog::{Battery, CatalogSnapshot},
    errors::{CalcEngineError, Result},
    panels::DAYS_PER_MONTH,
};

pub const BACKUP_AUTONOMY_HOURS: f64 = 4.0;
/// Largest number of units wired into a single bank.
pub const MAX_UNITS_PER_BANK: u32 = 16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryConfig {
    pub battery: Battery,
    pub quantity: u32,
    pub backup_load_kw: f64,
    pub required_energy_kwh: f64,
    pub total_capacity_kwh: f64,
    pub usable_capacity_kwh: f64,
    pub autonomy_hours: f64,
    pub total_cost_usd: f64,
    pub total_weight_kg: f64,
}

/// Average hourly demand derived from monthly consumption.
pub fn backup_load_kw(monthly_consumption_kwh: f64) -> f64 {
    monthly_consumption_kwh / (DAYS_PER_MONTH * 24.0)
}

pub fn size_batteries(
    catalog: &CatalogSnapshot,
    monthly_consumption_kwh: f64,
) -> Result<BatteryConfig> {
    let load_kw = backup_load_kw(monthly_consumption_kwh);
    let required_energy_kwh = load_kw * BACKUP_AUTONOMY_HOURS;

    let best = catalog
        .batteries
        .iter()
        .filter(|battery| battery.usable_capacity_kwh > 0.0)
        .filter_map(|battery| bank_for(battery, required_energy_kwh, load_kw))
        .min_by(|a, b| {
            a.total_cost_usd
                .total_cmp(&b.total_cost_usd)
                .then_with(|| a.quantity.cmp(&b.quantity))
                .then_with(|| {
                    b.battery
                        .usable_capacity_kwh
                        .total_cmp(&a.battery.usable_capacity_kwh)
                })
        })
        .ok_or_else(|| {
            CalcEngineError::Configuration(format!(
                "no battery combination of up to {MAX_UNITS_PER_BANK} units provides \
                 {required_energy_kwh:.2} kWh ({BACKUP_AUTONOMY_HOURS} h at {load_kw:.3} kW)"
            ))
        })?;

    debug!(
        battery = %best.battery.id,
        quantity = best.quantity,
        autonomy_hours = best.autonomy_hours,
        total_cost_usd = best.total_cost_usd,
        "battery bank sized"
    );
    Ok(best)
}

fn bank_for(battery: &Battery, required_energy_kwh: f64, load_kw: f64) -> Option<BatteryConfig> {
    let quantity = (required_energy_kwh / battery.usable_capacity_kwh)
        .ceil()
        .max(1.0);
    if quantity > f64::from(MAX_UNITS_PER_BANK) {
        return None;
    }
    let quantity = quantity as u32;
    let units = f64::from(quantity);
    let usable_capacity_kwh = units * battery.usable_capacity_kwh;

    Some(BatteryConfig {
        battery: battery.clone(),
        quantity,
        backup_load_kw: load_kw,
        required_energy_kwh,
        total_capacity_kwh: units * battery.capacity_kwh,
        usable_capacity_kwh,
        autonomy_hours: usable_capacity_kwh / load_kw,
        total_cost_usd: units * battery.price_usd,
        total_weight_kg: units * battery.weight_kg,
    })
}
