//! ---
//! ems_section: "02-quote-engine"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Solar sizing and cost-estimation routines."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    catalog::{CatalogSnapshot, Panel},
    errors::{CalcEngineError, Result},
    input::Department,
};

/// Combined derating of the array (wiring, soiling, temperature, conversion).
pub const SYSTEM_EFFICIENCY: f64 = 0.85;
pub const DAYS_PER_MONTH: f64 = 30.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSizing {
    pub panel: Panel,
    pub radiation_kwh_m2_day: f64,
    pub daily_energy_per_panel_kwh: f64,
    pub monthly_energy_per_panel_kwh: f64,
    pub panels_needed: u32,
    pub total_power_kw: f64,
    pub monthly_generation_kwh: f64,
}

/// Smallest number of primary panels whose monthly yield covers `monthly_consumption_kwh`.
pub fn size_panels(
    catalog: &CatalogSnapshot,
    department: Department,
    monthly_consumption_kwh: f64,
) -> Result<PanelSizing> {
    let panel = catalog.primary_panel()?;
    let radiation = catalog.solar_radiation(department)?;

    let daily_energy_per_panel_kwh = radiation * panel.power_kw * SYSTEM_EFFICIENCY;
    let monthly_energy_per_panel_kwh = daily_energy_per_panel_kwh * DAYS_PER_MONTH;
    if !(monthly_energy_per_panel_kwh.is_finite() && monthly_energy_per_panel_kwh > 0.0) {
        return Err(CalcEngineError::Configuration(format!(
            "panel '{}' yields no energy in '{department}' (radiation {radiation}, power {} kW)",
            panel.id, panel.power_kw
        )));
    }

    let panels_needed = (monthly_consumption_kwh / monthly_energy_per_panel_kwh)
        .ceil()
        .max(1.0) as u32;
    let total_power_kw = f64::from(panels_needed) * panel.power_kw;
    let monthly_generation_kwh = f64::from(panels_needed) * monthly_energy_per_panel_kwh;

    debug!(
        %department,
        panels_needed,
        total_power_kw,
        monthly_generation_kwh,
        "panel array sized"
    );

    Ok(PanelSizing {
        panel: panel.clone(),
        radiation_kwh_m2_day: radiation,
        daily_energy_per_panel_kwh,
        monthly_energy_per_panel_kwh,
        panels_needed,
        total_power_kw,
        monthly_generation_kwh,
    })
}
