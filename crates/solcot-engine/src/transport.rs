//! ---
//! ems_section: "02-quote-engine"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Solar sizing and cost-estimation routines."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use tracing::debug;

use crate::{
    battery::BatteryConfig, catalog::CatalogSnapshot, errors::Result, input::Department,
    panels::PanelSizing,
};

/// Weight shipped to site: the panel array plus the battery bank, if any.
pub fn shipped_weight_kg(sizing: &PanelSizing, battery: Option<&BatteryConfig>) -> f64 {
    let panels = f64::from(sizing.panels_needed) * sizing.panel.weight_kg;
    panels + battery.map_or(0.0, |bank| bank.total_weight_kg)
}

pub fn compute_transport_cost(
    catalog: &CatalogSnapshot,
    department: Department,
    total_weight_kg: f64,
) -> Result<f64> {
    let per_kg = catalog.transport_cost_per_kg(department)?;
    let cost = total_weight_kg * per_kg;
    debug!(%department, total_weight_kg, per_kg, cost, "transport priced");
    Ok(cost)
}
