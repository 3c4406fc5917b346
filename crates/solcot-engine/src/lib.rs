//! ---
//! ems_section: "02-quote-engine"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Solar sizing and cost-estimation routines."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Solar system sizing and cost-estimation engine.
//!
//! [`compute_quote`] is the single entry point shared by the admin tooling and
//! the public calculator. It is a pure function of a [`CatalogSnapshot`] and a
//! [`QuoteInput`]; loading the catalog is the caller's job.
pub mod api;
pub mod battery;
pub mod catalog;
pub mod costs;
pub mod errors;
pub mod input;
pub mod inverter;
pub mod io;
pub mod panels;
pub mod projection;
pub mod reports;
pub mod tariff;
pub mod transport;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
    battery::{size_batteries, BatteryConfig},
    costs::{aggregate_costs, CostBreakdown, EquipmentCosts},
    inverter::{select_inverter, target_inverter_power},
    panels::size_panels,
    projection::{project, Environmental, Savings},
    reports::ReportExporter,
    tariff::{compute_electricity_cost, ElectricityCost},
    transport::{compute_transport_cost, shipped_weight_kg},
};

pub use catalog::{CatalogSnapshot, Inverter, Panel};
pub use errors::{CalcEngineError, Result};
pub use input::{Department, PhaseType, QuoteInput, Sector};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalDetails {
    pub radiation_kwh_m2_day: f64,
    pub daily_energy_per_panel_kwh: f64,
    pub monthly_energy_per_panel_kwh: f64,
    pub panel: Panel,
    pub inverter: Inverter,
    pub target_inverter_power_kw: f64,
    pub dc_ac_ratio: f64,
    pub battery_info: Option<BatteryConfig>,
    pub sector_multiplier: f64,
    pub total_weight_kg: f64,
    pub exchange_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteResult {
    pub panels_needed: u32,
    pub total_power_kw: f64,
    pub inverter_power_kw: f64,
    pub monthly_generation_kwh: f64,
    pub yearly_generation_kwh: f64,
    pub electricity_cost: ElectricityCost,
    pub system_cost: CostBreakdown,
    pub savings: Savings,
    pub technical_details: TechnicalDetails,
    pub environmental: Environmental,
}

/// Size, price and project a solar installation.
///
/// All-or-nothing: any missing catalog data aborts the whole quote.
pub fn compute_quote(catalog: &CatalogSnapshot, input: &QuoteInput) -> Result<QuoteResult> {
    input.validate()?;

    let electricity_cost =
        compute_electricity_cost(catalog, input.monthly_consumption_kwh, input.sector)?;
    let sizing = size_panels(catalog, input.department, input.monthly_consumption_kwh)?;
    let inverter = select_inverter(catalog, sizing.total_power_kw, input.phase)?.clone();
    let battery = if input.include_battery {
        Some(size_batteries(catalog, input.monthly_consumption_kwh)?)
    } else {
        None
    };

    let total_weight_kg = shipped_weight_kg(&sizing, battery.as_ref());
    let transport = compute_transport_cost(catalog, input.department, total_weight_kg)?;
    let sector_multiplier = catalog.sector_multiplier(input.sector)?;

    let equipment = EquipmentCosts {
        panels: f64::from(sizing.panels_needed) * sizing.panel.price_usd,
        inverter: inverter.price_usd,
        battery: battery.as_ref().map_or(0.0, |bank| bank.total_cost_usd),
    };
    let system_cost = aggregate_costs(
        &equipment,
        &catalog.fixed_installation_costs,
        transport,
        sector_multiplier,
        &catalog.variable_cost_rates,
    );

    let yearly_generation_kwh = sizing.monthly_generation_kwh * 12.0;
    let projection = project(system_cost.total, &electricity_cost, yearly_generation_kwh);

    info!(
        department = %input.department,
        sector = %input.sector,
        phase = %input.phase,
        panels = sizing.panels_needed,
        inverter = %inverter.id,
        battery = input.include_battery,
        total_usd = system_cost.total,
        "quote computed"
    );

    Ok(QuoteResult {
        panels_needed: sizing.panels_needed,
        total_power_kw: sizing.total_power_kw,
        inverter_power_kw: inverter.power_kw,
        monthly_generation_kwh: sizing.monthly_generation_kwh,
        yearly_generation_kwh,
        electricity_cost,
        system_cost,
        savings: projection.savings,
        technical_details: TechnicalDetails {
            radiation_kwh_m2_day: sizing.radiation_kwh_m2_day,
            daily_energy_per_panel_kwh: sizing.daily_energy_per_panel_kwh,
            monthly_energy_per_panel_kwh: sizing.monthly_energy_per_panel_kwh,
            target_inverter_power_kw: target_inverter_power(sizing.total_power_kw),
            dc_ac_ratio: sizing.total_power_kw / inverter.power_kw,
            panel: sizing.panel,
            inverter,
            battery_info: battery,
            sector_multiplier,
            total_weight_kg,
            exchange_rate: catalog.exchange_rate,
        },
        environmental: projection.environmental,
    })
}

/// A computed quote together with the metadata needed to file it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSummary {
    pub quote_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub catalog_version: Option<String>,
    pub input: QuoteInput,
    pub result: QuoteResult,
}

impl QuoteSummary {
    pub fn exporter(&self) -> ReportExporter<'_> {
        ReportExporter::new(self)
    }
}

/// Compute a quote and wrap it with an identifier and timestamp.
pub fn quote(catalog: &CatalogSnapshot, input: &QuoteInput) -> Result<QuoteSummary> {
    let result = compute_quote(catalog, input)?;
    Ok(QuoteSummary {
        quote_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        catalog_version: catalog.version.clone(),
        input: input.clone(),
        result,
    })
}

/// Compute a quote and write its reports to `output_dir`.
pub fn quote_with_export(
    catalog: &CatalogSnapshot,
    input: &QuoteInput,
    output_dir: &std::path::Path,
) -> Result<QuoteSummary> {
    let summary = quote(catalog, input)?;
    summary.exporter().export_all(output_dir)?;
    Ok(summary)
}
