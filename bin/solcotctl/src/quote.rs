//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Administrative CLI for quoting and catalog maintenance."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{ArgAction, Args, ValueEnum};
use solcot_engine::{Department, PhaseType, QuoteInput, QuoteSummary, Sector};
use solcot_logging::{log_quote_event, quote_info, EventOutcome, QuoteLogContext};

use crate::Context;

#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// Monthly consumption in kWh.
    #[arg(long, value_name = "KWH")]
    consumption: f64,

    /// Installation department. Falls back to `defaults.department`.
    #[arg(long, value_enum)]
    department: Option<DepartmentArg>,

    /// Customer sector. Falls back to `defaults.sector`.
    #[arg(long, value_enum)]
    sector: Option<SectorArg>,

    /// Grid connection phase. Falls back to `defaults.phase`.
    #[arg(long, value_enum, ignore_case = true)]
    phase: Option<PhaseArg>,

    /// Add a backup battery bank. Falls back to `defaults.include_battery`.
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "no_battery")]
    battery: bool,

    /// Quote without a battery bank even when `defaults.include_battery` is set.
    #[arg(long, action = ArgAction::SetTrue)]
    no_battery: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write `quote.json` and `cost_breakdown.json` into DIR.
    #[arg(long, value_name = "DIR")]
    export: Option<PathBuf>,
}

impl QuoteArgs {
    fn to_input(&self, ctx: &Context) -> Result<QuoteInput> {
        let defaults = &ctx.config.defaults;
        let department = self
            .department
            .map(Department::from)
            .or(defaults.department)
            .ok_or_else(|| anyhow!("--department is required when defaults.department is unset"))?;
        Ok(QuoteInput::new(
            self.consumption,
            department,
            self.sector.map(Sector::from).unwrap_or(defaults.sector),
            self.phase.map(PhaseType::from).unwrap_or(defaults.phase),
            self.include_battery(defaults.include_battery),
        ))
    }

    fn include_battery(&self, default: bool) -> bool {
        match (self.battery, self.no_battery) {
            (true, _) => true,
            (_, true) => false,
            _ => default,
        }
    }
}

pub fn run(ctx: &Context, args: QuoteArgs) -> Result<()> {
    let input = args.to_input(ctx)?;
    let store = ctx.catalog_store()?;
    let catalog_hash = store
        .metadata()
        .map(|metadata| metadata.sha256)
        .unwrap_or_default();
    let phase: &'static str = input.phase.into();
    let log_ctx = QuoteLogContext::new()
        .with_department(input.department.key())
        .with_sector(input.sector.key())
        .with_phase(phase)
        .with_catalog_hash(&catalog_hash);

    let summary = match store.quote(&input) {
        Ok(summary) => summary,
        Err(err) => {
            log_quote_event(
                Some(&log_ctx),
                "quote.rejected",
                &err.to_string(),
                EventOutcome::Rejected,
            );
            return Err(err.into());
        }
    };
    let quote_id = summary.quote_id.to_string();
    let log_ctx = log_ctx.with_quote_id(&quote_id);
    log_quote_event(
        Some(&log_ctx),
        "quote.computed",
        "quote computed",
        EventOutcome::Success,
    );

    let export_dir = args.export.clone().or_else(|| {
        ctx.config
            .reports
            .always_export
            .then(|| ctx.config.reports.directory.join(&quote_id))
    });
    if let Some(dir) = export_dir {
        summary.exporter().export_all(&dir)?;
        quote_info!(context = log_ctx, "reports written to {}", dir.display());
    }

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => print!("{}", render_text(&summary)),
    }
    Ok(())
}

fn render_text(summary: &QuoteSummary) -> String {
    let input = &summary.input;
    let result = &summary.result;
    let details = &result.technical_details;
    let cost = &result.system_cost;
    let savings = &result.savings;

    let mut out = String::new();
    let mut line = |text: String| {
        out.push_str(&text);
        out.push('\n');
    };
    line(format!("Quote {}", summary.quote_id));
    line(format!(
        "  {} kWh/month, {}, {}, {}{}",
        input.monthly_consumption_kwh,
        input.department.display_name(),
        input.sector,
        input.phase,
        if input.include_battery { ", with battery" } else { "" }
    ));
    line(format!(
        "Panels:      {} x {} ({:.2} kWp, {:.1} kWh/month)",
        result.panels_needed, details.panel.model, result.total_power_kw, result.monthly_generation_kwh
    ));
    line(format!(
        "Inverter:    {} ({:.1} kW, DC/AC {:.2})",
        details.inverter.model, result.inverter_power_kw, details.dc_ac_ratio
    ));
    if let Some(bank) = &details.battery_info {
        line(format!(
            "Battery:     {} x {} ({:.1} kWh usable, {:.1} h backup)",
            bank.quantity, bank.battery.model, bank.usable_capacity_kwh, bank.autonomy_hours
        ));
    }
    line(format!(
        "Current bill: {:.2} {}/month ({:.2} USD), {}",
        result.electricity_cost.monthly_local,
        result.electricity_cost.currency,
        result.electricity_cost.monthly_usd,
        result.electricity_cost.rate_type
    ));
    line("Costs (USD):".to_owned());
    line(format!("  equipment          {:>12.2}", cost.panels + cost.inverter + cost.battery));
    line(format!("  fixed installation {:>12.2}", cost.fixed_costs.total));
    line(format!("  transport          {:>12.2}", cost.transport));
    line(format!("  sector adjustment  {:>12.2}", cost.sector_adjustment));
    for (name, item) in cost.variable_costs.lines() {
        line(format!("  {name:<18} {:>12.2}", item.amount));
    }
    line(format!("  total              {:>12.2}", cost.total));
    let payback = savings
        .payback_years
        .map_or_else(|| "never".to_owned(), |years| format!("{years:.1} years"));
    line(format!(
        "Savings:     {:.2} USD/year, payback {payback}",
        savings.yearly_usd
    ));
    line(format!(
        "CO2 avoided: {:.0} kg/year",
        result.environmental.co2_reduction_annual_kg
    ));
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum DepartmentArg {
    Chuquisaca,
    LaPaz,
    Cochabamba,
    Oruro,
    Potosi,
    Tarija,
    SantaCruz,
    Beni,
    Pando,
}

impl From<DepartmentArg> for Department {
    fn from(value: DepartmentArg) -> Self {
        match value {
            DepartmentArg::Chuquisaca => Department::Chuquisaca,
            DepartmentArg::LaPaz => Department::LaPaz,
            DepartmentArg::Cochabamba => Department::Cochabamba,
            DepartmentArg::Oruro => Department::Oruro,
            DepartmentArg::Potosi => Department::Potosi,
            DepartmentArg::Tarija => Department::Tarija,
            DepartmentArg::SantaCruz => Department::SantaCruz,
            DepartmentArg::Beni => Department::Beni,
            DepartmentArg::Pando => Department::Pando,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SectorArg {
    Residential,
    Commercial,
    Industrial,
    Public,
    Agricultural,
}

impl From<SectorArg> for Sector {
    fn from(value: SectorArg) -> Self {
        match value {
            SectorArg::Residential => Sector::Residential,
            SectorArg::Commercial => Sector::Commercial,
            SectorArg::Industrial => Sector::Industrial,
            SectorArg::Public => Sector::Public,
            SectorArg::Agricultural => Sector::Agricultural,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PhaseArg {
    #[value(name = "P1")]
    P1,
    #[value(name = "P3")]
    P3,
}

impl From<PhaseArg> for PhaseType {
    fn from(value: PhaseArg) -> Self {
        match value {
            PhaseArg::P1 => PhaseType::P1,
            PhaseArg::P3 => PhaseType::P3,
        }
    }
}
