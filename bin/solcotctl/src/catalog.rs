//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Administrative CLI for quoting and catalog maintenance."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;
use solcot_engine::{catalog::TariffRule, PhaseType, Sector};
use strum::IntoEnumIterator;

use crate::{quote::OutputFormat, Context};

pub fn run(ctx: &Context, command: CatalogCommand) -> Result<()> {
    match command {
        CatalogCommand::Validate => validate(ctx),
        CatalogCommand::Hash => hash(ctx),
        CatalogCommand::Show(args) => show(ctx, args),
    }
}

#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    /// Load the catalog and check it covers every department and sector.
    Validate,
    /// Print the catalog SHA-256.
    Hash,
    /// Summarise the catalog contents.
    Show(ShowArgs),
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn validate(ctx: &Context) -> Result<()> {
    let store = ctx.catalog_store()?;
    let snapshot = store.snapshot()?;
    for phase in PhaseType::iter() {
        if snapshot.inverters_for(phase).next().is_none() {
            println!("warning: no {phase} inverters; {phase} quotes will fail");
        }
    }
    if snapshot.batteries.is_empty() {
        println!("warning: no batteries; battery quotes will fail");
    }
    if let Some(path) = store.path() {
        println!("catalog OK: {}", path.display());
    }
    Ok(())
}

fn hash(ctx: &Context) -> Result<()> {
    let store = ctx.catalog_store()?;
    if let Some(metadata) = store.metadata() {
        println!("{}", metadata.sha256);
    }
    Ok(())
}

fn show(ctx: &Context, args: ShowArgs) -> Result<()> {
    let store = ctx.catalog_store()?;
    let snapshot = store.snapshot()?;
    let metadata = store.metadata();

    if args.format == OutputFormat::Json {
        let document = json!({"metadata": metadata, "catalog": &*snapshot});
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    if let Some(metadata) = &metadata {
        println!(
            "Catalog {} (sha256 {})",
            metadata.version.as_deref().unwrap_or("unversioned"),
            metadata.sha256
        );
    }
    let currency = snapshot
        .tariffs
        .values()
        .next()
        .map_or("local", |tariff| tariff.currency.as_str());
    println!("Exchange rate: {} {currency}/USD", snapshot.exchange_rate);
    println!("Panels:");
    for panel in &snapshot.panels {
        let marker = if panel.primary { " [primary]" } else { "" };
        println!(
            "  {:<14} {:<32} {:>5.2} kW {:>9.2} USD{marker}",
            panel.id, panel.model, panel.power_kw, panel.price_usd
        );
    }
    for phase in PhaseType::iter() {
        println!("Inverters {phase}:");
        for inverter in snapshot.inverters_for(phase) {
            println!(
                "  {:<14} {:<32} {:>5.1} kW {:>9.2} USD",
                inverter.id, inverter.model, inverter.power_kw, inverter.price_usd
            );
        }
    }
    println!("Batteries:");
    for battery in &snapshot.batteries {
        println!(
            "  {:<14} {:<32} {:>5.2} kWh {:>9.2} USD",
            battery.id, battery.model, battery.usable_capacity_kwh, battery.price_usd
        );
    }
    println!("Tariffs:");
    for sector in Sector::iter() {
        let Ok(tariff) = snapshot.tariff(sector) else {
            continue;
        };
        let kind = match &tariff.rule {
            TariffRule::Flat { .. } => "flat".to_owned(),
            TariffRule::Bracket { tiers } => format!("{} brackets", tiers.len()),
            TariffRule::Progressive { tiers } => format!("{} progressive blocks", tiers.len()),
        };
        println!(
            "  {:<14} {} ({kind}, {})",
            sector.to_string(),
            tariff.rate_type,
            tariff.currency
        );
    }
    println!("Variable costs:");
    for (name, rate) in snapshot.variable_cost_rates.ordered() {
        println!("  {name:<14} {:>5.2}% of {:?}", rate.rate * 100.0, rate.base);
    }
    Ok(())
}
