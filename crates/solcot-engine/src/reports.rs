//! ---
//! ems_section: "02-quote-engine"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Solar sizing and cost-estimation routines."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::{fs, path::Path};

use serde::Serialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{errors::Result, QuoteSummary};

pub const QUOTE_REPORT: &str = "quote.json";
pub const COST_BREAKDOWN_REPORT: &str = "cost_breakdown.json";

#[derive(Debug)]
pub struct ReportExporter<'a> {
    summary: &'a QuoteSummary,
}

impl<'a> ReportExporter<'a> {
    pub fn new(summary: &'a QuoteSummary) -> Self {
        Self { summary }
    }

    pub fn export_all(&self, output_dir: &Path) -> Result<()> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir)?;
        }

        let timestamp = self.summary.timestamp.to_rfc3339();
        let version = self.summary.catalog_version.clone();

        let quote_report = ReportEnvelope::new(
            self.summary.quote_id,
            &timestamp,
            version.clone(),
            quote_schema(),
            self.summary,
        );
        let cost_report = ReportEnvelope::new(
            self.summary.quote_id,
            &timestamp,
            version,
            cost_breakdown_schema(),
            &self.summary.result.system_cost,
        );

        write_json(output_dir.join(QUOTE_REPORT), &quote_report)?;
        write_json(output_dir.join(COST_BREAKDOWN_REPORT), &cost_report)?;

        info!(
            quote_id = %self.summary.quote_id,
            "reports exported to {}",
            output_dir.display()
        );
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ReportEnvelope<'a, T: Serialize> {
    quote_id: Uuid,
    timestamp: &'a str,
    catalog_version: Option<String>,
    schema: serde_json::Value,
    data: &'a T,
}

impl<'a, T: Serialize> ReportEnvelope<'a, T> {
    fn new(
        quote_id: Uuid,
        timestamp: &'a str,
        catalog_version: Option<String>,
        schema: serde_json::Value,
        data: &'a T,
    ) -> Self {
        Self {
            quote_id,
            timestamp,
            catalog_version,
            schema,
            data,
        }
    }
}

fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let serialized = serde_json::to_string_pretty(value)?;
    fs::write(path, serialized)?;
    Ok(())
}

fn money() -> serde_json::Value {
    json!({"type": "number"})
}

fn variable_line_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "rate": {"type": "number"},
            "base": {"type": "string", "enum": ["subtotal", "running"]},
            "base_amount": money(),
            "amount": money()
        },
        "required": ["rate", "base", "base_amount", "amount"]
    })
}

fn cost_breakdown_schema() -> serde_json::Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "CostBreakdownReport",
        "type": "object",
        "properties": {
            "panels": money(),
            "inverter": money(),
            "battery": money(),
            "fixed_costs": {
                "type": "object",
                "properties": {
                    "tablero": money(),
                    "aterramiento": money(),
                    "proyecto": money(),
                    "pilastra": money(),
                    "cableado": money(),
                    "instalacion_inversor": money(),
                    "total": money()
                },
                "required": ["total"]
            },
            "transport": money(),
            "subtotal": money(),
            "sector_multiplier": {"type": "number"},
            "sector_adjustment": money(),
            "subtotal_with_sector": money(),
            "variable_costs": {
                "type": "object",
                "properties": {
                    "utilidad": variable_line_schema(),
                    "comision": variable_line_schema(),
                    "it": variable_line_schema(),
                    "iva": variable_line_schema(),
                    "total": money()
                },
                "required": ["utilidad", "comision", "it", "iva", "total"]
            },
            "total": money()
        },
        "required": [
            "panels",
            "inverter",
            "battery",
            "fixed_costs",
            "transport",
            "subtotal",
            "sector_multiplier",
            "subtotal_with_sector",
            "variable_costs",
            "total"
        ]
    })
}

fn quote_schema() -> serde_json::Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "QuoteReport",
        "type": "object",
        "properties": {
            "quote_id": {"type": "string", "format": "uuid"},
            "timestamp": {"type": "string", "format": "date-time"},
            "catalog_version": {"type": ["string", "null"]},
            "input": {
                "type": "object",
                "properties": {
                    "monthly_consumption_kwh": {"type": "number", "exclusiveMinimum": 0},
                    "department": {"type": "string"},
                    "sector": {"type": "string"},
                    "phase": {"type": "string", "enum": ["P1", "P3"]},
                    "include_battery": {"type": "boolean"}
                },
                "required": ["monthly_consumption_kwh", "department", "sector", "phase"]
            },
            "result": {
                "type": "object",
                "properties": {
                    "panels_needed": {"type": "integer", "minimum": 1},
                    "total_power_kw": {"type": "number"},
                    "inverter_power_kw": {"type": "number"},
                    "monthly_generation_kwh": {"type": "number"},
                    "yearly_generation_kwh": {"type": "number"},
                    "electricity_cost": {"type": "object"},
                    "system_cost": {"type": "object"},
                    "savings": {
                        "type": "object",
                        "properties": {
                            "payback_years": {"type": ["number", "null"]}
                        }
                    },
                    "technical_details": {
                        "type": "object",
                        "properties": {
                            "battery_info": {"type": ["object", "null"]}
                        }
                    },
                    "environmental": {"type": "object"}
                },
                "required": [
                    "panels_needed",
                    "total_power_kw",
                    "inverter_power_kw",
                    "monthly_generation_kwh",
                    "yearly_generation_kwh",
                    "electricity_cost",
                    "system_cost",
                    "savings",
                    "technical_details",
                    "environmental"
                ]
            }
        },
        "required": ["quote_id", "timestamp", "input", "result"]
    })
}
