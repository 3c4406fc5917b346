//! ---
//! ems_section: "02-quote-engine"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Solar sizing and cost-estimation routines."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Reference data consumed by the engine. A [`CatalogSnapshot`] is produced by
//! the configuration collaborator and treated as read-only for the lifetime of a
//! calculation.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::warn;

use crate::{
    errors::{CalcEngineError, Result},
    input::{Department, PhaseType, Sector},
};

fn default_currency() -> String {
    "BOB".to_owned()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub version: Option<String>,
    pub panels: Vec<Panel>,
    pub inverters: Vec<Inverter>,
    #[serde(default)]
    pub batteries: Vec<Battery>,
    /// kWh/m²/day keyed by department.
    pub solar_radiation_by_department: IndexMap<String, f64>,
    /// USD/kg keyed by department.
    pub transport_cost_per_kg_by_department: IndexMap<String, f64>,
    pub sector_multipliers: IndexMap<String, f64>,
    pub fixed_installation_costs: FixedInstallationCosts,
    pub variable_cost_rates: VariableCostRates,
    pub tariffs: IndexMap<String, Tariff>,
    /// Local currency units per USD.
    pub exchange_rate: f64,
}

impl CatalogSnapshot {
    /// The panel model used for sizing. The first panel flagged `primary` wins.
    pub fn primary_panel(&self) -> Result<&Panel> {
        let mut flagged = self.panels.iter().filter(|p| p.primary);
        let panel = flagged.next().ok_or_else(|| {
            CalcEngineError::Configuration("no primary panel designated in catalog".into())
        })?;
        if let Some(other) = flagged.next() {
            warn!(
                selected = %panel.id,
                ignored = %other.id,
                "multiple primary panels in catalog; using the first"
            );
        }
        Ok(panel)
    }

    pub fn solar_radiation(&self, department: Department) -> Result<f64> {
        self.solar_radiation_by_department
            .get(department.key())
            .copied()
            .ok_or_else(|| CalcEngineError::missing("solar radiation table", department))
    }

    pub fn transport_cost_per_kg(&self, department: Department) -> Result<f64> {
        self.transport_cost_per_kg_by_department
            .get(department.key())
            .copied()
            .ok_or_else(|| CalcEngineError::missing("transport cost table", department))
    }

    pub fn sector_multiplier(&self, sector: Sector) -> Result<f64> {
        self.sector_multipliers
            .get(sector.key())
            .copied()
            .ok_or_else(|| CalcEngineError::missing("sector multiplier table", sector))
    }

    pub fn tariff(&self, sector: Sector) -> Result<&Tariff> {
        self.tariffs
            .get(sector.key())
            .ok_or_else(|| CalcEngineError::missing("tariff table", sector))
    }

    pub fn inverters_for(&self, phase: PhaseType) -> impl Iterator<Item = &Inverter> {
        self.inverters.iter().filter(move |inv| inv.phase == phase)
    }

    /// Check that every lookup the engine can perform is backed by data.
    ///
    /// All problems are collected into a single [`CalcEngineError::Configuration`]
    /// so an operator can fix the catalog in one pass.
    pub fn validate(&self) -> Result<()> {
        let mut issues = Vec::new();

        match self.primary_panel() {
            Ok(panel) if panel.power_kw <= 0.0 => {
                issues.push(format!("primary panel '{}' has non-positive power", panel.id))
            }
            Ok(_) => {}
            Err(err) => issues.push(err.to_string()),
        }
        if !(self.exchange_rate.is_finite() && self.exchange_rate > 0.0) {
            issues.push(format!("exchange rate must be positive, got {}", self.exchange_rate));
        }
        for department in Department::iter() {
            if self.solar_radiation(department).is_err() {
                issues.push(format!("solar radiation missing for '{department}'"));
            }
            if self.transport_cost_per_kg(department).is_err() {
                issues.push(format!("transport cost missing for '{department}'"));
            }
        }
        for sector in Sector::iter() {
            if self.sector_multiplier(sector).is_err() {
                issues.push(format!("sector multiplier missing for '{sector}'"));
            }
            match self.tariff(sector) {
                Ok(tariff) => {
                    if let Err(reason) = tariff.rule.check() {
                        issues.push(format!("tariff for '{sector}' {reason}"));
                    }
                }
                Err(_) => issues.push(format!("tariff missing for '{sector}'")),
            }
        }
        for phase in PhaseType::iter() {
            if self.inverters_for(phase).next().is_none() {
                warn!(%phase, "catalog has no inverter for phase");
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(CalcEngineError::Configuration(issues.join("; ")))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub id: String,
    pub model: String,
    pub power_kw: f64,
    pub price_usd: f64,
    pub weight_kg: f64,
    #[serde(default)]
    pub efficiency: f64,
    #[serde(default)]
    pub primary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inverter {
    pub id: String,
    pub model: String,
    pub power_kw: f64,
    pub phase: PhaseType,
    pub price_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Battery {
    pub id: String,
    pub model: String,
    pub capacity_kwh: f64,
    pub usable_capacity_kwh: f64,
    pub price_usd: f64,
    pub weight_kg: f64,
}

/// Fixed installation line items in USD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedInstallationCosts {
    pub tablero: f64,
    pub aterramiento: f64,
    pub proyecto: f64,
    pub pilastra: f64,
    pub cableado: f64,
    pub instalacion_inversor: f64,
}

impl FixedInstallationCosts {
    pub fn total(&self) -> f64 {
        self.tablero
            + self.aterramiento
            + self.proyecto
            + self.pilastra
            + self.cableado
            + self.instalacion_inversor
    }
}

/// What a variable cost rate is multiplied with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CostBase {
    /// The sector-adjusted subtotal, ignoring earlier variable costs.
    Subtotal,
    /// The running total including every earlier variable cost.
    #[default]
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariableRate {
    pub rate: f64,
    #[serde(default)]
    pub base: CostBase,
}

/// Variable cost rates, applied in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableCostRates {
    pub utilidad: VariableRate,
    pub comision: VariableRate,
    pub it: VariableRate,
    pub iva: VariableRate,
}

impl VariableCostRates {
    pub fn ordered(&self) -> [(&'static str, VariableRate); 4] {
        [
            ("utilidad", self.utilidad),
            ("comision", self.comision),
            ("it", self.it),
            ("iva", self.iva),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tariff {
    pub rate_type: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Monthly charge billed regardless of consumption, in local currency.
    #[serde(default)]
    pub fixed_charge_local: f64,
    pub rule: TariffRule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TariffRule {
    Flat { rate_local_per_kwh: f64 },
    /// Whole consumption billed at the rate of the bracket it falls in.
    Bracket { tiers: Vec<TariffTier> },
    /// Each block billed at its own rate.
    Progressive { tiers: Vec<TariffTier> },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TariffTier {
    /// Inclusive upper bound; `None` means unbounded.
    #[serde(default)]
    pub up_to_kwh: Option<f64>,
    pub rate_local_per_kwh: f64,
}

impl TariffRule {
    /// Structural check: tiers exist, bounds ascend, only the last is unbounded.
    pub fn check(&self) -> std::result::Result<(), String> {
        let tiers = match self {
            TariffRule::Flat { .. } => return Ok(()),
            TariffRule::Bracket { tiers } | TariffRule::Progressive { tiers } => tiers,
        };
        if tiers.is_empty() {
            return Err("has no tiers".into());
        }
        let mut previous = 0.0;
        for (index, tier) in tiers.iter().enumerate() {
            match tier.up_to_kwh {
                Some(bound) if bound <= previous => {
                    return Err(format!("tier {index} bound {bound} does not ascend"));
                }
                Some(bound) => previous = bound,
                None if index + 1 != tiers.len() => {
                    return Err(format!("tier {index} is unbounded but not last"));
                }
                None => {}
            }
        }
        Ok(())
    }
}
