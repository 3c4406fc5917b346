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

use crate::tariff::ElectricityCost;

pub const PROJECTION_YEARS: u32 = 25;
/// Grid emission factor in kg CO₂ per kWh displaced.
pub const CO2_KG_PER_KWH: f64 = 0.5;
/// CO₂ absorbed by one tree in a year.
pub const CO2_KG_PER_TREE_YEAR: f64 = 21.77;
/// CO₂ emitted by an average passenger car per km.
pub const CO2_KG_PER_KM_DRIVEN: f64 = 0.12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Savings {
    pub monthly_local: f64,
    pub monthly_usd: f64,
    pub yearly_local: f64,
    pub yearly_usd: f64,
    /// `None` when the current bill is zero and the system never pays back.
    pub payback_years: Option<f64>,
    pub total_savings_25_years_local: f64,
    pub total_savings_25_years_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environmental {
    pub co2_reduction_annual_kg: f64,
    pub co2_reduction_25_years_kg: f64,
    pub equivalences: Equivalences,
}

/// Presentation helpers, not part of the engine contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equivalences {
    pub trees_per_year: f64,
    pub trees_25_years: f64,
    pub km_not_driven_per_year: f64,
    pub km_not_driven_25_years: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub savings: Savings,
    pub environmental: Environmental,
}

/// Solar is assumed to offset the whole billed consumption, so the monthly
/// saving equals the current bill.
pub fn project(
    final_price_usd: f64,
    electricity_cost: &ElectricityCost,
    yearly_generation_kwh: f64,
) -> Projection {
    let years = f64::from(PROJECTION_YEARS);
    let yearly_local = electricity_cost.monthly_local * 12.0;
    let yearly_usd = electricity_cost.monthly_usd * 12.0;
    let payback_years = (yearly_usd > 0.0).then(|| final_price_usd / yearly_usd);

    let co2_reduction_annual_kg = yearly_generation_kwh * CO2_KG_PER_KWH;
    let co2_reduction_25_years_kg = co2_reduction_annual_kg * years;

    Projection {
        savings: Savings {
            monthly_local: electricity_cost.monthly_local,
            monthly_usd: electricity_cost.monthly_usd,
            yearly_local,
            yearly_usd,
            payback_years,
            total_savings_25_years_local: yearly_local * years,
            total_savings_25_years_usd: yearly_usd * years,
        },
        environmental: Environmental {
            co2_reduction_annual_kg,
            co2_reduction_25_years_kg,
            equivalences: Equivalences {
                trees_per_year: co2_reduction_annual_kg / CO2_KG_PER_TREE_YEAR,
                trees_25_years: co2_reduction_25_years_kg / CO2_KG_PER_TREE_YEAR,
                km_not_driven_per_year: co2_reduction_annual_kg / CO2_KG_PER_KM_DRIVEN,
                km_not_driven_25_years: co2_reduction_25_years_kg / CO2_KG_PER_KM_DRIVEN,
            },
        },
    }
}
