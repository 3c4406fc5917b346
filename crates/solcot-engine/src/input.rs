//! ---
//! ems_section: "02-quote-engine"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Solar sizing and cost-estimation routines."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Caller-supplied quote parameters and the fixed enumerations shared with the catalog.
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::errors::{CalcEngineError, Result};

/// Bolivian departments served by the reseller.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Department {
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

impl Department {
    /// Key used by the per-department catalog tables.
    pub fn key(self) -> &'static str {
        self.into()
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Department::Chuquisaca => "Chuquisaca",
            Department::LaPaz => "La Paz",
            Department::Cochabamba => "Cochabamba",
            Department::Oruro => "Oruro",
            Department::Potosi => "Potosí",
            Department::Tarija => "Tarija",
            Department::SantaCruz => "Santa Cruz",
            Department::Beni => "Beni",
            Department::Pando => "Pando",
        }
    }
}

/// Customer class used for tariffs and the sector cost multiplier.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Sector {
    Residential,
    Commercial,
    Industrial,
    Public,
    Agricultural,
}

impl Sector {
    pub fn key(self) -> &'static str {
        self.into()
    }
}

/// Grid connection phase.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum PhaseType {
    P1,
    P3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteInput {
    pub monthly_consumption_kwh: f64,
    pub department: Department,
    pub sector: Sector,
    pub phase: PhaseType,
    #[serde(default)]
    pub include_battery: bool,
}

impl QuoteInput {
    pub fn new(
        monthly_consumption_kwh: f64,
        department: Department,
        sector: Sector,
        phase: PhaseType,
        include_battery: bool,
    ) -> Self {
        Self {
            monthly_consumption_kwh,
            department,
            sector,
            phase,
            include_battery,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.monthly_consumption_kwh.is_finite() || self.monthly_consumption_kwh <= 0.0 {
            return Err(CalcEngineError::Validation(format!(
                "monthly consumption must be a positive number of kWh, got {}",
                self.monthly_consumption_kwh
            )));
        }
        Ok(())
    }
}
