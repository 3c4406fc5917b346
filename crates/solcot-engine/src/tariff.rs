//! ---
//! ems_section: "02-quote-engine"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Solar sizing and cost-estimation routines."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Current electricity bill of the customer, priced with the sector's tariff.
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    catalog::{CatalogSnapshot, TariffRule, TariffTier},
    errors::{CalcEngineError, Result},
    input::Sector,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricityCost {
    pub monthly_local: f64,
    pub monthly_usd: f64,
    pub annual_local: f64,
    pub annual_usd: f64,
    pub effective_rate_local: f64,
    pub effective_rate_usd: f64,
    pub rate_type: String,
    /// Local currency code of the tariff, e.g. `BOB`.
    pub currency: String,
    pub detail: String,
}

struct EnergyCharge {
    amount: f64,
    detail: String,
}

pub fn compute_electricity_cost(
    catalog: &CatalogSnapshot,
    monthly_consumption_kwh: f64,
    sector: Sector,
) -> Result<ElectricityCost> {
    let tariff = catalog.tariff(sector)?;
    let charge = match &tariff.rule {
        TariffRule::Flat { rate_local_per_kwh } => EnergyCharge {
            amount: monthly_consumption_kwh * rate_local_per_kwh,
            detail: format!(
                "{monthly_consumption_kwh:.2} kWh x {rate_local_per_kwh:.4} {}/kWh",
                tariff.currency
            ),
        },
        TariffRule::Bracket { tiers } => {
            bracket_charge(tiers, monthly_consumption_kwh, &tariff.currency)
                .ok_or_else(|| uncovered(sector, monthly_consumption_kwh))?
        }
        TariffRule::Progressive { tiers } => {
            progressive_charge(tiers, monthly_consumption_kwh, &tariff.currency)
                .ok_or_else(|| uncovered(sector, monthly_consumption_kwh))?
        }
    };

    let monthly_local = charge.amount + tariff.fixed_charge_local;
    let mut detail = charge.detail;
    if tariff.fixed_charge_local != 0.0 {
        detail.push_str(&format!(
            " + fixed charge {:.2} {}",
            tariff.fixed_charge_local, tariff.currency
        ));
    }

    let exchange_rate = catalog.exchange_rate;
    let monthly_usd = monthly_local / exchange_rate;
    let effective_rate_local = monthly_local / monthly_consumption_kwh;
    debug!(%sector, monthly_local, effective_rate_local, "electricity cost priced");

    Ok(ElectricityCost {
        monthly_local,
        monthly_usd,
        annual_local: monthly_local * 12.0,
        annual_usd: monthly_usd * 12.0,
        effective_rate_local,
        effective_rate_usd: effective_rate_local / exchange_rate,
        rate_type: tariff.rate_type.clone(),
        currency: tariff.currency.clone(),
        detail,
    })
}

fn uncovered(sector: Sector, kwh: f64) -> CalcEngineError {
    CalcEngineError::Configuration(format!(
        "tariff for sector '{sector}' has no tier covering {kwh} kWh"
    ))
}

fn covers(tier: &TariffTier, kwh: f64) -> bool {
    tier.up_to_kwh.map_or(true, |bound| kwh <= bound)
}

fn bracket_charge(tiers: &[TariffTier], kwh: f64, currency: &str) -> Option<EnergyCharge> {
    let mut lower = 0.0;
    for tier in tiers {
        if covers(tier, kwh) {
            let range = match tier.up_to_kwh {
                Some(upper) => format!("{lower:.0}-{upper:.0} kWh"),
                None => format!("> {lower:.0} kWh"),
            };
            return Some(EnergyCharge {
                amount: kwh * tier.rate_local_per_kwh,
                detail: format!(
                    "{kwh:.2} kWh in bracket {range} x {:.4} {currency}/kWh",
                    tier.rate_local_per_kwh
                ),
            });
        }
        lower = tier.up_to_kwh.unwrap_or(lower);
    }
    None
}

fn progressive_charge(tiers: &[TariffTier], kwh: f64, currency: &str) -> Option<EnergyCharge> {
    let mut lower = 0.0;
    let mut amount = 0.0;
    let mut blocks = Vec::new();
    for tier in tiers {
        let upper = tier.up_to_kwh.map_or(kwh, |bound| bound.min(kwh));
        let block = upper - lower;
        if block > 0.0 {
            amount += block * tier.rate_local_per_kwh;
            blocks.push(format!(
                "{block:.2} kWh x {:.4} {currency}/kWh",
                tier.rate_local_per_kwh
            ));
        }
        if covers(tier, kwh) {
            return Some(EnergyCharge {
                amount,
                detail: blocks.join(" + "),
            });
        }
        lower = upper;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::Tariff, test_support::sample_catalog};

    fn with_rule(rule: TariffRule) -> CatalogSnapshot {
        let mut catalog = sample_catalog();
        catalog.tariffs.insert(
            "commercial".into(),
            Tariff {
                rate_type: "test".into(),
                currency: "BOB".into(),
                fixed_charge_local: 0.0,
                rule,
            },
        );
        catalog
    }

    fn tiers() -> Vec<TariffTier> {
        vec![
            TariffTier {
                up_to_kwh: Some(100.0),
                rate_local_per_kwh: 0.5,
            },
            TariffTier {
                up_to_kwh: Some(300.0),
                rate_local_per_kwh: 0.8,
            },
            TariffTier {
                up_to_kwh: None,
                rate_local_per_kwh: 1.2,
            },
        ]
    }

    #[test]
    fn flat_rate_converts_with_exchange_rate() {
        let catalog = with_rule(TariffRule::Flat {
            rate_local_per_kwh: 0.696,
        });
        let cost = compute_electricity_cost(&catalog, 500.0, Sector::Commercial).unwrap();
        assert!((cost.monthly_local - 348.0).abs() < 1e-9);
        assert!((cost.monthly_usd - 50.0).abs() < 1e-9);
        assert!((cost.annual_local - 12.0 * 348.0).abs() < 1e-9);
        assert!((cost.effective_rate_local - 0.696).abs() < 1e-12);
        assert_eq!(cost.rate_type, "test");
        assert_eq!(cost.currency, "BOB");
    }

    #[test]
    fn bracket_boundary_stays_in_lower_bracket() {
        let catalog = with_rule(TariffRule::Bracket { tiers: tiers() });
        let at = compute_electricity_cost(&catalog, 100.0, Sector::Commercial).unwrap();
        assert!((at.effective_rate_local - 0.5).abs() < 1e-12);

        let above = compute_electricity_cost(&catalog, 100.01, Sector::Commercial).unwrap();
        assert!((above.effective_rate_local - 0.8).abs() < 1e-12);

        let below_top = compute_electricity_cost(&catalog, 300.0, Sector::Commercial).unwrap();
        assert!((below_top.effective_rate_local - 0.8).abs() < 1e-12);

        let top = compute_electricity_cost(&catalog, 300.5, Sector::Commercial).unwrap();
        assert!((top.effective_rate_local - 1.2).abs() < 1e-12);
        assert!(top.detail.contains("> 300 kWh"));
    }

    #[test]
    fn progressive_prices_each_block() {
        let catalog = with_rule(TariffRule::Progressive { tiers: tiers() });
        let cost = compute_electricity_cost(&catalog, 350.0, Sector::Commercial).unwrap();
        let expected = 100.0 * 0.5 + 200.0 * 0.8 + 50.0 * 1.2;
        assert!((cost.monthly_local - expected).abs() < 1e-9);
        assert_eq!(cost.detail.matches(" + ").count(), 2);

        let on_boundary = compute_electricity_cost(&catalog, 100.0, Sector::Commercial).unwrap();
        assert!((on_boundary.monthly_local - 50.0).abs() < 1e-9);
    }

    #[test]
    fn bounded_tiers_that_run_out_are_a_configuration_error() {
        let mut bounded = tiers();
        bounded.pop();
        let catalog = with_rule(TariffRule::Bracket { tiers: bounded });
        let err = compute_electricity_cost(&catalog, 301.0, Sector::Commercial).unwrap_err();
        assert!(matches!(err, CalcEngineError::Configuration(_)));
    }

    #[test]
    fn fixed_charge_is_added() {
        let mut catalog = sample_catalog();
        catalog
            .tariffs
            .get_mut("residential")
            .unwrap()
            .fixed_charge_local = 10.0;
        let with_fixed = compute_electricity_cost(&catalog, 120.0, Sector::Residential).unwrap();
        let without = compute_electricity_cost(&sample_catalog(), 120.0, Sector::Residential)
            .unwrap();
        assert!((with_fixed.monthly_local - without.monthly_local - 10.0).abs() < 1e-9);
        assert!(with_fixed.detail.contains("fixed charge"));
    }

    #[test]
    fn missing_sector_names_the_key() {
        let mut catalog = sample_catalog();
        catalog.tariffs.shift_remove("agricultural");
        let err = compute_electricity_cost(&catalog, 120.0, Sector::Agricultural).unwrap_err();
        assert!(err.to_string().contains("agricultural"));
    }

    #[test]
    fn same_inputs_same_cost() {
        let catalog = sample_catalog();
        let a = compute_electricity_cost(&catalog, 432.1, Sector::Public).unwrap();
        let b = compute_electricity_cost(&catalog, 432.1, Sector::Public).unwrap();
        assert_eq!(a, b);
    }
}
