//! ---
//! ems_section: "02-quote-engine"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Solar sizing and cost-estimation routines."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use tracing::{debug, warn};

use crate::{
    catalog::{CatalogSnapshot, Inverter},
    errors::{CalcEngineError, Result},
    input::PhaseType,
};

/// DC array power over AC inverter power aimed for.
pub const OVERSIZING_RATIO: f64 = 1.2;
/// Beyond this DC/AC ratio the inverter is considered critically undersized.
pub const MAX_DC_AC_RATIO: f64 = 1.5;
const RATIO_TOLERANCE: f64 = 1e-9;

pub fn target_inverter_power(total_power_kw: f64) -> f64 {
    total_power_kw / OVERSIZING_RATIO
}

/// Pick the inverter of `phase` whose DC/AC ratio is closest to [`OVERSIZING_RATIO`].
///
/// Only ratios within `[1.0, MAX_DC_AC_RATIO]` qualify. Ties go to the larger
/// rating, then to the cheaper unit.
pub fn select_inverter(
    catalog: &CatalogSnapshot,
    total_power_kw: f64,
    phase: PhaseType,
) -> Result<&Inverter> {
    let selected = catalog
        .inverters_for(phase)
        .filter(|inv| inv.power_kw > 0.0)
        .filter(|inv| {
            let ratio = total_power_kw / inv.power_kw;
            ratio >= 1.0 - RATIO_TOLERANCE && ratio <= MAX_DC_AC_RATIO + RATIO_TOLERANCE
        })
        .min_by(|a, b| {
            let da = (total_power_kw / a.power_kw - OVERSIZING_RATIO).abs();
            let db = (total_power_kw / b.power_kw - OVERSIZING_RATIO).abs();
            da.total_cmp(&db)
                .then_with(|| b.power_kw.total_cmp(&a.power_kw))
                .then_with(|| a.price_usd.total_cmp(&b.price_usd))
        });

    match selected {
        Some(inverter) => {
            debug!(
                %phase,
                inverter = %inverter.id,
                target_kw = target_inverter_power(total_power_kw),
                ratio = total_power_kw / inverter.power_kw,
                "inverter selected"
            );
            Ok(inverter)
        }
        None => {
            warn!(%phase, total_power_kw, "no inverter qualifies for array");
            Err(CalcEngineError::NoMatch(format!(
                "no {phase} inverter suits a {total_power_kw:.2} kW array (target {:.2} kW)",
                target_inverter_power(total_power_kw)
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_catalog;

    #[test]
    fn reference_array_targets_two_point_one_kw() {
        let catalog = sample_catalog();
        assert!((target_inverter_power(2.52) - 2.1).abs() < 1e-12);
        let inverter = select_inverter(&catalog, 2.52, PhaseType::P1).unwrap();
        assert_eq!(inverter.power_kw, 2.0);
        assert_eq!(inverter.phase, PhaseType::P1);
    }

    #[test]
    fn selection_is_closest_qualifying_ratio() {
        let catalog = sample_catalog();
        for panels in 2..60 {
            let total = f64::from(panels) * 0.63;
            for phase in [PhaseType::P1, PhaseType::P3] {
                let Ok(chosen) = select_inverter(&catalog, total, phase) else {
                    continue;
                };
                let ratio = total / chosen.power_kw;
                assert!(ratio >= 1.0 - RATIO_TOLERANCE);
                for other in catalog.inverters_for(phase) {
                    let other_ratio = total / other.power_kw;
                    if (1.0..=MAX_DC_AC_RATIO).contains(&other_ratio) {
                        assert!(
                            (ratio - OVERSIZING_RATIO).abs()
                                <= (other_ratio - OVERSIZING_RATIO).abs() + 1e-12
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn phase_is_respected() {
        let catalog = sample_catalog();
        let inverter = select_inverter(&catalog, 12.0, PhaseType::P3).unwrap();
        assert_eq!(inverter.phase, PhaseType::P3);
        assert_eq!(inverter.power_kw, 10.0);
    }

    #[test]
    fn equal_ratio_falls_back_to_price() {
        let mut catalog = sample_catalog();
        catalog.inverters.retain(|inv| inv.phase == PhaseType::P3);
        catalog.inverters.push(Inverter {
            id: "p3-a".into(),
            model: "A".into(),
            power_kw: 12.5,
            phase: PhaseType::P3,
            price_usd: 1.0,
        });
        // 15 / 12.5 hits the target exactly for both units.
        catalog.inverters.push(Inverter {
            id: "p3-b".into(),
            model: "B".into(),
            power_kw: 12.5,
            phase: PhaseType::P3,
            price_usd: 2.0,
        });
        let inverter = select_inverter(&catalog, 15.0, PhaseType::P3).unwrap();
        assert_eq!(inverter.id, "p3-a");
    }

    #[test]
    fn equal_distance_prefers_larger_rating() {
        let mut catalog = sample_catalog();
        catalog.inverters.retain(|inv| inv.phase == PhaseType::P1);
        // 12 / 11.25 and 12 / 9 sit exactly 2/15 either side of the target.
        for (id, power_kw, price_usd) in [("p3-small", 9.0, 900.0), ("p3-large", 11.25, 1_400.0)] {
            catalog.inverters.push(Inverter {
                id: id.into(),
                model: id.into(),
                power_kw,
                phase: PhaseType::P3,
                price_usd,
            });
        }
        let inverter = select_inverter(&catalog, 12.0, PhaseType::P3).unwrap();
        assert_eq!(inverter.id, "p3-large");
    }

    #[test]
    fn no_qualifying_inverter_is_no_match() {
        let catalog = sample_catalog();
        let err = select_inverter(&catalog, 500.0, PhaseType::P1).unwrap_err();
        assert!(matches!(err, CalcEngineError::NoMatch(_)));

        let mut p1_only = sample_catalog();
        p1_only.inverters.retain(|inv| inv.phase == PhaseType::P1);
        let err = select_inverter(&p1_only, 12.0, PhaseType::P3).unwrap_err();
        assert!(matches!(err, CalcEngineError::NoMatch(_)));
    }
}
