use crate::compare_floats::max_of_2;
use crate::core::incentive::{
    Details, IncentiveResult, Intervention, INSTALLMENTS_LARGE_PLANT, INSTALLMENTS_SMALL_PLANT,
};
use crate::core::tables::{solar_area_band, solar_unit_prices};
use crate::core::units::megajoules_to_kilowatt_hours;
use crate::errors::CalculationError;
use crate::input::{CollectorKind, SolarThermalInput};
use serde_json::json;
use tracing::{debug, warn};

/// Relative tolerance between the declared field area and modules * Ag before a note is raised.
pub const AREA_MISMATCH_TOLERANCE: f64 = 0.05;
/// Solar fields up to this gross area are paid over the shorter period, in m2.
pub const SMALL_FIELD_AREA_LIMIT_M2: f64 = 50.;

fn check_yield_figure(quantity: &'static str, value: f64) -> Result<(), CalculationError> {
    if value < 0. {
        return Err(CalculationError::out_of_range(quantity, value, ">= 0"));
    }
    Ok(())
}

/// Annual yield per square metre of gross area, in kWht/m2.
fn yield_per_square_metre(input: &SolarThermalInput) -> Result<f64, CalculationError> {
    match input.collector_kind {
        CollectorKind::FactoryMade => {
            let ql_mj = input.ql_mj_per_module.ok_or_else(|| {
                CalculationError::missing_field(
                    "ql_mj_per_module",
                    "factory_made collectors require QL (MJ/year per module)",
                )
            })?;
            check_yield_figure("QL (MJ/year per module)", ql_mj)?;
            Ok(megajoules_to_kilowatt_hours(ql_mj) / input.module_ag_m2)
        }
        CollectorKind::FlatOrVacuum | CollectorKind::Concentrating => {
            let q_kwht = input.q_kwht_per_module.ok_or_else(|| {
                CalculationError::missing_field(
                    "q_kwht_per_module",
                    "piano_sottovuoto and concentrazione collectors require Qcol or Qsol (kWht/year per module)",
                )
            })?;
            check_yield_figure("Qcol/Qsol (kWht/year per module)", q_kwht)?;
            Ok(q_kwht / input.module_ag_m2)
        }
    }
}

/// Calculate the incentive for a solar thermal field: Ia = Ci * Qu * Sl.
///
/// The declared area Sl drives the calculation. A declared area more than 5% away from
/// modules * Ag only raises a note.
pub fn calc_solar_thermal(input: &SolarThermalInput) -> Result<IncentiveResult, CalculationError> {
    if input.sl_m2 <= 0. {
        return Err(CalculationError::out_of_range("Sl (m2)", input.sl_m2, "> 0 m2"));
    }
    if input.module_ag_m2 <= 0. {
        return Err(CalculationError::out_of_range(
            "module Ag (m2)",
            input.module_ag_m2,
            "> 0 m2",
        ));
    }

    let mut notes = vec![];
    let sl_computed = input.modules_n as f64 * input.module_ag_m2;
    if (sl_computed - input.sl_m2).abs() / max_of_2(input.sl_m2, 1e-9) > AREA_MISMATCH_TOLERANCE {
        warn!(
            declared = input.sl_m2,
            computed = sl_computed,
            "declared solar field area differs from modules * Ag"
        );
        notes.push(format!(
            "Declared Sl ({}) differs from modules * Ag ({:.2}). Using declared Sl.",
            input.sl_m2, sl_computed
        ));
    }

    let band = solar_area_band(input.sl_m2);
    let ci = solar_unit_prices(input.application)[band];
    let qu = yield_per_square_metre(input)?;

    let annual_incentive = ci * qu * input.sl_m2;
    let default_installments = if input.sl_m2 <= SMALL_FIELD_AREA_LIMIT_M2 {
        INSTALLMENTS_SMALL_PLANT
    } else {
        INSTALLMENTS_LARGE_PLANT
    };
    let total_incentive = annual_incentive * default_installments as f64;
    debug!(band, ci, qu, annual_incentive, total_incentive, "solar thermal incentive");

    let details = Details::from([
        ("application".into(), json!(input.application)),
        ("sl_m2".into(), json!(input.sl_m2)),
        ("sl_computed_m2".into(), json!(sl_computed)),
        ("band_index".into(), json!(band)),
        ("ci_eur_per_kwht".into(), json!(ci)),
        ("collector_kind".into(), json!(input.collector_kind)),
        ("modules_n".into(), json!(input.modules_n)),
        ("module_ag_m2".into(), json!(input.module_ag_m2)),
        ("qu_kwht_per_m2".into(), json!(qu)),
    ]);

    Ok(IncentiveResult::from_total(
        Intervention::SolarThermal,
        total_incentive,
        default_installments,
        details,
        notes,
    ))
}
