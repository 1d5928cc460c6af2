//! This module calculates the incentive for biomass generators.
//!
//! Boilers:                    Ia = Pn * hr * Ci * Ce
//! Stoves and thermo-fireplaces: Ia = 3.35 * ln(Pn) * hr * Ci * Ce

use crate::core::incentive::{installments_by_power, Details, IncentiveResult, Intervention};
use crate::core::tables::{
    biomass_emission_coefficient, biomass_equivalent_hours, biomass_unit_price,
};
use crate::errors::CalculationError;
use crate::input::BiomassInput;
use serde_json::json;
use tracing::debug;

pub const STOVE_POWER_LOG_FACTOR: f64 = 3.35;

pub fn calc_biomass(input: &BiomassInput) -> Result<IncentiveResult, CalculationError> {
    // also keeps ln(Pn) defined for stoves
    if input.pn_kw <= 0. {
        return Err(CalculationError::out_of_range(
            "Pn (kW)",
            input.pn_kw,
            "> 0 kW",
        ));
    }
    if input.reduction_pp_percent < 0. {
        return Err(CalculationError::out_of_range(
            "particulate reduction (%)",
            input.reduction_pp_percent,
            ">= 0 %",
        ));
    }

    let hr = biomass_equivalent_hours(input.zone);
    let ci = biomass_unit_price(input.device, input.pn_kw);
    let ce = biomass_emission_coefficient(input.reduction_pp_percent);

    let (annual_incentive, formula) = if input.device.is_stove() {
        (
            STOVE_POWER_LOG_FACTOR * input.pn_kw.ln() * hr * ci * ce,
            "3.35*ln(Pn)*hr*Ci*Ce",
        )
    } else {
        (input.pn_kw * hr * ci * ce, "Pn*hr*Ci*Ce")
    };

    let default_installments = installments_by_power(input.pn_kw);
    let total_incentive = annual_incentive * default_installments as f64;
    debug!(hr, ci, ce, annual_incentive, total_incentive, "biomass incentive");

    let details = Details::from([
        ("zone".into(), json!(input.zone)),
        ("device".into(), json!(input.device)),
        ("pn_kw".into(), json!(input.pn_kw)),
        ("hr_h".into(), json!(hr)),
        ("ci_eur_per_kwht".into(), json!(ci)),
        ("ce".into(), json!(ce)),
        ("reduction_pp_percent".into(), json!(input.reduction_pp_percent)),
        ("formula".into(), json!(formula)),
    ]);

    Ok(IncentiveResult::from_total(
        Intervention::Biomass,
        total_incentive,
        default_installments,
        details,
        vec![],
    ))
}
