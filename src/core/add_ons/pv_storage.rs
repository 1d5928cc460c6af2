use crate::compare_floats::min_of_2;
use crate::core::add_ons::{apply_primary_ceiling, check_primary_ceiling};
use crate::core::incentive::{
    Details, IncentiveResult, Intervention, ADD_ON_FALLBACK_INSTALLMENTS,
};
use crate::core::tables::{pv_max_specific_cost, STORAGE_MAX_SPECIFIC_COST};
use crate::core::units::percentage_points_to_fraction;
use crate::errors::CalculationError;
use crate::input::PvStorageInput;
use serde_json::json;
use tracing::debug;

/// Share of the eligible expense incentivised before any bonus points.
pub const BASE_EXPENSE_SHARE: f64 = 0.20;

fn check_non_negative(quantity: &'static str, value: f64) -> Result<(), CalculationError> {
    if value < 0. {
        return Err(CalculationError::out_of_range(quantity, value, ">= 0"));
    }
    Ok(())
}

/// Calculate the incentive for photovoltaic panels with optional storage, installed with a
/// primary generator whose total incentive is `primary_total_incentive_eur`.
///
/// Itot = %spesa * (CFTV * PFTV + CACC * CapACC), capped at the primary generator's Itot.
pub fn calc_pv_storage(
    primary_total_incentive_eur: f64,
    input: &PvStorageInput,
) -> Result<IncentiveResult, CalculationError> {
    check_primary_ceiling(primary_total_incentive_eur)?;
    if input.p_pv_kw <= 0. {
        return Err(CalculationError::out_of_range("PFTV (kW)", input.p_pv_kw, "> 0 kW"));
    }
    check_non_negative("PV cost (EUR)", input.cost_pv_eur)?;
    check_non_negative("storage capacity (kWh)", input.storage_kwh)?;
    check_non_negative("storage cost (EUR)", input.cost_storage_eur)?;
    if input.cost_storage_eur > 0. && input.storage_kwh <= 0. {
        return Err(CalculationError::out_of_range(
            "storage capacity (kWh)",
            input.storage_kwh,
            "> 0 kWh when a storage cost is declared",
        ));
    }

    let mut notes = vec![];
    let perc = if input.public_building {
        notes.push("Public building: 100% of the expense is eligible.".to_string());
        1.0
    } else {
        let perc = BASE_EXPENSE_SHARE + percentage_points_to_fraction(input.bonus_points.points());
        notes.push(format!(
            "%spesa = 20% + {}pp = {:.1}%",
            input.bonus_points.points(),
            perc * 100.
        ));
        perc
    };

    let cftv_max = pv_max_specific_cost(input.p_pv_kw)?;
    let cftv = min_of_2(input.cost_pv_eur / input.p_pv_kw, cftv_max);
    let cacc = if input.storage_kwh > 0. {
        min_of_2(
            input.cost_storage_eur / input.storage_kwh,
            STORAGE_MAX_SPECIFIC_COST,
        )
    } else {
        0.
    };

    let itot_raw = perc * (cftv * input.p_pv_kw + cacc * input.storage_kwh);
    let itot = apply_primary_ceiling(itot_raw, primary_total_incentive_eur, &mut notes);
    debug!(perc, cftv, cacc, itot_raw, itot, "PV + storage incentive");

    let details = Details::from([
        ("p_pv_kw".into(), json!(input.p_pv_kw)),
        ("cftv_eur_per_kw_used".into(), json!(cftv)),
        ("cftv_eur_per_kw_max".into(), json!(cftv_max)),
        ("storage_kwh".into(), json!(input.storage_kwh)),
        ("cacc_eur_per_kwh_used".into(), json!(cacc)),
        ("perc".into(), json!(perc)),
        ("itot_raw".into(), json!(itot_raw)),
        ("imax_primary".into(), json!(primary_total_incentive_eur)),
    ]);

    // TODO: installments should follow the primary generator once the rules for add-on
    // payment schedules are confirmed; until then the fixed fallback applies.
    Ok(IncentiveResult::from_total_within_ceiling(
        Intervention::PvStorage,
        itot,
        ADD_ON_FALLBACK_INSTALLMENTS,
        primary_total_incentive_eur,
        details,
        notes,
    ))
}
