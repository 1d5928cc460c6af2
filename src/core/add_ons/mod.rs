//! Add-on interventions, whose incentive may not exceed the total incentive (Imax = Itot)
//! of the primary generator they are installed with.

use crate::compare_floats::min_of_2;
use crate::errors::CalculationError;
use tracing::warn;

pub mod ev_charging;
pub mod pv_storage;

pub const PRIMARY_CEILING_NOTE: &str = "Applied ceiling Imax = Itot of the primary generator.";

pub(crate) fn check_primary_ceiling(primary_total_incentive_eur: f64) -> Result<(), CalculationError> {
    if primary_total_incentive_eur < 0. {
        return Err(CalculationError::out_of_range(
            "primary generator Itot (EUR)",
            primary_total_incentive_eur,
            ">= 0 EUR",
        ));
    }
    Ok(())
}

/// Clamp an add-on incentive to the primary generator's total, noting when the ceiling binds.
pub(crate) fn apply_primary_ceiling(
    raw_incentive_eur: f64,
    primary_total_incentive_eur: f64,
    notes: &mut Vec<String>,
) -> f64 {
    let incentive = min_of_2(raw_incentive_eur, primary_total_incentive_eur);
    if incentive < raw_incentive_eur {
        warn!(
            raw_incentive_eur,
            primary_total_incentive_eur, "add-on incentive clamped to primary generator total"
        );
        notes.push(PRIMARY_CEILING_NOTE.to_string());
    }
    incentive
}
