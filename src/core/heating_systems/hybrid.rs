use crate::core::heating_systems::heat_pump::heat_pump_terms;
use crate::core::incentive::{installments_by_power, IncentiveResult, Intervention};
use crate::core::tables::hybrid_coefficient;
use crate::errors::CalculationError;
use crate::input::HybridSystemInput;
use serde_json::json;
use tracing::debug;

/// Calculate the incentive for a factory made hybrid system or a bivalent heat pump add-on.
///
/// Ia = k * Ei * Ci, where Ei and Ci are those of the heat pump in the system. Installments
/// follow the total rated heating power of the heat pump.
pub fn calc_hybrid_system(input: &HybridSystemInput) -> Result<IncentiveResult, CalculationError> {
    let heat_pump = &input.heat_pump;
    let terms = heat_pump_terms(heat_pump)?;
    if input.boiler_pn_kw <= 0. {
        return Err(CalculationError::out_of_range(
            "boiler Pn (kW)",
            input.boiler_pn_kw,
            "> 0 kW",
        ));
    }

    let k = hybrid_coefficient(input.system_type, input.boiler_pn_kw);
    let annual_incentive = terms.annual_incentive() * k;

    let default_installments = installments_by_power(heat_pump.prated_kw);
    let total_incentive = annual_incentive * default_installments as f64;
    debug!(k, annual_incentive, total_incentive, "hybrid system incentive");

    let mut details = terms.details(heat_pump);
    details.insert("system_type".into(), json!(input.system_type));
    details.insert("boiler_pn_kw".into(), json!(input.boiler_pn_kw));
    details.insert("k".into(), json!(k));

    let mut notes = terms.notes;
    notes.push(format!("Applied k = {k} (Table 18)."));

    Ok(IncentiveResult::from_total(
        Intervention::HybridSystem,
        total_incentive,
        default_installments,
        details,
        notes,
    ))
}
