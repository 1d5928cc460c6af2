use crate::compare_floats::min_of_2;
use crate::core::add_ons::{apply_primary_ceiling, check_primary_ceiling};
use crate::core::incentive::{
    Details, IncentiveResult, Intervention, ADD_ON_FALLBACK_INSTALLMENTS,
};
use crate::core::tables::ev_max_cost;
use crate::errors::CalculationError;
use crate::input::EvChargingInput;
use serde_json::json;
use tracing::debug;

pub const EV_INCENTIVE_RATE: f64 = 0.30;

/// Calculate the incentive for a private EV charging infrastructure installed with a primary
/// generator: 30% of min(C, Cmax), capped at the primary generator's Itot.
pub fn calc_ev_charging(
    primary_total_incentive_eur: f64,
    input: &EvChargingInput,
) -> Result<IncentiveResult, CalculationError> {
    check_primary_ceiling(primary_total_incentive_eur)?;
    if input.eligible_cost_eur < 0. {
        return Err(CalculationError::out_of_range(
            "eligible cost (EUR)",
            input.eligible_cost_eur,
            ">= 0 EUR",
        ));
    }

    let cmax = ev_max_cost(input.category, input.power_kw)?;
    let cost_used = min_of_2(input.eligible_cost_eur, cmax);
    let itot_raw = EV_INCENTIVE_RATE * cost_used;

    let mut notes = vec![];
    if input.power_kw.is_some() && !input.category.is_power_proportional() {
        notes.push(format!(
            "Charging power is not used for category {}: Cmax is fixed.",
            input.category
        ));
    }
    notes.push(format!(
        "Cost used = min(C, Cmax) = {cost_used:.2} EUR; incentive = 30% of the cost used."
    ));
    let itot = apply_primary_ceiling(itot_raw, primary_total_incentive_eur, &mut notes);
    debug!(cmax, cost_used, itot_raw, itot, "EV charging incentive");

    let details = Details::from([
        ("category".into(), json!(input.category)),
        ("power_kw".into(), json!(input.power_kw)),
        ("eligible_cost_eur".into(), json!(input.eligible_cost_eur)),
        ("cmax_eur".into(), json!(cmax)),
        ("cost_used_eur".into(), json!(cost_used)),
        ("itot_raw".into(), json!(itot_raw)),
        ("imax_primary".into(), json!(primary_total_incentive_eur)),
    ]);

    Ok(IncentiveResult::from_total_within_ceiling(
        Intervention::EvCharging,
        itot,
        ADD_ON_FALLBACK_INSTALLMENTS,
        primary_total_incentive_eur,
        details,
        notes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::add_ons::PRIMARY_CEILING_NOTE;
    use crate::input::EvChargingCategory;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn should_take_thirty_percent_of_eligible_cost() {
        let input = EvChargingInput {
            eligible_cost_eur: 3000.,
            category: EvChargingCategory::ThreePhase,
            power_kw: None,
        };

        let result = calc_ev_charging(3150., &input).unwrap();

        assert_eq!(result.intervention(), Intervention::EvCharging);
        assert_relative_eq!(result.detail_f64("cost_used_eur").unwrap(), 3000.);
        assert_relative_eq!(result.total_incentive_eur(), 900.);
        assert_eq!(
            result.notes(),
            ["Cost used = min(C, Cmax) = 3000.00 EUR; incentive = 30% of the cost used.".to_string()]
        );
    }

    #[rstest]
    fn should_cap_cost_per_category() {
        let input = EvChargingInput {
            eligible_cost_eur: 5000.,
            category: EvChargingCategory::SinglePhase,
            power_kw: None,
        };

        let result = calc_ev_charging(3150., &input).unwrap();

        assert_relative_eq!(result.detail_f64("cost_used_eur").unwrap(), 2400.);
        assert_relative_eq!(result.total_incentive_eur(), 720.);
    }

    #[rstest]
    fn should_note_ignored_power_for_fixed_cap_category() {
        let input = EvChargingInput {
            eligible_cost_eur: 3000.,
            category: EvChargingCategory::ThreePhase,
            power_kw: Some(11.),
        };

        let result = calc_ev_charging(3150., &input).unwrap();

        assert_relative_eq!(result.detail_f64("cmax_eur").unwrap(), 8400.);
        assert_eq!(
            result.notes().first().unwrap(),
            "Charging power is not used for category a_tri: Cmax is fixed."
        );
    }

    #[rstest]
    fn should_scale_cap_with_power() {
        let input = EvChargingInput {
            eligible_cost_eur: 50_000.,
            category: EvChargingCategory::From22To50Kw,
            power_kw: Some(30.),
        };

        let result = calc_ev_charging(20_000., &input).unwrap();

        // Cmax = 1200 * 30 = 36000, Itot = 10800
        assert_relative_eq!(result.detail_f64("cmax_eur").unwrap(), 36_000.);
        assert_relative_eq!(result.total_incentive_eur(), 10_800.);
    }

    #[rstest]
    fn should_clamp_to_primary_generator_total() {
        let input = EvChargingInput {
            eligible_cost_eur: 200_000.,
            category: EvChargingCategory::Above100Kw,
            power_kw: None,
        };

        let result = calc_ev_charging(20_000., &input).unwrap();

        // 0.3 * 110000 = 33000 clamped to 20000 over 2 installments
        assert_eq!(result.total_incentive_eur(), 20_000.);
        assert_eq!(result.installments(), 2);
        assert_relative_eq!(result.installment_eur(), 10_000.);
        assert_eq!(result.notes().last().unwrap(), PRIMARY_CEILING_NOTE);
    }

    #[rstest]
    #[case(15_000.01)]
    #[case(20_000.03)]
    #[case(25_000.07)]
    fn should_never_exceed_odd_cent_primary_total(#[case] primary_total: f64) {
        let input = EvChargingInput {
            eligible_cost_eur: 200_000.,
            category: EvChargingCategory::Above100Kw,
            power_kw: None,
        };

        let result = calc_ev_charging(primary_total, &input).unwrap();

        assert_eq!(result.installments(), 2);
        assert!(result.total_incentive_eur() <= primary_total);
        assert_relative_eq!(
            result.total_incentive_eur(),
            primary_total - 0.01,
            epsilon = 1e-6
        );
        assert!(result.notes().contains(&PRIMARY_CEILING_NOTE.to_string()));
    }

    #[rstest]
    fn should_require_power_for_power_proportional_category() {
        let input = EvChargingInput {
            eligible_cost_eur: 30_000.,
            category: EvChargingCategory::From22To50Kw,
            power_kw: None,
        };

        assert!(matches!(
            calc_ev_charging(20_000., &input),
            Err(CalculationError::MissingField { field: "power_kw", .. })
        ));
    }
}
