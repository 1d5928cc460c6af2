use crate::compare_floats::{floor_to_cents, round_to_cents};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::Display;

/// Incentives up to this total are paid as a single lump sum, in €.
pub const SINGLE_PAYMENT_THRESHOLD_EUR: f64 = 15_000.;
/// Power limit separating small from large plants for banding and installments, in kW.
pub const SMALL_PLANT_POWER_LIMIT_KW: f64 = 35.;
pub const INSTALLMENTS_SMALL_PLANT: u32 = 2;
pub const INSTALLMENTS_LARGE_PLANT: u32 = 5;
/// Add-ons do not derive their installments from the primary generator.
pub const ADD_ON_FALLBACK_INSTALLMENTS: u32 = 2;

/// Named intermediate quantities of a calculation, in insertion order and unrounded.
pub type Details = IndexMap<String, Value>;

/// Which calculator produced a result.
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intervention {
    #[strum(to_string = "Electric heat pump")]
    HeatPump,
    #[strum(to_string = "Hybrid/bivalent system (add-on)")]
    HybridSystem,
    #[strum(to_string = "Biomass generator")]
    Biomass,
    #[strum(to_string = "Solar thermal")]
    SolarThermal,
    #[strum(to_string = "PV + storage (add-on)")]
    PvStorage,
    #[strum(to_string = "Private EV charging (add-on)")]
    EvCharging,
}

/// Installment count for a total: a single payment up to the threshold, otherwise the default.
pub fn installments_for(total_incentive_eur: f64, default_installments: u32) -> u32 {
    if total_incentive_eur <= SINGLE_PAYMENT_THRESHOLD_EUR {
        1
    } else {
        default_installments
    }
}

/// Default installment count for a plant rated by power, in kW.
pub fn installments_by_power(power_kw: f64) -> u32 {
    if power_kw <= SMALL_PLANT_POWER_LIMIT_KW {
        INSTALLMENTS_SMALL_PLANT
    } else {
        INSTALLMENTS_LARGE_PLANT
    }
}

/// The outcome of one incentive calculation.
///
/// Only the calculators construct results. The total is always derived as the rounded
/// installment amount times the number of installments.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IncentiveResult {
    intervention: Intervention,
    annual_incentive_eur: f64,
    total_incentive_eur: f64,
    installments: u32,
    installment_eur: f64,
    details: Details,
    notes: Vec<String>,
}

impl IncentiveResult {
    /// Arguments:
    /// * `intervention` - the calculator producing this result
    /// * `total_incentive_eur` - unrounded total incentive over the whole payment period
    /// * `default_installments` - installments used when the total exceeds the single payment threshold
    /// * `details` - intermediate quantities for audit
    /// * `notes` - advisory notes in the order they were raised
    pub(crate) fn from_total(
        intervention: Intervention,
        total_incentive_eur: f64,
        default_installments: u32,
        details: Details,
        notes: Vec<String>,
    ) -> Self {
        let installments = installments_for(total_incentive_eur, default_installments);
        let installment_eur = round_to_cents(total_incentive_eur / installments as f64);

        Self {
            intervention,
            annual_incentive_eur: installment_eur,
            total_incentive_eur: round_to_cents(installment_eur * installments as f64),
            installments,
            installment_eur,
            details,
            notes,
        }
    }

    /// As [`IncentiveResult::from_total`], but the derived total never exceeds `ceiling_eur`.
    ///
    /// Where rounding the installment would push installment * n above the ceiling, the
    /// installment is rounded down to cents instead. A binding ceiling that cannot be met
    /// to the cent is noted.
    pub(crate) fn from_total_within_ceiling(
        intervention: Intervention,
        total_incentive_eur: f64,
        default_installments: u32,
        ceiling_eur: f64,
        details: Details,
        mut notes: Vec<String>,
    ) -> Self {
        let installments = installments_for(total_incentive_eur, default_installments);
        let mut installment_eur = round_to_cents(total_incentive_eur / installments as f64);
        if round_to_cents(installment_eur * installments as f64) > ceiling_eur {
            installment_eur = floor_to_cents(ceiling_eur / installments as f64);
        }
        let total = round_to_cents(installment_eur * installments as f64);

        let shortfall = round_to_cents(ceiling_eur - total);
        if total_incentive_eur >= ceiling_eur && shortfall > 0. {
            notes.push(format!(
                "Installments rounded down to cents: total is {shortfall:.2} EUR below the ceiling Imax."
            ));
        }

        Self {
            intervention,
            annual_incentive_eur: installment_eur,
            total_incentive_eur: total,
            installments,
            installment_eur,
            details,
            notes,
        }
    }

    pub fn intervention(&self) -> Intervention {
        self.intervention
    }

    /// Amount paid per year; equal to the whole total when paid in a single installment.
    pub fn annual_incentive_eur(&self) -> f64 {
        self.annual_incentive_eur
    }

    pub fn total_incentive_eur(&self) -> f64 {
        self.total_incentive_eur
    }

    pub fn installments(&self) -> u32 {
        self.installments
    }

    pub fn installment_eur(&self) -> f64 {
        self.installment_eur
    }

    pub fn details(&self) -> &Details {
        &self.details
    }

    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }

    /// Numeric value of a detail entry, if present and numeric.
    pub fn detail_f64(&self, key: &str) -> Option<f64> {
        self.detail(key).and_then(Value::as_f64)
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }
}
