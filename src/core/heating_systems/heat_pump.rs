//! This module calculates the incentive for electric heat pumps:
//!
//! Qu = Prated * Quf
//! Ei = Qu * (1 - 1/SCOP) * kp
//! Ia = Ei * Ci
//!
//! Fixed double duct units use COP35 in place of SCOP, with kp fixed at 2.6.

use crate::core::incentive::{installments_by_power, Details, IncentiveResult, Intervention};
use crate::core::tables::{heat_pump_equivalent_hours, heat_pump_unit_price};
use crate::errors::CalculationError;
use crate::input::HeatPumpInput;
use serde_json::json;
use tracing::{debug, warn};

/// kp applied to fixed double duct units regardless of the requested value.
pub const FIXED_DOUBLE_DUCT_KP: f64 = 2.6;

/// The energy and price terms shared by heat pump based interventions.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct HeatPumpTerms {
    pub quf: f64,
    /// Usable heat, in kWht
    pub qu: f64,
    /// Unit price, in €/kWht
    pub ci: f64,
    /// Incentivised energy, in kWht
    pub ei: f64,
    pub kp_effective: f64,
    pub notes: Vec<String>,
}

impl HeatPumpTerms {
    pub(crate) fn annual_incentive(&self) -> f64 {
        self.ei * self.ci
    }

    pub(crate) fn details(&self, input: &HeatPumpInput) -> Details {
        Details::from([
            ("zone".into(), json!(input.zone)),
            ("heat_pump_type".into(), json!(input.heat_pump_type)),
            ("quf_h".into(), json!(self.quf)),
            ("prated_kw".into(), json!(input.prated_kw)),
            ("qu_kwht".into(), json!(self.qu)),
            ("ci_eur_per_kwht".into(), json!(self.ci)),
            ("ei_kwht".into(), json!(self.ei)),
            ("kp".into(), json!(self.kp_effective)),
            ("kp_requested".into(), json!(input.kp)),
            ("scop".into(), json!(input.scop)),
            ("cop35".into(), json!(input.cop35)),
        ])
    }
}

fn check_efficiency(field: &'static str, value: f64) -> Result<f64, CalculationError> {
    if value < 1. {
        return Err(CalculationError::out_of_range(field, value, ">= 1.0"));
    }
    Ok(value)
}

pub(crate) fn heat_pump_terms(input: &HeatPumpInput) -> Result<HeatPumpTerms, CalculationError> {
    if input.prated_kw <= 0. {
        return Err(CalculationError::out_of_range(
            "Prated (kW)",
            input.prated_kw,
            "> 0 kW",
        ));
    }
    if input.kp <= 0. {
        return Err(CalculationError::out_of_range("kp", input.kp, "> 0"));
    }

    let quf = heat_pump_equivalent_hours(input.zone);
    let qu = input.prated_kw * quf;
    let ci = heat_pump_unit_price(input.heat_pump_type, input.prated_kw)?;

    let mut notes = vec![];
    let (efficiency, kp_effective) = if input.heat_pump_type.uses_cop35() {
        let cop35 = input.cop35.ok_or_else(|| {
            CalculationError::missing_field("cop35", "fixed_double_duct requires COP35")
        })?;
        if input.kp != FIXED_DOUBLE_DUCT_KP {
            warn!(
                requested = input.kp,
                "kp overridden to {FIXED_DOUBLE_DUCT_KP} for fixed double duct"
            );
        }
        notes.push(format!(
            "fixed_double_duct: COP35 used with kp = {FIXED_DOUBLE_DUCT_KP} as set by the rules."
        ));
        (check_efficiency("COP35", cop35)?, FIXED_DOUBLE_DUCT_KP)
    } else {
        let scop = input.scop.ok_or_else(|| {
            CalculationError::missing_field(
                "scop",
                "SCOP is required (COP35 applies only to fixed_double_duct)",
            )
        })?;
        (check_efficiency("SCOP", scop)?, input.kp)
    };

    let ei = qu * (1. - 1. / efficiency) * kp_effective;

    Ok(HeatPumpTerms {
        quf,
        qu,
        ci,
        ei,
        kp_effective,
        notes,
    })
}

/// Calculate the incentive for an electric heat pump.
pub fn calc_heat_pump(input: &HeatPumpInput) -> Result<IncentiveResult, CalculationError> {
    let terms = heat_pump_terms(input)?;
    let annual_incentive = terms.annual_incentive();

    let default_installments = installments_by_power(input.prated_kw);
    let total_incentive = annual_incentive * default_installments as f64;
    debug!(
        qu = terms.qu,
        ei = terms.ei,
        ci = terms.ci,
        annual_incentive,
        total_incentive,
        "heat pump incentive"
    );

    Ok(IncentiveResult::from_total(
        Intervention::HeatPump,
        total_incentive,
        default_installments,
        terms.details(input),
        terms.notes,
    ))
}
