//! Lookup tables of the Conto Termico 3.0 application rules.
//!
//! All tables are read-only constants; banded lookups use inclusive upper bounds.

use crate::core::incentive::SMALL_PLANT_POWER_LIMIT_KW;
use crate::errors::CalculationError;
use crate::input::{
    BiomassDevice, EvChargingCategory, HeatPumpType, HybridSystemType, SolarApplication, Zone,
};

/// Table 8: equivalent full-load hours for heat pumps (Quf), in h.
pub fn heat_pump_equivalent_hours(zone: Zone) -> f64 {
    match zone {
        Zone::A => 600.,
        Zone::B => 850.,
        Zone::C => 1100.,
        Zone::D => 1400.,
        Zone::E => 1700.,
        Zone::F => 1800.,
    }
}

/// Table 11: equivalent full-load hours for biomass generators (hr), in h.
pub fn biomass_equivalent_hours(zone: Zone) -> f64 {
    match zone {
        Zone::A => 600.,
        Zone::B => 850.,
        Zone::C => 1100.,
        Zone::D => 1400.,
        Zone::E => 1700.,
        Zone::F => 1800.,
    }
}

/// Power ceiling of split/multisplit and fixed double duct units, in kW.
pub const SMALL_AIR_TO_AIR_LIMIT_KW: f64 = 12.;

/// Table 9: unit price Ci of electric heat pumps, in €/kWht.
pub fn heat_pump_unit_price(
    heat_pump_type: HeatPumpType,
    prated_kw: f64,
) -> Result<f64, CalculationError> {
    let small = prated_kw <= SMALL_PLANT_POWER_LIMIT_KW;

    Ok(match heat_pump_type {
        HeatPumpType::AirToAirSplit | HeatPumpType::FixedDoubleDuct
            if prated_kw > SMALL_AIR_TO_AIR_LIMIT_KW =>
        {
            return Err(CalculationError::out_of_range(
                "Prated (kW)",
                prated_kw,
                format!(
                    "<= {SMALL_AIR_TO_AIR_LIMIT_KW} kW for {} (Table 9)",
                    heat_pump_type
                ),
            ));
        }
        HeatPumpType::AirToAirSplit => 0.070,
        HeatPumpType::FixedDoubleDuct => 0.200,
        HeatPumpType::AirToAirVrf | HeatPumpType::AirToAirRooftop => {
            if small {
                0.15
            } else {
                0.055
            }
        }
        HeatPumpType::AirToWater => {
            if small {
                0.15
            } else {
                0.06
            }
        }
        HeatPumpType::WaterToAir
        | HeatPumpType::WaterToWater
        | HeatPumpType::BrineToAir
        | HeatPumpType::BrineToWater => {
            if small {
                0.160
            } else {
                0.06
            }
        }
    })
}

/// Table 18: coefficient k of hybrid and bivalent systems.
pub fn hybrid_coefficient(system_type: HybridSystemType, boiler_pn_kw: f64) -> f64 {
    match system_type {
        HybridSystemType::FactoryMadeHybrid => 1.25,
        HybridSystemType::BivalentAddOn if boiler_pn_kw <= SMALL_PLANT_POWER_LIMIT_KW => 1.0,
        HybridSystemType::BivalentAddOn => 1.1,
    }
}

/// Table 10: unit price Ci of biomass generators, in €/kWht. Only boilers are banded by power.
pub fn biomass_unit_price(device: BiomassDevice, pn_kw: f64) -> f64 {
    match device {
        BiomassDevice::Boiler if pn_kw <= SMALL_PLANT_POWER_LIMIT_KW => 0.060,
        BiomassDevice::Boiler if pn_kw <= 500. => 0.025,
        BiomassDevice::Boiler => 0.020,
        BiomassDevice::WoodStove => 0.045,
        BiomassDevice::PelletStove => 0.055,
    }
}

/// Tables 12 and 13: emissions coefficient Ce by reduction of primary particulate emissions.
pub fn biomass_emission_coefficient(reduction_pp_percent: f64) -> f64 {
    if reduction_pp_percent <= 20. {
        1.0
    } else if reduction_pp_percent <= 50. {
        1.2
    } else {
        1.5
    }
}

/// Table 16: upper bounds of the solar field size bands, in m2. Areas above the last bound
/// fall in the final band.
pub const SOLAR_AREA_BAND_LIMITS_M2: [f64; 4] = [12., 50., 200., 500.];
pub const SOLAR_AREA_BAND_COUNT: usize = SOLAR_AREA_BAND_LIMITS_M2.len() + 1;

pub fn solar_area_band(sl_m2: f64) -> usize {
    SOLAR_AREA_BAND_LIMITS_M2
        .iter()
        .position(|limit| sl_m2 <= *limit)
        .unwrap_or(SOLAR_AREA_BAND_LIMITS_M2.len())
}

/// Table 17: unit price Ci of solar thermal by application and size band, in €/kWht.
pub fn solar_unit_prices(application: SolarApplication) -> &'static [f64; SOLAR_AREA_BAND_COUNT] {
    match application {
        SolarApplication::DomesticHotWater => &[0.35, 0.32, 0.13, 0.12, 0.11],
        SolarApplication::DomesticHotWaterAndLowTempHeating => &[0.36, 0.33, 0.13, 0.12, 0.11],
        SolarApplication::Concentrating => &[0.38, 0.35, 0.13, 0.12, 0.11],
        SolarApplication::SolarCooling => &[0.43, 0.40, 0.17, 0.15, 0.14],
    }
}

/// Upper bounds of PV power bands with the specific cost cap of each band, in (kW, €/kW).
pub const PV_SPECIFIC_COST_CAPS: [(f64, f64); 4] =
    [(20., 1500.), (200., 1200.), (600., 1100.), (1000., 1050.)];

/// Maximum eligible specific cost of the PV array, in €/kW.
pub fn pv_max_specific_cost(p_pv_kw: f64) -> Result<f64, CalculationError> {
    PV_SPECIFIC_COST_CAPS
        .iter()
        .find(|(limit_kw, _)| p_pv_kw <= *limit_kw)
        .map(|(_, cap)| *cap)
        .ok_or_else(|| {
            CalculationError::out_of_range("PFTV (kW)", p_pv_kw, "<= 1000 kW (PV cost cap table)")
        })
}

/// Maximum eligible specific cost of electrical storage, in €/kWh.
pub const STORAGE_MAX_SPECIFIC_COST: f64 = 1000.;

/// Power range of the power-proportional EV charging category, in kW (lower bound exclusive).
pub const EV_PROPORTIONAL_POWER_RANGE_KW: (f64, f64) = (22., 50.);
pub const EV_COST_CAP_PER_KW: f64 = 1200.;

/// Maximum eligible cost of an EV charging infrastructure, in €.
pub fn ev_max_cost(
    category: EvChargingCategory,
    power_kw: Option<f64>,
) -> Result<f64, CalculationError> {
    match category {
        EvChargingCategory::SinglePhase => Ok(2400.),
        EvChargingCategory::ThreePhase => Ok(8400.),
        EvChargingCategory::From22To50Kw => {
            let power_kw = power_kw.ok_or_else(|| {
                CalculationError::missing_field(
                    "power_kw",
                    "b_22_50 is capped per kW of charging power",
                )
            })?;
            let (lower, upper) = EV_PROPORTIONAL_POWER_RANGE_KW;
            if power_kw <= lower || power_kw > upper {
                return Err(CalculationError::out_of_range(
                    "EV charging power (kW)",
                    power_kw,
                    format!("{lower} < P <= {upper} kW for b_22_50"),
                ));
            }
            Ok(EV_COST_CAP_PER_KW * power_kw)
        }
        EvChargingCategory::From50To100Kw => Ok(60_000.),
        EvChargingCategory::Above100Kw => Ok(110_000.),
    }
}
