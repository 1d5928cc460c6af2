mod compare_floats;
pub mod core;
pub mod errors;
pub mod input;
pub mod output;

pub use crate::core::add_ons::ev_charging::calc_ev_charging;
pub use crate::core::add_ons::pv_storage::calc_pv_storage;
pub use crate::core::heating_systems::biomass::calc_biomass;
pub use crate::core::heating_systems::heat_pump::calc_heat_pump;
pub use crate::core::heating_systems::hybrid::calc_hybrid_system;
pub use crate::core::heating_systems::solar_thermal::calc_solar_thermal;
pub use crate::core::incentive::{IncentiveResult, Intervention};
pub use crate::errors::{CalculationError, ContoTermicoError};

use crate::errors::OutputError;
use crate::input::{ingest_request, CalculationRequest, PrimaryGenerator, PrimaryIncentive};
use crate::output::{write_result, Output, RESULT_LOCATION_KEY};
use std::io::Read;
use tracing::{debug, instrument};

/// Read a JSON calculation request, calculate it, and write the JSON export of the result
/// to the given output.
pub fn run_request(
    input: impl Read,
    output: impl Output,
) -> Result<IncentiveResult, ContoTermicoError> {
    let request = ingest_request(input)?;
    let result = calculate(&request)?;

    write_result(&output, RESULT_LOCATION_KEY, &result).map_err(|e| {
        ContoTermicoError::ErrorInOutput(OutputError::new(e))
    })?;

    Ok(result)
}

#[instrument(skip_all, fields(intervention = %request.intervention()))]
pub fn calculate(request: &CalculationRequest) -> Result<IncentiveResult, CalculationError> {
    let result = match request {
        CalculationRequest::HeatPump(input) => calc_heat_pump(input),
        CalculationRequest::HybridSystem(input) => calc_hybrid_system(input),
        CalculationRequest::Biomass(input) => calc_biomass(input),
        CalculationRequest::SolarThermal(input) => calc_solar_thermal(input),
        CalculationRequest::PvStorage {
            primary,
            pv_storage,
        } => calc_pv_storage(primary.total_incentive_eur()?, pv_storage),
        CalculationRequest::EvCharging {
            primary,
            ev_charging,
        } => calc_ev_charging(primary.total_incentive_eur()?, ev_charging),
    }?;

    debug!(
        total = result.total_incentive_eur(),
        installments = result.installments(),
        notes = result.notes().len(),
        "calculation complete"
    );

    Ok(result)
}

impl CalculationRequest {
    pub fn intervention(&self) -> Intervention {
        match self {
            CalculationRequest::HeatPump(_) => Intervention::HeatPump,
            CalculationRequest::HybridSystem(_) => Intervention::HybridSystem,
            CalculationRequest::Biomass(_) => Intervention::Biomass,
            CalculationRequest::SolarThermal(_) => Intervention::SolarThermal,
            CalculationRequest::PvStorage { .. } => Intervention::PvStorage,
            CalculationRequest::EvCharging { .. } => Intervention::EvCharging,
        }
    }
}

impl PrimaryGenerator {
    pub fn calculate(&self) -> Result<IncentiveResult, CalculationError> {
        match self {
            PrimaryGenerator::HeatPump(input) => calc_heat_pump(input),
            PrimaryGenerator::HybridSystem(input) => calc_hybrid_system(input),
            PrimaryGenerator::Biomass(input) => calc_biomass(input),
            PrimaryGenerator::SolarThermal(input) => calc_solar_thermal(input),
        }
    }
}

impl PrimaryIncentive {
    /// The ceiling for an add-on, calculating the primary generator first where one is given.
    pub fn total_incentive_eur(&self) -> Result<f64, CalculationError> {
        match self {
            PrimaryIncentive::TotalIncentiveEur(total) => Ok(*total),
            PrimaryIncentive::Generator(generator) => {
                let primary = generator.calculate()?;
                debug!(
                    primary = %primary.intervention(),
                    total = primary.total_incentive_eur(),
                    "primary generator calculated for add-on ceiling"
                );
                Ok(primary.total_incentive_eur())
            }
        }
    }
}
