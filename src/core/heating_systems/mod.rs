pub mod biomass;
pub mod heat_pump;
pub mod hybrid;
pub mod solar_thermal;
