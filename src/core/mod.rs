pub mod add_ons;
pub mod heating_systems;
pub mod incentive;
pub mod tables;
pub mod units;
