pub const MEGAJOULES_PER_KILOWATT_HOUR: f64 = 3.6;
pub const PERCENT_PER_UNIT: f64 = 100.;

pub(crate) fn megajoules_to_kilowatt_hours(energy_mj: f64) -> f64 {
    energy_mj / MEGAJOULES_PER_KILOWATT_HOUR
}

pub(crate) fn percentage_points_to_fraction(points: f64) -> f64 {
    points / PERCENT_PER_UNIT
}
