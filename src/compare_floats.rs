pub fn min_of_2<T: PartialOrd + Copy>(first: T, second: T) -> T {
    if first < second {
        first
    } else {
        second
    }
}

pub fn max_of_2<T: PartialOrd + Copy>(first: T, second: T) -> T {
    if first > second {
        first
    } else {
        second
    }
}

/// Round a monetary amount to 2 decimal places, half away from zero.
pub(crate) fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.).round() / 100.
}

/// Round a monetary amount down to 2 decimal places.
pub(crate) fn floor_to_cents(amount: f64) -> f64 {
    (amount * 100.).floor() / 100.
}
