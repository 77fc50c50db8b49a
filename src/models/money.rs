//! Monetary amounts are integer cents internally and decimal units on the
//! wire (`{"amount": 12.5}` is 1250 cents).

use serde::Serializer;

pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

pub fn to_units(cents: i64) -> f64 {
    cents as f64 / 100.0
}

pub fn serialize_cents<S: Serializer>(cents: &i64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(to_units(*cents))
}

pub fn serialize_opt_cents<S: Serializer>(
    cents: &Option<i64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match cents {
        Some(c) => serializer.serialize_f64(to_units(*c)),
        None => serializer.serialize_none(),
    }
}
