use chrono::{NaiveDate, NaiveTime};

/// Milliseconds since the Unix epoch at UTC midnight of `date`.
pub fn utc_midnight_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

/// Rounds half to even at `places` decimals, matching the numeric library the
/// chart values were first produced with.
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round_ties_even() / scale
}
