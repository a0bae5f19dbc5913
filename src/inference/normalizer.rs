/// Rescales a raw model score to the game's point scale.
///
/// No clamping: a miscalibrated model may yield negative scores or scores
/// above `total_questions`, and those pass through unchanged. Halves round
/// to the nearest even integer.
pub fn normalize(raw: f64, total_questions: u32) -> i64 {
    (raw / f64::from(total_questions)).round_ties_even() as i64
}

/// Raw score rounded to two decimals for the debug field of the response.
pub fn round_cents(raw: f64) -> f64 {
    (raw * 100.0).round_ties_even() / 100.0
}
