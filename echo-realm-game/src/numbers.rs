//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Round half-up (toward positive infinity on `.5`) and clamp to the i64 range.
///
/// Returns 0 for NaN. This is the rounding rule used by every XP formula, so
/// `-2.5` rounds to `-2` and `2.5` rounds to `3`.
#[must_use]
pub fn round_half_up(value: f64) -> i64 {
    if value.is_nan() {
        return 0;
    }
    let rounded = (value + 0.5).floor();
    // i64::MAX is not exactly representable as f64, so saturate on overflow.
    cast::<f64, i64>(rounded).unwrap_or(if rounded > 0.0 { i64::MAX } else { i64::MIN })
}

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}

/// Convert a count to i64, saturating on overflow.
#[must_use]
pub fn usize_to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
