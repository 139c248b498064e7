//! Fixed-point sample representation
//!
//! Temperatures are carried as integers scaled by [`SCALE_FACTOR`] so that
//! reductions compare and add exactly. One decimal digit survives scaling.

/// A single scaled observation (`temperature * SCALE_FACTOR`).
pub type Sample = i32;

/// Fixed multiplier applied to raw decimal values before they enter the pipeline.
pub const SCALE_FACTOR: i32 = 10;

/// Scale a decimal value into a [`Sample`], rounding to nearest.
///
/// Returns `None` for non-finite values or values whose scaled form does
/// not fit in a `Sample`.
pub fn to_sample(value: f64) -> Option<Sample> {
    if !value.is_finite() {
        return None;
    }
    let scaled = (value * SCALE_FACTOR as f64).round();
    if scaled < Sample::MIN as f64 || scaled > Sample::MAX as f64 {
        return None;
    }
    Some(scaled as Sample)
}

/// Convert a scaled quantity back to its decimal value.
#[inline]
pub fn unscale(value: f64) -> f64 {
    value / SCALE_FACTOR as f64
}

/// Whole unit containing `value`, rounded toward negative infinity.
#[inline]
pub fn floor_unit(value: Sample) -> i64 {
    (value as i64).div_euclid(SCALE_FACTOR as i64)
}

/// Whole unit at or above `value`, rounded toward positive infinity.
#[inline]
pub fn ceil_unit(value: Sample) -> i64 {
    -(-(value as i64)).div_euclid(SCALE_FACTOR as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_sample_rounds_to_nearest() {
        assert_eq!(to_sample(6.17), Some(62));
        assert_eq!(to_sample(-2.46), Some(-25));
        assert_eq!(to_sample(-2.5), Some(-25));
        assert_eq!(to_sample(0.04), Some(0));
        assert_eq!(to_sample(12.3), Some(123));
    }

    #[test]
    fn test_to_sample_rejects_unrepresentable() {
        assert_eq!(to_sample(f64::NAN), None);
        assert_eq!(to_sample(f64::INFINITY), None);
        assert_eq!(to_sample(1e12), None);
    }

    #[test]
    fn test_unit_rounding_handles_negatives() {
        assert_eq!(floor_unit(45), 4);
        assert_eq!(ceil_unit(45), 5);
        assert_eq!(floor_unit(40), 4);
        assert_eq!(ceil_unit(40), 4);
        assert_eq!(floor_unit(-25), -3);
        assert_eq!(ceil_unit(-25), -2);
        assert_eq!(floor_unit(-30), -3);
        assert_eq!(ceil_unit(-30), -3);
    }
}
