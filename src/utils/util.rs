//! # Utility Module
//!
//! Small numeric helpers used by the geometry kernel and the BSP passes.

/// Pulls `value` into `[min, max]`. A NaN input stays NaN.
///
/// ```
/// use rusted_bsp::utils::util::clamp;
///
/// assert_eq!(clamp(1.0000000002, -1.0, 1.0), 1.0);
/// assert_eq!(clamp(-3.0, -1.0, 1.0), -1.0);
/// ```
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return value;
    }
    value.max(min).min(max)
}

/// Compares two floats with a tolerance that scales with their magnitude.
///
/// ```
/// use rusted_bsp::utils::util::nearly_equal;
///
/// assert!(nearly_equal(0.5, 0.5 + 1e-9, 1e-6));
/// assert!(nearly_equal(1e9, 1e9 + 1.0, 1e-6));
/// assert!(!nearly_equal(0.25, 0.75, 1e-6));
/// ```
pub fn nearly_equal(a: f64, b: f64, epsilon: f64) -> bool {
    let scale = 1.0_f64.max(a.abs()).max(b.abs());
    (a - b).abs() <= epsilon * scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_cosine_drift() {
        // Cosines drifting past 1.0 are pulled back before acos.
        assert_eq!(clamp(1.0000000002, -1.0, 1.0), 1.0);
        assert_eq!(clamp(-1.0000000002, -1.0, 1.0), -1.0);
        assert_eq!(clamp(0.5, -1.0, 1.0), 0.5);
        assert!(clamp(f64::NAN, -1.0, 1.0).is_nan());
    }

    #[test]
    fn test_nearly_equal_infinite_bounds() {
        assert!(nearly_equal(f64::MAX, f64::MAX, 1e-6));
        assert!(!nearly_equal(-f64::MAX, f64::MAX, 1e-6));
    }
}
