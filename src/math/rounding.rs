//! Decimal rounding for presentation.
//!
//! Ties round to even at the requested precision, so `0.5 -> 0`, `1.5 -> 2`,
//! `2.675 -> 2.67 or 2.68` depending on the binary value actually stored.

/// Round `v` to `decimals` places, ties to even.
pub fn round_to(v: f64, decimals: u32) -> f64 {
    if !v.is_finite() {
        return v;
    }
    let scale = 10f64.powi(decimals as i32);
    let scaled = v * scale;
    if !scaled.is_finite() {
        return v;
    }
    scaled.round_ties_even() / scale
}

/// Round to the nearest integer (ties to even). `None` for non-finite or
/// out-of-range values.
pub fn round_to_int(v: f64) -> Option<i64> {
    if !v.is_finite() {
        return None;
    }
    let r = v.round_ties_even();
    if r < i64::MIN as f64 || r > i64::MAX as f64 {
        return None;
    }
    Some(r as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_round_to_even() {
        assert_eq!(round_to_int(0.5), Some(0));
        assert_eq!(round_to_int(1.5), Some(2));
        assert_eq!(round_to_int(2.4), Some(2));
        assert_eq!(round_to_int(f64::NAN), None);
    }

    #[test]
    fn two_decimal_rounding() {
        assert!((round_to(1234.5678, 2) - 1234.57).abs() < 1e-9);
        assert!((round_to(0.125, 2) - 0.12).abs() < 1e-9);
        assert_eq!(round_to(7.0, 2), 7.0);
    }
}
