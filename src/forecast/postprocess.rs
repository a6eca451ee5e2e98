//! Map raw model output back to original units.
//!
//! Order matters: inverse transform, then clip at zero, then (elsewhere) aggregate.
//! Summing log-space or negative values would corrupt weekly totals.

use crate::domain::{ForecastRow, ForecastSeries, ModelMeta, RawPrediction};

/// Inverse-transform and clip a single model output.
///
/// NaN becomes missing; everything else ends up `>= 0`.
pub fn restore_value(raw: f64, needs_expm1: bool) -> Option<f64> {
    let v = if needs_expm1 { raw.exp_m1() } else { raw };
    if v.is_nan() { None } else { Some(v.max(0.0)) }
}

/// Convert a raw prediction into a daily forecast in original units.
pub fn postprocess(raw: &RawPrediction, meta: &ModelMeta) -> ForecastSeries {
    let restore = |col: Option<&Vec<f64>>, i: usize| -> Option<f64> {
        col.and_then(|c| c.get(i)).and_then(|&v| restore_value(v, meta.needs_expm1))
    };

    let rows = raw
        .dates
        .iter()
        .enumerate()
        .map(|(i, &date)| ForecastRow {
            date,
            yhat: restore(Some(&raw.yhat), i),
            yhat_lower: restore(raw.yhat_lower.as_ref(), i),
            yhat_upper: restore(raw.yhat_upper.as_ref(), i),
        })
        .collect();

    ForecastSeries {
        rows,
        has_intervals: raw.yhat_lower.is_some() && raw.yhat_upper.is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawBundleMeta;
    use chrono::NaiveDate;

    fn meta(needs_expm1: bool) -> ModelMeta {
        RawBundleMeta {
            category: Some("Fiction".to_string()),
            target: Some("quantity".to_string()),
            needs_expm1,
            ..RawBundleMeta::default()
        }
        .validate()
        .unwrap()
    }

    fn raw(yhat: Vec<f64>, lower: Option<Vec<f64>>, upper: Option<Vec<f64>>) -> RawPrediction {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        RawPrediction {
            dates: start.iter_days().take(yhat.len()).collect(),
            yhat,
            yhat_lower: lower,
            yhat_upper: upper,
        }
    }

    #[test]
    fn zero_in_log_space_is_zero() {
        let series = postprocess(&raw(vec![0.0], None, None), &meta(true));
        assert_eq!(series.rows[0].yhat, Some(0.0));
        assert!(!series.has_intervals);
    }

    #[test]
    fn expm1_then_clip() {
        let series = postprocess(
            &raw(
                vec![2.0_f64.ln_1p(), -3.0],
                Some(vec![-0.5, -10.0]),
                Some(vec![3.0_f64.ln_1p(), 0.1]),
            ),
            &meta(true),
        );
        let r0 = series.rows[0];
        assert!((r0.yhat.unwrap() - 2.0).abs() < 1e-12);
        assert_eq!(r0.yhat_lower, Some(0.0));
        assert!((r0.yhat_upper.unwrap() - 3.0).abs() < 1e-12);
        assert_eq!(series.rows[1].yhat, Some(0.0));
        assert!(series.has_intervals);
    }

    #[test]
    fn without_expm1_values_are_only_clipped() {
        let series = postprocess(&raw(vec![-4.0, 12.5], None, None), &meta(false));
        assert_eq!(series.rows[0].yhat, Some(0.0));
        assert_eq!(series.rows[1].yhat, Some(12.5));
    }

    #[test]
    fn every_value_is_non_negative() {
        let yhat: Vec<f64> = (-50..50).map(|i| i as f64 * 0.37).collect();
        let lower: Vec<f64> = yhat.iter().map(|v| v - 5.0).collect();
        let upper: Vec<f64> = yhat.iter().map(|v| v + 5.0).collect();
        for needs_expm1 in [true, false] {
            let series = postprocess(
                &raw(yhat.clone(), Some(lower.clone()), Some(upper.clone())),
                &meta(needs_expm1),
            );
            for r in &series.rows {
                for v in [r.yhat, r.yhat_lower, r.yhat_upper].into_iter().flatten() {
                    assert!(v >= 0.0);
                }
            }
        }
    }

    #[test]
    fn nan_becomes_missing() {
        let series = postprocess(&raw(vec![f64::NAN], None, None), &meta(true));
        assert_eq!(series.rows[0].yhat, None);
    }
}
