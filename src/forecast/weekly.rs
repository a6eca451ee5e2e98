//! Daily -> weekly aggregation.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{WeekRule, WeeklyAggregate, WeeklyRow};

/// Sum daily values into week buckets closed by `rule`.
///
/// - missing values add nothing, as long as the bucket has at least one real value
/// - a bucket with no real values stays missing (it is not zero)
/// - output is ordered by `week_end` ascending
///
/// Every `week_end` maps to itself under the same rule, so feeding the output
/// back in reproduces it.
pub fn weekly_from_daily<I>(points: I, rule: WeekRule) -> WeeklyAggregate
where
    I: IntoIterator<Item = (NaiveDate, Option<f64>)>,
{
    let mut buckets: BTreeMap<NaiveDate, Option<f64>> = BTreeMap::new();
    for (date, value) in points {
        let slot = buckets.entry(rule.week_end(date)).or_insert(None);
        if let Some(v) = value.filter(|v| !v.is_nan()) {
            *slot = Some(slot.unwrap_or(0.0) + v);
        }
    }

    WeeklyAggregate {
        rule,
        rows: buckets
            .into_iter()
            .map(|(week_end, value)| WeeklyRow { week_end, value })
            .collect(),
    }
}

/// Lenient numeric parse for textual series: anything that is not a finite
/// number is missing. Never fails.
pub fn coerce_numeric(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
