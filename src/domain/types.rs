//! Bundle metadata and the small enums derived from it.
//!
//! Metadata arrives as JSON next to each trained model. It is parsed into
//! `RawBundleMeta` (strict shape, documented defaults) and then validated into
//! `ModelMeta`, which is what the rest of the pipeline consumes.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// How seasonal components combine with the trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalityMode {
    #[default]
    Additive,
    Multiplicative,
}

impl SeasonalityMode {
    pub fn display_name(self) -> &'static str {
        match self {
            SeasonalityMode::Additive => "additive",
            SeasonalityMode::Multiplicative => "multiplicative",
        }
    }
}

/// Week-ending convention used to bucket daily rows into weeks.
///
/// Accepts pandas-style anchors (`W`, `W-SUN`, `W-MON`, ...) as well as prose
/// such as `week ending Sunday` or just `friday`. Always serialized as `W-XXX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WeekRule {
    week_end: Weekday,
}

impl WeekRule {
    pub fn ending_on(week_end: Weekday) -> Self {
        Self { week_end }
    }

    pub fn week_end_day(self) -> Weekday {
        self.week_end
    }

    /// Last calendar day of the week bucket containing `date`.
    pub fn week_end(self, date: NaiveDate) -> NaiveDate {
        let end = self.week_end.num_days_from_monday();
        let cur = date.weekday().num_days_from_monday();
        let ahead = (7 + end - cur) % 7;
        date.checked_add_days(Days::new(u64::from(ahead)))
            .unwrap_or(NaiveDate::MAX)
    }

    fn anchor(self) -> &'static str {
        match self.week_end {
            Weekday::Mon => "MON",
            Weekday::Tue => "TUE",
            Weekday::Wed => "WED",
            Weekday::Thu => "THU",
            Weekday::Fri => "FRI",
            Weekday::Sat => "SAT",
            Weekday::Sun => "SUN",
        }
    }
}

impl Default for WeekRule {
    fn default() -> Self {
        Self::ending_on(Weekday::Sun)
    }
}

impl fmt::Display for WeekRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W-{}", self.anchor())
    }
}

impl FromStr for WeekRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase();
        if norm == "w" {
            return Ok(Self::default());
        }

        let day = norm
            .strip_prefix("w-")
            .or_else(|| norm.strip_prefix("week ending "))
            .or_else(|| norm.strip_prefix("week-ending "))
            .unwrap_or(&norm)
            .trim();

        day.parse::<Weekday>()
            .map(Self::ending_on)
            .map_err(|_| format!("Unrecognized week rule '{s}'. Expected e.g. W-SUN or 'week ending Sunday'."))
    }
}

impl TryFrom<String> for WeekRule {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WeekRule> for String {
    fn from(value: WeekRule) -> Self {
        value.to_string()
    }
}

/// How forecast values are rounded and rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Money: 2 decimals, `$` + thousands separators on screen.
    Currency,
    /// Counts: nearest integer.
    Count,
}

impl ValueKind {
    pub fn for_target(target: &str) -> Self {
        if target == "revenue" {
            ValueKind::Currency
        } else {
            ValueKind::Count
        }
    }
}

fn default_true() -> bool {
    true
}

fn deserialize_opt_days<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let Some(v) = Option::<f64>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if !v.is_finite() || v < 0.0 || v.fract() != 0.0 || v > f64::from(u32::MAX) {
        return Err(serde::de::Error::custom(format!(
            "sem_window_days must be a whole number of days, got {v}"
        )));
    }
    Ok(Some(v as u32))
}

/// Metadata record exactly as stored in a bundle.
///
/// Unknown keys and wrongly typed values are rejected at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawBundleMeta {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub seasonality_mode: Option<SeasonalityMode>,
    #[serde(default)]
    pub use_logistic: bool,
    /// Upstream winsorization quantile (informational).
    #[serde(default)]
    pub winsor_q: Option<f64>,
    /// Upstream winsorization cap in original units (informational).
    #[serde(default)]
    pub cap_clip: Option<f64>,
    /// Whole days; JSON writers that emit `21.0` are accepted.
    #[serde(default, deserialize_with = "deserialize_opt_days")]
    pub sem_window_days: Option<u32>,
    #[serde(default)]
    pub use_monthly: bool,
    #[serde(default)]
    pub use_semester: bool,
    /// Logistic floor in model (log1p) space.
    #[serde(default)]
    pub floor_log: Option<f64>,
    /// Logistic cap in model (log1p) space.
    #[serde(default)]
    pub cap_log: Option<f64>,
    /// Whether model outputs are log1p-transformed and need `exp(x) - 1`.
    #[serde(default = "default_true")]
    pub needs_expm1: bool,
    #[serde(default)]
    pub week_rule: WeekRule,
}

impl Default for RawBundleMeta {
    fn default() -> Self {
        Self {
            category: None,
            target: None,
            seasonality_mode: None,
            use_logistic: false,
            winsor_q: None,
            cap_clip: None,
            sem_window_days: None,
            use_monthly: false,
            use_semester: false,
            floor_log: None,
            cap_log: None,
            needs_expm1: true,
            week_rule: WeekRule::default(),
        }
    }
}

impl RawBundleMeta {
    /// Promote to `ModelMeta`, or explain why this record cannot be indexed.
    pub fn validate(self) -> Result<ModelMeta, String> {
        let category = self
            .category
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "metadata has no `category`".to_string())?;
        let target = self
            .target
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "metadata has no `target`".to_string())?;

        Ok(ModelMeta {
            category,
            target,
            seasonality_mode: self.seasonality_mode,
            use_logistic: self.use_logistic,
            winsor_q: self.winsor_q,
            cap_clip: self.cap_clip,
            sem_window_days: self.sem_window_days,
            use_monthly: self.use_monthly,
            use_semester: self.use_semester,
            floor_log: self.floor_log,
            cap_log: self.cap_log,
            needs_expm1: self.needs_expm1,
            week_rule: self.week_rule,
        })
    }
}

/// Validated metadata for an indexed bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMeta {
    pub category: String,
    pub target: String,
    pub seasonality_mode: Option<SeasonalityMode>,
    pub use_logistic: bool,
    pub winsor_q: Option<f64>,
    pub cap_clip: Option<f64>,
    pub sem_window_days: Option<u32>,
    pub use_monthly: bool,
    pub use_semester: bool,
    pub floor_log: Option<f64>,
    pub cap_log: Option<f64>,
    pub needs_expm1: bool,
    pub week_rule: WeekRule,
}

impl ModelMeta {
    pub fn value_kind(&self) -> ValueKind {
        ValueKind::for_target(&self.target)
    }

    /// Floor/cap for logistic growth, if both are present.
    pub fn logistic_bounds(&self) -> Option<(f64, f64)> {
        Some((self.floor_log?, self.cap_log?))
    }
}
